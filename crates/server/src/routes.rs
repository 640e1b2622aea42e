use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::AppState;

pub mod auth;
pub mod entries;
pub mod users;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public user routes and health, plus
/// entry and balance routes behind the bearer token check.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/usuarios", post(users::register))
        .route("/api/usuarios/autenticar", post(users::authenticate));

    let protected = Router::new()
        .route("/api/usuarios/:id/saldo", get(users::balance))
        .route("/api/lancamentos", get(entries::search).post(entries::create))
        .route(
            "/api/lancamentos/:id",
            get(entries::find).put(entries::update).delete(entries::delete),
        )
        .route("/api/lancamentos/:id/atualiza-status", put(entries::update_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
