use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use service::token::TokenError;

use crate::errors::ApiError;
use crate::state::AppState;

/// Caller identity taken from a verified bearer token, inserted into request
/// extensions for handlers that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
    pub user_id: Option<i64>,
}

impl AuthenticatedUser {
    /// Callers only reach data owned by their own user id.
    pub fn ensure_owner(&self, owner: Option<i64>) -> Result<(), ApiError> {
        match (self.user_id, owner) {
            (Some(me), Some(owner)) if me == owner => Ok(()),
            _ => {
                warn!(caller = ?self.user_id, ?owner, "access to another user's data denied");
                Err(ApiError::Forbidden)
            }
        }
    }
}

/// Middleware for protected routes: requires `Authorization: Bearer <token>`.
/// Missing, malformed, tampered and expired tokens all get 401; the cause is
/// only logged.
pub async fn require_bearer_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let Some(header) = header else {
        warn!(path = %path, "missing Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };
    let Some(token) = header.strip_prefix("Bearer ").map(str::trim) else {
        warn!(path = %path, "invalid Authorization format (expect Bearer)");
        return Err(StatusCode::UNAUTHORIZED);
    };

    match state.tokens.parse_claims(token) {
        Ok(claims) => {
            req.extensions_mut().insert(AuthenticatedUser { email: claims.sub, user_id: claims.user_id });
            Ok(next.run(req).await)
        }
        Err(TokenError::Expired) => {
            warn!(path = %path, "token expired");
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(e) => {
            warn!(path = %path, err = %e, code = e.code(), "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
