use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::auth::password::encoder_for;
use service::auth::repo::seaorm::SeaOrmUserRepository;
use service::entry::repo::seaorm::SeaOrmEntryRepository;
use service::token::TokenService;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) first, environment variables otherwise.
pub fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(error = %e, "config file unusable, falling back to environment");
            AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
        }
    }
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Wire SeaORM repositories, the configured password encoder and the token
/// service into handler state.
pub fn build_state(db: DatabaseConnection, cfg: &AppConfig) -> Result<AppState, StartupError> {
    let encoder = encoder_for(&cfg.auth.password_algorithm)?;
    let tokens = TokenService::from_config(&cfg.jwt)?;
    Ok(AppState::new(
        Arc::new(SeaOrmEntryRepository { db: db.clone() }),
        Arc::new(SeaOrmUserRepository { db }),
        encoder,
        tokens,
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: migrate, build the app and serve until Ctrl+C. Logging and
/// `.env` are the caller's job; see [`load_config`].
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    info!("database migrations applied");

    let state = build_state(db, &cfg)?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, algorithm = %cfg.auth.password_algorithm, "server_starting");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_comes_from_loaded_config() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "0.0.0.0".into();
        cfg.server.port = 9090;
        assert_eq!(bind_addr(&cfg).unwrap(), "0.0.0.0:9090".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn unparsable_host_is_a_config_error() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "not a host".into();
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }
}
