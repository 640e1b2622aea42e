use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::auth::errors::AuthError;
use service::entry::errors::EntryError;
use service::token::TokenError;

/// Errors a handler can return. `BadRequest` carries a message meant for the
/// end user; `Internal` details only reach the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("invalid credentials")]
    Unauthorized,
    /// Valid token, but the data belongs to another user.
    #[error("access denied")]
    Forbidden,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match &self {
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}

impl From<EntryError> for ApiError {
    fn from(e: EntryError) -> Self {
        match e {
            EntryError::Validation(v) => ApiError::BadRequest(v.0),
            other => ApiError::Internal(format!("[{}] {other}", other.code())),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        if e.is_credentials_failure() {
            return ApiError::Unauthorized;
        }
        match e {
            AuthError::EmailTaken => ApiError::BadRequest(AuthError::EmailTaken.to_string()),
            AuthError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(format!("[{}] {other}", other.code())),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired | TokenError::InvalidSignature(_) => ApiError::Unauthorized,
            other => ApiError::Internal(format!("[{}] {other}", other.code())),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
