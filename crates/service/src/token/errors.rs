use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    /// Bad signature, wrong algorithm or a string that is not a JWT at all.
    #[error("invalid token: {0}")]
    InvalidSignature(String),
    #[error("token configuration error: {0}")]
    Config(String),
    #[error("token encoding error: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            TokenError::Expired => 3001,
            TokenError::InvalidSignature(_) => 3002,
            TokenError::Config(_) => 3100,
            TokenError::Encoding(_) => 3101,
        }
    }
}
