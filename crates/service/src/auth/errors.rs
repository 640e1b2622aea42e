use thiserror::Error;

/// Business errors for registration and login.
///
/// `UserNotFound` and `InvalidPassword` stay distinct for logs; callers facing
/// the outside world should collapse them (see [`AuthError::is_credentials_failure`]).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Já existe um usuário cadastrado com este email.")]
    EmailTaken,
    /// Storage refused the user's fields (blank name, malformed email).
    #[error("{0}")]
    InvalidInput(String),
    #[error("Usuário não encontrado para o email informado")]
    UserNotFound,
    #[error("Senha inválida")]
    InvalidPassword,
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::InvalidInput(_) => 1001,
            AuthError::EmailTaken => 1002,
            AuthError::UserNotFound => 1003,
            AuthError::InvalidPassword => 1004,
            AuthError::Hash(_) => 1101,
            AuthError::Repository(_) => 1200,
        }
    }

    pub fn is_credentials_failure(&self) -> bool {
        matches!(self, AuthError::UserNotFound | AuthError::InvalidPassword)
    }
}
