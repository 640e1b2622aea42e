use sea_orm::DbErr;
use thiserror::Error;

/// Failures of the row-level helpers in this crate.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A column value the schema would accept but the row helpers reject.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: &'static str },
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}
