use thiserror::Error;

/// An entry broke a business rule. The message is meant for the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self { Self(message.into()) }

    pub fn message(&self) -> &str { &self.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what}: {value:?}")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(what: &'static str, value: &str) -> Self { Self { what, value: value.to_string() } }
}

#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Caller bug: the operation needs an entry that was saved before.
    #[error("entry has no id; {0} requires a persisted entry")]
    NotPersisted(&'static str),
    #[error("repository error: {0}")]
    Repository(String),
}

impl EntryError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            EntryError::Validation(_) => 2001,
            EntryError::NotPersisted(_) => 2500,
            EntryError::Repository(_) => 2200,
        }
    }
}
