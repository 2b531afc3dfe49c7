use thiserror::Error;

/// Status code carried by every [`LimitError`].
pub const LIMIT_STATUS: u16 = 429;

/// A plan or quota refusal. Callers turn this into an upgrade prompt rather
/// than a generic failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LimitError {
    message: String,
}

impl LimitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        LIMIT_STATUS
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Limit(#[from] LimitError),

    #[error("Unknown model: {model}")]
    UnknownModel { model: String },

    #[error("Could not fetch message count")]
    CountUnavailable,

    #[error(transparent)]
    Account(#[from] chatlabs_accounts::Error),

    #[error(transparent)]
    Store(#[from] chatlabs_store::Error),
}

impl Error {
    #[must_use]
    pub fn unknown_model(model: impl Into<String>) -> Self {
        Self::UnknownModel {
            model: model.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
