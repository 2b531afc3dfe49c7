use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("User not found")]
    UserNotFound,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("{key_name} API Key not found")]
    MissingApiKey { key_name: String },

    #[error(transparent)]
    Store(#[from] chatlabs_store::Error),
}

impl Error {
    #[must_use]
    pub fn missing_api_key(key_name: impl Into<String>) -> Self {
        Self::MissingApiKey {
            key_name: key_name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
