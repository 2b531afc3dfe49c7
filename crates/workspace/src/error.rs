use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("workspace not found: {id}")]
    WorkspaceNotFound { id: String },

    #[error(transparent)]
    Store(#[from] chatlabs_store::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
