use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("unknown function {function_id} for tool {tool_name}")]
    UnknownFunction {
        tool_name: String,
        function_id: String,
    },

    /// Input rejected before any provider call.
    #[error("{message}")]
    InvalidInput { message: String },

    /// Provider call or upload failed.
    #[error("Error: {message}")]
    Generation { message: String },
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
