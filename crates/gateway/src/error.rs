//! Mapping from domain errors to HTTP responses.

use {
    axum::{
        http::StatusCode,
        response::{IntoResponse, Json, Response},
    },
    chatlabs_subscription::LimitError,
    thiserror::Error,
    tracing::warn,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authenticated")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Limit(#[from] LimitError),

    /// Provider failure whose message is safe to show.
    #[error("{0}")]
    Upstream(String),

    /// Logged where it is created; clients only see a generic message.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn internal(context: &str, error: &dyn std::error::Error) -> Self {
        warn!(error = %error, "{context}");
        Self::Internal
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Limit(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Limit(_) => "limit",
            Self::Upstream(_) => "upstream",
            Self::Internal => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Unauthorized = self {
            return unauthorized();
        }
        let body = serde_json::json!({
            "error": { "type": self.kind(), "message": self.to_string() }
        });
        (self.status(), Json(body)).into_response()
    }
}

/// 401 body shared by the middleware and handlers.
pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"error": "not authenticated"})),
    )
        .into_response()
}

impl From<chatlabs_accounts::Error> for ApiError {
    fn from(e: chatlabs_accounts::Error) -> Self {
        use chatlabs_accounts::Error;
        match e {
            Error::UserNotFound => Self::Unauthorized,
            Error::ProfileNotFound => Self::NotFound(e.to_string()),
            Error::MissingApiKey { .. } => Self::BadRequest(e.to_string()),
            Error::Store(ref source) => Self::internal("account lookup failed", source),
        }
    }
}

impl From<chatlabs_subscription::Error> for ApiError {
    fn from(e: chatlabs_subscription::Error) -> Self {
        use chatlabs_subscription::Error;
        match e {
            Error::Limit(limit) => Self::Limit(limit),
            Error::UnknownModel { .. } => Self::BadRequest(e.to_string()),
            Error::Account(account) => account.into(),
            Error::CountUnavailable => Self::internal("quota check failed", &e),
            Error::Store(ref source) => Self::internal("quota check failed", source),
        }
    }
}

impl From<chatlabs_workspace::Error> for ApiError {
    fn from(e: chatlabs_workspace::Error) -> Self {
        use chatlabs_workspace::Error;
        match e {
            Error::WorkspaceNotFound { .. } => Self::NotFound(e.to_string()),
            Error::Store(ref source) => Self::internal("workspace bootstrap failed", source),
        }
    }
}

impl From<chatlabs_tools::Error> for ApiError {
    fn from(e: chatlabs_tools::Error) -> Self {
        use chatlabs_tools::Error;
        match e {
            Error::UnknownTool { .. } | Error::UnknownFunction { .. } => {
                Self::NotFound(e.to_string())
            },
            Error::InvalidInput { .. } => Self::BadRequest(e.to_string()),
            Error::Generation { .. } => Self::Upstream(e.to_string()),
        }
    }
}

impl From<chatlabs_store::Error> for ApiError {
    fn from(e: chatlabs_store::Error) -> Self {
        Self::internal("store request failed", &e)
    }
}
