//! Error types.
//!
//! Two layers, split by audience:
//!
//! - [`Error`] is for the operator: the listener could not bind, the
//!   configuration is unusable. It never reaches an HTTP client.
//! - [`ApiError`] is for the client: every expected failure a handler or
//!   stage can produce, each mapped to exactly one status code.

use serde_json::json;
use tracing::error;

use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Infrastructure failures returned by [`Server::serve`](crate::Server::serve)
/// and [`Config::validate`](crate::Config::validate).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(String),
}

/// Client-facing failure of a single request.
///
/// Every variant renders with the same envelope, `{"error": "<message>"}`,
/// except [`ApiError::NotFound`], which has an empty body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed, missing, or out-of-range input. 400.
    #[error("{0}")]
    Validation(String),

    /// No record at the requested id. 404.
    #[error("not found")]
    NotFound,

    /// Missing or wrong bearer token. 401.
    #[error("Unauthorized")]
    Unauthorized,

    /// Anything unanticipated. 500. The message is logged, not sent.
    #[error("{0}")]
    Internal(String),
}

/// Body sent for every 500, whatever the cause.
pub(crate) const INTERNAL_MESSAGE: &str = "Internal server error.";

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound => Status::NotFound,
            Self::Unauthorized => Status::Unauthorized,
            Self::Internal(_) => Status::InternalServerError,
        }
    }
}

/// `{"error": message}` with the given status.
pub(crate) fn error_body(status: Status, message: &str) -> Response {
    let body = json!({ "error": message }).to_string().into_bytes();
    Response::builder().status(status).json(body)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::NotFound => Response::status(status),
            Self::Internal(detail) => {
                error!(%detail, "request failed");
                error_body(status, INTERNAL_MESSAGE)
            }
            other => error_body(status, &other.to_string()),
        }
    }
}
