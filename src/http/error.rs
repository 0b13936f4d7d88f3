//! Failures the router turns into HTTP error responses.

use thiserror::Error;

use crate::http::parser::ParseError;
use crate::http::response::{Response, StatusCode};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("authorization required for realm {0:?}")]
    AuthRequired(String),

    #[error("credentials rejected for realm {0:?}")]
    AuthFailed(String),

    #[error("access to {0:?} denied")]
    Forbidden(String),

    #[error("resource {0:?} not found")]
    ResourceMissing(String),

    #[error("method {0:?} not implemented")]
    MethodUnsupported(String),

    #[error("I/O error: {0}")]
    Internal(#[from] std::io::Error),
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::Protocol(_) => StatusCode::BadRequest,
            RouteError::AuthRequired(_) => StatusCode::Unauthorized,
            RouteError::AuthFailed(_) | RouteError::Forbidden(_) => StatusCode::Forbidden,
            RouteError::ResourceMissing(_) => StatusCode::NotFound,
            RouteError::MethodUnsupported(_) => StatusCode::NotImplemented,
            RouteError::Internal(_) => StatusCode::InternalServerError,
        }
    }

    /// Maps a filesystem error on `path` to the closest HTTP failure.
    pub fn from_io(err: std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => RouteError::ResourceMissing(path.to_string()),
            std::io::ErrorKind::PermissionDenied => RouteError::Forbidden(path.to_string()),
            _ => RouteError::Internal(err),
        }
    }

    pub fn into_response(self) -> Response {
        match self {
            RouteError::AuthRequired(realm) => Response::unauthorized(&realm),
            other => Response::error(other.status()),
        }
    }
}

impl From<ParseError> for RouteError {
    fn from(err: ParseError) -> Self {
        RouteError::Protocol(err.to_string())
    }
}
