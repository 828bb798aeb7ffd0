//! Error types for the rendezvous core and its HTTP adapters.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors reported by [`RendezvousStore`](crate::rendezvous::RendezvousStore).
///
/// A missing key is an expected outcome: the offerer may already have timed
/// out, disconnected, or been answered by someone else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RendezvousError {
    /// No live session is registered under the key.
    #[error("no pending offer for key {key:?}")]
    NotFound { key: String },
}

impl RendezvousError {
    pub(crate) fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }
}

/// Errors surfaced to HTTP callers.
///
/// Messages are fixed strings so that nothing about the request parsing or
/// server internals leaks to untrusted peers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    /// The offer wait hit its deadline; the caller should re-offer.
    #[error("no answer in time, please retry")]
    Timeout,

    /// A newer offer was registered under the same key.
    #[error("offer superseded by a newer offer for the same uid")]
    Superseded,

    #[error("server is shutting down")]
    Unavailable,
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Superseded => StatusCode::CONFLICT,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<RendezvousError> for ServiceError {
    fn from(err: RendezvousError) -> Self {
        match err {
            RendezvousError::NotFound { .. } => Self::NotFound("no pending offer for this uid"),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
