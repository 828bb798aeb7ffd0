//! Request extractors that never echo parse errors back to the caller.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::ServiceError;

/// A JSON request body.
///
/// Like `axum::Json`, but every rejection (wrong content type, unreadable or
/// oversized body, malformed JSON) becomes a plain 400 with a fixed message.
/// The underlying error is only logged.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Err(ServiceError::BadRequest(
                "want Content-Type \"application/json\"",
            ));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to read request body");
            ServiceError::BadRequest("invalid request body")
        })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!(error = %e, "Rejected malformed JSON request");
            ServiceError::BadRequest("invalid json request")
        })
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    let mut values = headers.get_all(CONTENT_TYPE).iter();
    match (values.next(), values.next()) {
        (Some(value), None) => value
            .to_str()
            .ok()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json")),
        _ => false,
    }
}
