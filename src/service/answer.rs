//! Accept handler: deliver an answer to the offer waiting under a uid.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::value::RawValue;

use super::validate_uid;
use crate::error::ServiceError;
use crate::observability::metrics::record_answer;
use crate::rendezvous::Payload;
use crate::server::ServerState;

/// Body of `POST /accept`.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(rename = "uidRemote", alias = "UidRemote")]
    pub uid_remote: String,
    #[serde(alias = "Answer")]
    pub answer: Box<RawValue>,
}

#[tracing::instrument(skip(state, request), fields(uid_remote))]
pub async fn handle_answer(
    state: &Arc<ServerState>,
    request: AnswerRequest,
) -> Result<(), ServiceError> {
    validate_uid(&request.uid_remote)?;
    tracing::Span::current().record("uid_remote", request.uid_remote.as_str());

    let result = state
        .store
        .deliver(&request.uid_remote, Payload::from(request.answer.get()));
    record_answer(result.is_ok());

    match result {
        Ok(()) => {
            tracing::debug!("Relayed answer");
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "No offer to relay the answer to");
            Err(e.into())
        }
    }
}
