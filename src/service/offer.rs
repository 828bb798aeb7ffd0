//! Offer handler: register an offer and hold the request open until its
//! answer arrives.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::validate_uid;
use crate::error::ServiceError;
use crate::observability::metrics::{
    record_offer_registered, record_offer_wait, record_pending_offers,
};
use crate::rendezvous::{Payload, WaitOutcome};
use crate::server::ServerState;

/// Body of `POST /offer`.
#[derive(Debug, Deserialize)]
pub struct OfferRequest {
    #[serde(alias = "Uid")]
    pub uid: String,
    /// Kept verbatim; the relay never interprets it.
    #[serde(alias = "Offer")]
    pub offer: Box<RawValue>,
}

/// Reply to `POST /offer`: the answer's JSON text, as a string.
#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub answer: Payload,
}

/// Handle an offer.
///
/// May be a very long running request. If the client goes away the handler
/// future is dropped, which withdraws the offer.
#[tracing::instrument(skip(state, request), fields(uid))]
pub async fn handle_offer(
    state: &Arc<ServerState>,
    request: OfferRequest,
) -> Result<OfferResponse, ServiceError> {
    validate_uid(&request.uid)?;
    tracing::Span::current().record("uid", request.uid.as_str());

    let start = Instant::now();
    let handle = state
        .store
        .register(request.uid, Payload::from(request.offer.get()));
    record_offer_registered();
    record_pending_offers(state.store.len());

    tracing::debug!("Waiting for an answer");
    let outcome = match state.offer_timeout {
        Some(timeout) => handle.wait_timeout(timeout, &state.shutdown).await,
        None => handle.wait(&state.shutdown).await,
    };

    let waited = start.elapsed().as_secs_f64();
    record_offer_wait(outcome.label(), waited);
    record_pending_offers(state.store.len());
    tracing::debug!(outcome = outcome.label(), waited_ms = waited * 1000.0, "Offer wait ended");

    match outcome {
        WaitOutcome::Delivered(answer) => Ok(OfferResponse { answer }),
        WaitOutcome::TimedOut => Err(ServiceError::Timeout),
        WaitOutcome::Superseded => Err(ServiceError::Superseded),
        // The only token handed to the wait is the server's shutdown token.
        WaitOutcome::Cancelled => Err(ServiceError::Unavailable),
    }
}
