//! Offer discovery: list, describe, and match pending offers.

use std::sync::Arc;

use serde::Serialize;

use crate::error::ServiceError;
use crate::rendezvous::Payload;
use crate::server::ServerState;

/// Reply to `GET /listoffers`.
#[derive(Debug, Serialize)]
pub struct ListOffersResponse {
    /// Always present, `[]` when nothing is pending.
    pub uids: Vec<String>,
}

/// Reply to `GET /describeoffer`.
#[derive(Debug, Serialize)]
pub struct DescribeOfferResponse {
    pub offer: Payload,
}

/// Reply to `GET /matchoffer`.
#[derive(Debug, Serialize)]
pub struct MatchOfferResponse {
    pub uid: String,
    pub offer: Payload,
}

pub fn handle_list_offers(state: &Arc<ServerState>) -> ListOffersResponse {
    ListOffersResponse {
        uids: state.store.pending_keys(),
    }
}

pub fn handle_describe_offer(
    state: &Arc<ServerState>,
    uid: Option<&str>,
) -> Result<DescribeOfferResponse, ServiceError> {
    let uid = uid.ok_or(ServiceError::BadRequest("need uid parameter"))?;
    let offer = state.store.lookup(uid)?;
    Ok(DescribeOfferResponse { offer })
}

/// Pick a random pending offer that is not the caller's own.
pub fn handle_match_offer(
    state: &Arc<ServerState>,
    own_uid: Option<&str>,
) -> Result<MatchOfferResponse, ServiceError> {
    let found = state
        .store
        .find_any_other(own_uid.unwrap_or_default())
        .map_err(|_| ServiceError::NotFound("no other pending offer"))?;

    Ok(MatchOfferResponse {
        uid: found.key,
        offer: found.offer,
    })
}
