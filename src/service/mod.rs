//! HTTP handlers for the Tryst relay.
//!
//! Routes:
//! - `POST /offer` - register an offer and wait for its answer
//! - `POST /accept` - deliver an answer to a waiting offer
//! - `GET /listoffers` - uids of all pending offers
//! - `GET /describeoffer?uid=..` (alias `/getoffer`) - one pending offer
//! - `GET /matchoffer?uid=..` - any pending offer other than the caller's
//! - `GET /health` - health check

pub mod answer;
pub mod extract;
pub mod offer;
pub mod offers;

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ServiceError;
use crate::server::ServerState;
use answer::AnswerRequest;
use extract::JsonBody;
use offer::{OfferRequest, OfferResponse};
use offers::{DescribeOfferResponse, ListOffersResponse, MatchOfferResponse};

/// Longest uid accepted.
pub const MAX_UID_LEN: usize = 255;

type QueryParams = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Build the relay router.
pub fn create_router(state: Arc<ServerState>) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/offer", post(offer))
        .route("/accept", post(accept))
        .route("/listoffers", get(list_offers))
        .route("/describeoffer", get(describe_offer))
        .route("/getoffer", get(describe_offer))
        .route("/matchoffer", get(match_offer))
        .route("/health", get(health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
}

/// Browsers on any origin may talk to the relay.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
}

/// Uids are opaque, but must be non-empty and bounded.
pub(crate) fn validate_uid(uid: &str) -> Result<(), ServiceError> {
    if uid.is_empty() {
        return Err(ServiceError::BadRequest("uid cannot be empty"));
    }
    if uid.len() > MAX_UID_LEN {
        return Err(ServiceError::BadRequest("uid too long (max 255 bytes)"));
    }
    Ok(())
}

/// The single `uid` query parameter, if present.
fn uid_param(params: QueryParams) -> Result<Option<String>, ServiceError> {
    let Query(params) = params.map_err(|e| {
        tracing::debug!(error = %e, "Rejected query string");
        ServiceError::BadRequest("invalid query string")
    })?;

    let mut uids = params
        .into_iter()
        .filter(|(name, _)| name == "uid")
        .map(|(_, value)| value);

    match (uids.next(), uids.next()) {
        (uid, None) => Ok(uid),
        (_, Some(_)) => Err(ServiceError::BadRequest("need exactly one uid parameter")),
    }
}

async fn offer(
    State(state): State<Arc<ServerState>>,
    JsonBody(request): JsonBody<OfferRequest>,
) -> Result<Json<OfferResponse>, ServiceError> {
    offer::handle_offer(&state, request).await.map(Json)
}

async fn accept(
    State(state): State<Arc<ServerState>>,
    JsonBody(request): JsonBody<AnswerRequest>,
) -> Result<StatusCode, ServiceError> {
    answer::handle_answer(&state, request).await?;
    Ok(StatusCode::OK)
}

async fn list_offers(State(state): State<Arc<ServerState>>) -> Json<ListOffersResponse> {
    Json(offers::handle_list_offers(&state))
}

async fn describe_offer(
    State(state): State<Arc<ServerState>>,
    params: QueryParams,
) -> Result<Json<DescribeOfferResponse>, ServiceError> {
    let uid = uid_param(params)?;
    offers::handle_describe_offer(&state, uid.as_deref()).map(Json)
}

async fn match_offer(
    State(state): State<Arc<ServerState>>,
    params: QueryParams,
) -> Result<Json<MatchOfferResponse>, ServiceError> {
    let uid = uid_param(params)?;
    offers::handle_match_offer(&state, uid.as_deref()).map(Json)
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
