//! HTTP client library for the Tryst relay.
//!
//! This module provides a reusable client for talking to a relay, used by
//! the `trystctl` CLI and the integration tests.

mod connection;

pub use connection::{AnswerStatus, ConnectConfig, MatchedOffer, TrystClient, DEFAULT_ENDPOINT};
