//! Tryst: a rendezvous relay for peer-to-peer offer/answer handshakes.
//!
//! One peer posts an offer under a uid and waits; another peer finds that
//! uid, posts an answer, and the relay hands the answer to exactly the
//! waiting request. The relay never looks inside either payload.
//!
//! # Architecture
//!
//! - **Lock-free hand-off**: the map of pending offers is locked only for
//!   bookkeeping; answers travel over per-offer oneshot channels
//! - **Cancellable waits**: offers end on answer, deadline, disconnect,
//!   supersession, or shutdown, and always free their uid
//! - **Ephemeral**: everything lives in memory; a restart drops all offers
//!
//! # Modules
//!
//! - [`client`]: HTTP client for the relay
//! - [`config`]: CLI and environment configuration
//! - [`error`]: Core and HTTP error types
//! - [`observability`]: Metrics and tracing setup
//! - [`rendezvous`]: Pending-offer store and the offerer's wait
//! - [`server`]: HTTP server setup
//! - [`service`]: HTTP handlers

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // rendezvous::RendezvousStore is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc       // Panic docs can be verbose
)]

pub mod client;
pub mod config;
pub mod error;
pub mod observability;
pub mod rendezvous;
pub mod server;
pub mod service;

pub use error::{RendezvousError, ServiceError};
pub use rendezvous::{Payload, PendingOffer, ReceiveHandle, RendezvousStore, WaitOutcome};
