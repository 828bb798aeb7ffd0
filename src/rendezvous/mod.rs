//! Rendezvous core: pending offers keyed by uid, and the blocking hand-off
//! that delivers one answer to the waiting offerer.
//!
//! Provides:
//! - [`RendezvousStore`]: the key -> session map and its mutation points
//! - [`ReceiveHandle`]: the offerer's cancellable wait for its answer

mod handle;
mod store;

pub use handle::{ReceiveHandle, WaitOutcome};
pub use store::{PendingOffer, RendezvousStore};

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// An opaque offer or answer payload.
///
/// The core never looks inside; clones share the same allocation so that
/// lookups can hand out copies while the lock is held without copying text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Payload(Arc<str>);

impl Payload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl AsRef<str> for Payload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Payload {
    // Payloads carry SDP and ICE candidates; keep them out of debug logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({} bytes)", self.0.len())
    }
}

impl Serialize for Payload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// What travels over a session's delivery slot.
#[derive(Debug)]
pub(crate) enum Delivery {
    Answer(Payload),
    /// The session was replaced by a newer registration under the same key.
    Superseded,
}
