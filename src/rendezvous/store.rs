//! Store of pending offers awaiting an answer.
//!
//! The key -> session map sits behind a single structural lock whose
//! critical sections only insert, remove, read, or snapshot entries. The
//! answer itself travels over a per-session oneshot channel and is sent after
//! the lock is released, so a slow or vanished offerer on one key never
//! holds up operations on any other key.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::seq::IteratorRandom;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::{Delivery, Payload, ReceiveHandle};
use crate::error::RendezvousError;

/// One pending offer awaiting an answer.
#[derive(Debug)]
struct Session {
    /// Distinguishes successive registrations under the same key.
    id: Uuid,
    offer: Payload,
    delivery: oneshot::Sender<Delivery>,
}

/// A pending offer as seen by a third party looking for a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOffer {
    pub key: String,
    pub offer: Payload,
}

/// Registry of pending offers, keyed by the uid the offerer chose.
///
/// Cloning is cheap and every clone refers to the same map. All methods are
/// safe to call concurrently from independent tasks.
#[derive(Clone, Default)]
pub struct RendezvousStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl RendezvousStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // Critical sections never leave the map half-updated, so a poisoned lock
    // still guards a consistent map.
    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an offer under `key`.
    ///
    /// Returns the handle the caller awaits its answer on. If an offer is
    /// already pending under `key` it is replaced, and its waiter is told so
    /// immediately (its wait resolves to [`WaitOutcome::Superseded`]).
    ///
    /// [`WaitOutcome::Superseded`]: super::WaitOutcome::Superseded
    pub fn register(&self, key: impl Into<String>, offer: Payload) -> ReceiveHandle {
        let key = key.into();
        let (tx, rx) = oneshot::channel();
        let id = Uuid::now_v7();

        let displaced = self.sessions().insert(
            key.clone(),
            Session {
                id,
                offer,
                delivery: tx,
            },
        );

        if let Some(old) = displaced {
            tracing::info!(
                key = %key,
                displaced_session = %old.id,
                session = %id,
                "Superseding pending offer"
            );
            // Ignore if the old waiter is already gone.
            let _ = old.delivery.send(Delivery::Superseded);
        }

        ReceiveHandle::new(self.clone(), key, id, rx)
    }

    /// Remove whatever session is registered under `key`.
    ///
    /// No-op if nothing is pending. A waiter whose session is removed this
    /// way observes a cancelled wait. Offerers themselves never need this:
    /// their [`ReceiveHandle`] releases its own session on every exit path.
    pub fn unregister(&self, key: &str) {
        if self.sessions().remove(key).is_some() {
            tracing::debug!(key, "Unregistered pending offer");
        }
    }

    /// Remove the session under `key` only if it is still session `id`.
    ///
    /// Returns whether this call removed it. A `false` means someone else
    /// claimed the session first: a delivery, a newer registration, or an
    /// explicit unregister.
    pub(crate) fn release(&self, key: &str, id: Uuid) -> bool {
        let mut sessions = self.sessions();
        match sessions.get(key) {
            Some(session) if session.id == id => {
                sessions.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Read the offer pending under `key` without affecting it.
    pub fn lookup(&self, key: &str) -> Result<Payload, RendezvousError> {
        self.sessions()
            .get(key)
            .map(|session| session.offer.clone())
            .ok_or_else(|| RendezvousError::not_found(key))
    }

    /// Snapshot of all keys with a pending offer, in no particular order.
    pub fn pending_keys(&self) -> Vec<String> {
        self.sessions().keys().cloned().collect()
    }

    /// Hand `answer` to the offerer waiting under `key`.
    ///
    /// The session is claimed (removed from the map) under the lock and the
    /// answer is sent after the lock is released. The send never suspends.
    /// Once this returns `Ok`, a second delivery to the same key fails with
    /// [`RendezvousError::NotFound`] until the key is registered again.
    pub fn deliver(&self, key: &str, answer: Payload) -> Result<(), RendezvousError> {
        let session = self
            .sessions()
            .remove(key)
            .ok_or_else(|| RendezvousError::not_found(key))?;

        session
            .delivery
            .send(Delivery::Answer(answer))
            .map_err(|_| {
                tracing::debug!(key, session = %session.id, "Offerer left before delivery");
                RendezvousError::not_found(key)
            })
    }

    /// Pick any pending offer whose key is not `self_key`.
    ///
    /// The choice among several candidates is random; callers must not
    /// depend on any ordering or fairness.
    pub fn find_any_other(&self, self_key: &str) -> Result<PendingOffer, RendezvousError> {
        self.sessions()
            .iter()
            .filter(|(key, _)| key.as_str() != self_key)
            .choose(&mut rand::thread_rng())
            .map(|(key, session)| PendingOffer {
                key: key.clone(),
                offer: session.offer.clone(),
            })
            .ok_or_else(|| RendezvousError::not_found(self_key))
    }

    /// Number of pending offers.
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RendezvousStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendezvousStore")
            .field("pending", &self.len())
            .finish()
    }
}
