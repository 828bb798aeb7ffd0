//! The offerer's side of a rendezvous.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{Delivery, Payload, RendezvousStore};

/// How an offerer's wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Exactly one answer was handed off.
    Delivered(Payload),
    /// A newer offer was registered under the same key.
    Superseded,
    /// The caller's cancellation token fired, or the session was removed
    /// through [`RendezvousStore::unregister`].
    Cancelled,
    /// The deadline passed before an answer arrived.
    TimedOut,
}

impl WaitOutcome {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered(_) => "delivered",
            Self::Superseded => "superseded",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Handle returned by [`RendezvousStore::register`].
///
/// Awaiting it races the answer against cancellation. Whichever way the wait
/// ends, including the handle simply being dropped, the session it
/// registered is removed so the key is free again.
#[derive(Debug)]
#[must_use = "dropping the handle withdraws the offer"]
pub struct ReceiveHandle {
    store: RendezvousStore,
    key: String,
    session_id: Uuid,
    rx: oneshot::Receiver<Delivery>,
    settled: bool,
}

impl ReceiveHandle {
    pub(crate) fn new(
        store: RendezvousStore,
        key: String,
        session_id: Uuid,
        rx: oneshot::Receiver<Delivery>,
    ) -> Self {
        Self {
            store,
            key,
            session_id,
            rx,
            settled: false,
        }
    }

    /// The key this offer was registered under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Wait for the answer until `cancel` fires.
    pub async fn wait(self, cancel: &CancellationToken) -> WaitOutcome {
        self.wait_until(None, cancel).await
    }

    /// Wait for the answer for at most `timeout`, or until `cancel` fires.
    pub async fn wait_timeout(self, timeout: Duration, cancel: &CancellationToken) -> WaitOutcome {
        self.wait_until(Some(Instant::now() + timeout), cancel).await
    }

    /// Wait for the answer until `deadline` (if any) or until `cancel` fires.
    pub async fn wait_until(
        mut self,
        deadline: Option<Instant>,
        cancel: &CancellationToken,
    ) -> WaitOutcome {
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        let outcome = tokio::select! {
            delivery = &mut self.rx => Self::received(delivery),
            () = cancel.cancelled() => self.abandon(WaitOutcome::Cancelled).await,
            () = expired => self.abandon(WaitOutcome::TimedOut).await,
        };
        self.settled = true;
        outcome
    }

    /// Give up waiting, unless the session was already claimed.
    async fn abandon(&mut self, outcome: WaitOutcome) -> WaitOutcome {
        if self.store.release(&self.key, self.session_id) {
            tracing::debug!(key = %self.key, outcome = outcome.label(), "Offer wait abandoned");
            return outcome;
        }

        // Someone claimed the session before us. Whatever they send is
        // already on its way and sending never suspends, so this resolves
        // right away.
        Self::received((&mut self.rx).await)
    }

    fn received(delivery: Result<Delivery, oneshot::error::RecvError>) -> WaitOutcome {
        match delivery {
            Ok(Delivery::Answer(answer)) => WaitOutcome::Delivered(answer),
            Ok(Delivery::Superseded) => WaitOutcome::Superseded,
            // Sender dropped without a message: removed by unregister.
            Err(_) => WaitOutcome::Cancelled,
        }
    }
}

impl Drop for ReceiveHandle {
    fn drop(&mut self) {
        if !self.settled && self.store.release(&self.key, self.session_id) {
            tracing::debug!(key = %self.key, "Offer withdrawn before an answer arrived");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[test]
    fn test_wait_is_pending_until_delivery() {
        let store = RendezvousStore::new();
        let token = CancellationToken::new();

        let handle = store.register("abc", Payload::from(r#"{"sdp":"v=0"}"#));
        let mut wait = task::spawn(handle.wait(&token));
        assert_pending!(wait.poll());

        store
            .deliver("abc", Payload::from(r#"{"sdp":"v=1"}"#))
            .unwrap();
        assert!(wait.is_woken());
        assert_ready_eq!(
            wait.poll(),
            WaitOutcome::Delivered(Payload::from(r#"{"sdp":"v=1"}"#))
        );
        assert!(store.lookup("abc").is_err());
    }

    #[test]
    fn test_cancel_wakes_pending_wait() {
        let store = RendezvousStore::new();
        let token = CancellationToken::new();

        let handle = store.register("abc", Payload::from("offer"));
        let mut wait = task::spawn(handle.wait(&token));
        assert_pending!(wait.poll());

        token.cancel();
        assert!(wait.is_woken());
        assert_ready_eq!(wait.poll(), WaitOutcome::Cancelled);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_delay_then_deliver_not_found() {
        let store = RendezvousStore::new();
        let token = CancellationToken::new();

        let handle = store.register("abc", Payload::from("offer"));
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            canceller.cancel();
        });

        assert_eq!(handle.wait(&token).await, WaitOutcome::Cancelled);
        assert!(store.deliver("abc", Payload::from("answer")).is_err());
    }

    #[tokio::test]
    async fn test_wait_timeout_then_deliver_not_found() {
        let store = RendezvousStore::new();
        let token = CancellationToken::new();

        let handle = store.register("abc", Payload::from("offer"));
        let outcome = handle
            .wait_timeout(Duration::from_millis(50), &token)
            .await;
        assert_eq!(outcome, WaitOutcome::TimedOut);

        assert!(store.deliver("abc", Payload::from("answer")).is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delivery_wins_over_later_cancel() {
        let store = RendezvousStore::new();
        let token = CancellationToken::new();

        let handle = store.register("k", Payload::from("offer"));
        store.deliver("k", Payload::from("answer")).unwrap();
        // Cancellation arrives after the session was claimed; the answer
        // that was already handed off still reaches the waiter.
        token.cancel();

        assert_eq!(
            handle.wait(&token).await,
            WaitOutcome::Delivered(Payload::from("answer"))
        );
    }

    #[test]
    fn test_abandon_after_claim_returns_answer() {
        let store = RendezvousStore::new();

        let mut handle = store.register("k", Payload::from("offer"));
        store.deliver("k", Payload::from("answer")).unwrap();

        let mut abandon = task::spawn(handle.abandon(WaitOutcome::Cancelled));
        assert_ready_eq!(
            abandon.poll(),
            WaitOutcome::Delivered(Payload::from("answer"))
        );
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(WaitOutcome::Delivered(Payload::from("")).label(), "delivered");
        assert_eq!(WaitOutcome::Superseded.label(), "superseded");
        assert_eq!(WaitOutcome::Cancelled.label(), "cancelled");
        assert_eq!(WaitOutcome::TimedOut.label(), "timed_out");
    }
}
