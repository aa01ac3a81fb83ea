//! Correlation table for live prompts.
//!
//! An outbound prompt is tagged with a fresh correlation id; the eventual
//! answer is keyed by that id. Fulfilling an unknown or already-resolved id
//! is a silent no-op, and bulk cancellation resolves every outstanding
//! waiter exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::oneshot;

use grimoire_domain::PromptId;
use grimoire_shared::PromptAnswer;

/// `None` is the designated cancellation outcome: a waiter never hangs
/// forever, it observes `None` and treats the prompt as declined.
type Waiter = oneshot::Sender<Option<PromptAnswer>>;

#[derive(Debug)]
pub struct PromptBus {
    next_cid: AtomicU64,
    waiters: Mutex<HashMap<PromptId, Waiter>>,
    /// Set by `cancel_all` at room teardown. A closed bus answers every
    /// later registration with the cancellation outcome immediately, so a
    /// hook that prompts mid-teardown cannot leak a waiter.
    closed: AtomicBool,
}

impl Default for PromptBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBus {
    pub fn new() -> Self {
        Self {
            next_cid: AtomicU64::new(1),
            waiters: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn new_cid(&self) -> PromptId {
        PromptId::new(self.next_cid.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a waiter for `cid`. At most one waiter may be outstanding
    /// per id; registering again replaces (and thereby cancels) the old one.
    pub fn wait_for(&self, cid: PromptId) -> oneshot::Receiver<Option<PromptAnswer>> {
        let (tx, rx) = oneshot::channel();
        if self.closed.load(Ordering::Acquire) {
            let _ = tx.send(None);
            return rx;
        }
        if let Ok(mut waiters) = self.waiters.lock() {
            waiters.insert(cid, tx);
        }
        rx
    }

    /// Resolve the waiter for `cid`, if any. Unknown and already-resolved
    /// ids are ignored.
    pub fn fulfill(&self, cid: PromptId, answer: Option<PromptAnswer>) {
        let waiter = match self.waiters.lock() {
            Ok(mut waiters) => waiters.remove(&cid),
            Err(_) => None,
        };
        if let Some(tx) = waiter {
            // The receiver may have been dropped; that is fine.
            let _ = tx.send(answer);
        }
    }

    /// Resolve every outstanding waiter with the cancellation outcome and
    /// close the bus. Used at room teardown so no suspended caller is
    /// leaked, then and later.
    pub fn cancel_all(&self) {
        self.closed.store(true, Ordering::Release);
        let drained: Vec<Waiter> = match self.waiters.lock() {
            Ok(mut waiters) => waiters.drain().map(|(_, tx)| tx).collect(),
            Err(_) => Vec::new(),
        };
        for tx in drained {
            let _ = tx.send(None);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.waiters.lock().map(|w| w.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grimoire_domain::PlayerId;

    #[tokio::test]
    async fn fulfill_resolves_the_matching_waiter() {
        let bus = PromptBus::new();
        let cid = bus.new_cid();
        let rx = bus.wait_for(cid);

        let pid = PlayerId::new();
        bus.fulfill(cid, Some(PromptAnswer::One(pid)));
        assert_eq!(rx.await.ok().flatten(), Some(PromptAnswer::One(pid)));
        assert_eq!(bus.pending_count(), 0);
    }

    #[tokio::test]
    async fn unknown_and_repeated_ids_are_silent_noops() {
        let bus = PromptBus::new();
        bus.fulfill(PromptId::new(999), Some(PromptAnswer::Confirm(true)));

        let cid = bus.new_cid();
        let rx = bus.wait_for(cid);
        bus.fulfill(cid, Some(PromptAnswer::Confirm(true)));
        // Second fulfilment of the same id has no one to wake.
        bus.fulfill(cid, Some(PromptAnswer::Confirm(false)));
        assert_eq!(rx.await.ok().flatten(), Some(PromptAnswer::Confirm(true)));
    }

    #[tokio::test]
    async fn cancel_all_resolves_every_waiter_exactly_once() {
        let bus = PromptBus::new();
        let rx1 = bus.wait_for(bus.new_cid());
        let rx2 = bus.wait_for(bus.new_cid());

        bus.cancel_all();
        assert_eq!(rx1.await.ok().flatten(), None);
        assert_eq!(rx2.await.ok().flatten(), None);
        assert_eq!(bus.pending_count(), 0);
    }

    #[tokio::test]
    async fn a_closed_bus_declines_new_registrations_immediately() {
        let bus = PromptBus::new();
        bus.cancel_all();

        let rx = bus.wait_for(bus.new_cid());
        assert_eq!(rx.await.ok().flatten(), None);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn correlation_ids_are_unique_and_monotonic() {
        let bus = PromptBus::new();
        let a = bus.new_cid();
        let b = bus.new_cid();
        assert!(b > a);
    }
}
