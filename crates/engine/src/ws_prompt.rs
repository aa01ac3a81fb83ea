//! [`Prompt`] implementation backed by the storyteller socket.
//!
//! Each ask sends a correlated prompt frame to the storyteller and awaits
//! the matching answer on the bus. A cancelled or mismatched answer
//! resolves to the declined outcome; the caller never hangs.

use std::sync::Arc;

use async_trait::async_trait;

use grimoire_domain::{PlayerId, Prompt, PromptId, RoomId};
use grimoire_shared::{Envelope, PromptAnswer, ServerMessage};

use crate::connections::RoomPeers;
use crate::prompt_bus::PromptBus;

#[derive(Clone, Debug)]
pub struct WsPrompt {
    gid: RoomId,
    bus: Arc<PromptBus>,
    peers: Arc<RoomPeers>,
}

impl WsPrompt {
    pub fn new(gid: RoomId, bus: Arc<PromptBus>, peers: Arc<RoomPeers>) -> Self {
        Self { gid, bus, peers }
    }

    async fn ask(
        &self,
        requester: PlayerId,
        kind: &str,
        title: &str,
        candidates: &[PlayerId],
    ) -> Option<PromptAnswer> {
        let cid = self.bus.new_cid();
        let rx = self.bus.wait_for(cid);
        self.peers
            .send_to_storyteller(Envelope::new(
                self.gid,
                ServerMessage::Prompt {
                    cid,
                    seat: requester,
                    kind: kind.to_string(),
                    title: title.to_string(),
                    candidates: candidates.to_vec(),
                },
            ))
            .await;
        tracing::debug!(cid = %cid, kind, "prompt sent to storyteller");
        // A dropped sender (room teardown) reads the same as an explicit
        // cancellation.
        rx.await.ok().flatten()
    }
}

#[async_trait]
impl Prompt for WsPrompt {
    async fn choose_one(
        &self,
        requester: PlayerId,
        candidates: &[PlayerId],
        title: &str,
    ) -> Option<PlayerId> {
        match self.ask(requester, "choose_one", title, candidates).await {
            Some(PromptAnswer::One(pid)) => Some(pid),
            _ => None,
        }
    }

    async fn choose_two(
        &self,
        requester: PlayerId,
        candidates: &[PlayerId],
        title: &str,
    ) -> Option<(PlayerId, PlayerId)> {
        match self.ask(requester, "choose_two", title, candidates).await {
            Some(PromptAnswer::Two([a, b])) => Some((a, b)),
            _ => None,
        }
    }

    async fn confirm(&self, requester: PlayerId, title: &str) -> bool {
        matches!(
            self.ask(requester, "confirm", title, &[]).await,
            Some(PromptAnswer::Confirm(true))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answer_resumes_the_suspended_ask() {
        let bus = Arc::new(PromptBus::new());
        let peers = Arc::new(RoomPeers::new());
        let prompt = WsPrompt::new(RoomId::new(), bus.clone(), peers);

        let requester = PlayerId::new();
        let target = PlayerId::new();
        let candidates = vec![target];

        let asker = tokio::spawn({
            let prompt = prompt.clone();
            async move { prompt.choose_one(requester, &candidates, "Poison whom?").await }
        });

        // The prompt registers cid 1 on this fresh bus.
        tokio::task::yield_now().await;
        bus.fulfill(PromptId::new(1), Some(PromptAnswer::One(target)));
        assert_eq!(asker.await.expect("join"), Some(target));
    }

    #[tokio::test]
    async fn cancellation_resolves_to_declined() {
        let bus = Arc::new(PromptBus::new());
        let peers = Arc::new(RoomPeers::new());
        let prompt = WsPrompt::new(RoomId::new(), bus.clone(), peers);

        let requester = PlayerId::new();
        let asker = tokio::spawn({
            let prompt = prompt.clone();
            async move { prompt.confirm(requester, "Proceed?").await }
        });

        tokio::task::yield_now().await;
        bus.cancel_all();
        assert!(!asker.await.expect("join"));
    }

    #[tokio::test]
    async fn mismatched_answer_shape_reads_as_declined() {
        let bus = Arc::new(PromptBus::new());
        let peers = Arc::new(RoomPeers::new());
        let prompt = WsPrompt::new(RoomId::new(), bus.clone(), peers);

        let requester = PlayerId::new();
        let candidates = vec![PlayerId::new(), PlayerId::new()];
        let asker = tokio::spawn({
            let prompt = prompt.clone();
            async move { prompt.choose_two(requester, &candidates, "Choose two").await }
        });

        tokio::task::yield_now().await;
        bus.fulfill(PromptId::new(1), Some(PromptAnswer::Confirm(true)));
        assert_eq!(asker.await.expect("join"), None);
    }
}
