//! Port for soliciting a decision from a human mid-resolution.
//!
//! Role hooks call these methods and logically suspend until the matching
//! answer arrives. A cancelled wait resolves to `None` / `false` rather
//! than hanging forever.

use async_trait::async_trait;

use crate::ids::PlayerId;

#[async_trait]
pub trait Prompt: Send + Sync {
    async fn choose_one(
        &self,
        requester: PlayerId,
        candidates: &[PlayerId],
        title: &str,
    ) -> Option<PlayerId>;

    async fn choose_two(
        &self,
        requester: PlayerId,
        candidates: &[PlayerId],
        title: &str,
    ) -> Option<(PlayerId, PlayerId)>;

    async fn confirm(&self, requester: PlayerId, title: &str) -> bool;
}

/// Deterministic prompt that picks the first legal answer. Used by tests
/// and as a stand-in when no storyteller channel is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoPrompt;

#[async_trait]
impl Prompt for AutoPrompt {
    async fn choose_one(
        &self,
        _requester: PlayerId,
        candidates: &[PlayerId],
        _title: &str,
    ) -> Option<PlayerId> {
        candidates.first().copied()
    }

    async fn choose_two(
        &self,
        _requester: PlayerId,
        candidates: &[PlayerId],
        _title: &str,
    ) -> Option<(PlayerId, PlayerId)> {
        match candidates {
            [first, second, ..] => Some((*first, *second)),
            _ => None,
        }
    }

    async fn confirm(&self, _requester: PlayerId, _title: &str) -> bool {
        true
    }
}
