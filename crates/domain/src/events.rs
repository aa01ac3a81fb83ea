//! Domain events emitted by the game.
//!
//! The game never holds a reference back into the room layer; it appends
//! events to an outbox which the room drains after each engine operation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::PlayerId;

/// One entry of the night wake list: a living role due to act tonight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeEntry {
    pub role: String,
    pub owner: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    /// A night has been prepared; the wake list names every present,
    /// living role in script order.
    NightPrepared { night: u32, wake_list: Vec<WakeEntry> },

    /// A role needs storyteller input before play can proceed.
    SetupTaskRequested {
        kind: String,
        role: String,
        owner_id: PlayerId,
        prompt: String,
        options: Vec<PlayerId>,
        payload: Value,
    },
}
