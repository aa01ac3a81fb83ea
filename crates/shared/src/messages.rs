//! WebSocket message types for engine ↔ client communication.
//!
//! These types are used by both sides: the engine sends [`ServerMessage`]
//! (wrapped in an [`Envelope`]) and receives [`ClientMessage`]. Adding new
//! variants at the end is forward compatible; removing or renaming one is
//! a breaking change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grimoire_domain::{PlayerId, PromptId, RoomId, TaskId, WakeEntry};

use crate::views::{AudienceView, TaskView};

/// Outer wrapper for every server-sent frame: the room it concerns and
/// when it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub gid: RoomId,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub message: ServerMessage,
}

impl Envelope {
    pub fn new(gid: RoomId, message: ServerMessage) -> Self {
        Self {
            gid,
            ts: Utc::now(),
            message,
        }
    }
}

/// The answer a human gives to a live prompt. Untagged: a bare bool is a
/// confirmation, a single id answers `choose_one`, a pair answers
/// `choose_two`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptAnswer {
    Confirm(bool),
    One(PlayerId),
    Two([PlayerId; 2]),
}

/// Messages from a client to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Storyteller answers a live prompt by correlation id.
    Respond {
        cid: PromptId,
        #[serde(default)]
        answer: Option<PromptAnswer>,
    },
    /// Storyteller opens a nomination on behalf of a player.
    Nominate {
        nominator: PlayerId,
        target: PlayerId,
    },
    /// Storyteller records a vote on the open nomination.
    CastVote { voter: PlayerId, vote_for: bool },
    /// Storyteller closes the open nomination and tallies it.
    CloseNomination,
    /// Storyteller resolves the Slayer's public shot.
    Slay {
        slayer: PlayerId,
        target: PlayerId,
    },
    Heartbeat,
}

/// Messages from the engine to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame after a successful connect.
    Hello,
    /// Full per-audience snapshot; sent after every mutation.
    State { view: AudienceView },
    /// A role ability needs a human decision; answer with `Respond`.
    Prompt {
        cid: PromptId,
        seat: PlayerId,
        kind: String,
        title: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        candidates: Vec<PlayerId>,
    },
    /// A night has been prepared; storyteller-only.
    NightPrepared { night: u32, wake_list: Vec<WakeEntry> },
    /// New setup tasks await the storyteller.
    SetupTasks { tasks: Vec<TaskView> },
    /// A setup task was answered.
    TaskDone { id: TaskId },
    /// Every setup task is answered; the game can leave SETUP.
    SetupComplete,
    /// A player gave up their seat.
    PlayerVacatedSeat {
        player_id: PlayerId,
        player_name: String,
        seat: usize,
    },
    Error {
        code: String,
        message: String,
    },
    Pong,
}
