//! Per-audience view DTOs.
//!
//! Three audiences, three redaction rules: seated players see only their
//! own role (and only once the room has left "open"); the storyteller sees
//! every occupied seat's role; room viewers see seat occupancy and counts,
//! never a role. The engine builds these from authoritative state after
//! every mutation.

use serde::{Deserialize, Serialize};

use grimoire_domain::{PlayerId, RoomId, TaskId, WakeEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Open,
    InPlay,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub gid: RoomId,
    pub name: String,
    pub script_name: String,
    pub storyteller_id: PlayerId,
    pub storyteller_name: String,
    pub status: RoomStatus,
}

/// One seat at the table, occupied or not. The role is populated only when
/// the audience is allowed to see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatView {
    pub seat: usize,
    pub occupant: Option<OccupantView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupantView {
    pub id: PlayerId,
    pub name: String,
    pub seat: usize,
    pub alive: bool,
    pub ghost: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectatorView {
    pub id: PlayerId,
    pub name: String,
}

/// A pending or answered setup task, as shown to the storyteller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub id: TaskId,
    pub kind: String,
    pub role: String,
    pub owner_id: PlayerId,
    pub prompt: String,
    pub options: Vec<PlayerId>,
    pub status: String,
}

/// What an anonymous room viewer sees: occupancy and counts, no roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    pub info: RoomInfo,
    pub seats: Vec<SeatView>,
    pub spectators: Vec<SpectatorView>,
    pub players: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouView {
    pub id: PlayerId,
    pub name: String,
    pub seat: Option<usize>,
    pub alive: bool,
    pub ghost: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStateView {
    pub phase: String,
    pub night: u32,
    pub status: RoomStatus,
    pub you: YouView,
}

/// A seated player's view: the room plus their own game state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    #[serde(flatten)]
    pub room: RoomView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerStateView>,
}

/// What the storyteller shows the evil team on the first night.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightOneView {
    pub demon_id: Option<PlayerId>,
    pub minion_ids: Vec<PlayerId>,
    /// Townsfolk role names not in play, offered to the demon as bluffs.
    pub demon_bluffs: Vec<String>,
}

/// The storyteller's unredacted view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorytellerView {
    #[serde(flatten)]
    pub room: RoomView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub night: Option<u32>,
    pub log: Vec<String>,
    pub tasks: Vec<TaskView>,
    pub wake_list: Vec<WakeEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub night_one: Option<NightOneView>,
}

/// The audience-shaped payload of a state broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AudienceView {
    Storyteller(Box<StorytellerView>),
    Player(Box<PlayerView>),
    Room(RoomView),
}
