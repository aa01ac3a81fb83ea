//! HTTP request and response bodies for the room lifecycle endpoints.

use serde::{Deserialize, Serialize};

use grimoire_domain::PlayerId;

use crate::views::RoomInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub seat_count: Option<usize>,
    pub creator: Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room: RoomInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitRequest {
    pub spectator_id: PlayerId,
    pub seat_no: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacateRequest {
    pub player_id: PlayerId,
    pub seat_no: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeSeatsRequest {
    pub seat_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupTaskAnswer {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResponse {
    pub ok: bool,
    pub phase: String,
    pub night: u32,
}
