//! Grimoire Shared - Wire contract between the engine and its clients.
//!
//! Message enums and view DTOs exchanged over the WebSocket connection.
//! The engine serializes [`ServerMessage`] values (wrapped in an
//! [`Envelope`] carrying the room id and a timestamp) and parses
//! [`ClientMessage`] values; clients do the reverse.

pub mod messages;
pub mod requests;
pub mod views;

pub use messages::{ClientMessage, Envelope, PromptAnswer, ServerMessage};
pub use views::{
    AudienceView, NightOneView, OccupantView, PlayerStateView, PlayerView, RoomInfo, RoomStatus,
    RoomView, SeatView, SpectatorView, StorytellerView, TaskView, YouView,
};
