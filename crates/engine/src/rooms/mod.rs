//! Room lifecycle: the per-room orchestrator and the process-wide registry.

pub mod registry;
pub mod room;

pub use registry::RoomRegistry;
pub use room::GameRoom;
