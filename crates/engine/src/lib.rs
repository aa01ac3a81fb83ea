//! Grimoire Engine library.
//!
//! Server-side room coordination on top of `grimoire-domain`:
//!
//! - `rooms/` - per-room orchestrator and the process-wide registry
//! - `prompt_bus` - correlation table for live prompts
//! - `ws_prompt` - the storyteller-backed [`grimoire_domain::Prompt`] impl
//! - `connections` - audience peer sets and best-effort fan-out
//! - `views` - per-audience snapshot construction
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - application composition

pub mod api;
pub mod app;
pub mod connections;
pub mod prompt_bus;
pub mod rooms;
pub mod views;
pub mod ws_prompt;

pub use app::App;
