//! Grimoire Domain - Core game engine for a storyteller-moderated
//! hidden-role game.
//!
//! This crate is transport-free: it models the phase state machine, the
//! role capability set, nomination/voting resolution and the script data
//! that drives deck building. Human input arrives through the [`Prompt`]
//! port; everything the outside world needs to observe is surfaced through
//! the game log and the [`GameEvent`] outbox.

pub mod error;
pub mod events;
pub mod game;
pub mod ids;
pub mod prompt;
pub mod role;
pub mod roles;
pub mod rules;
pub mod script;
pub mod voting;

#[cfg(test)]
pub(crate) mod testkit;

pub use error::GameError;
pub use events::{GameEvent, WakeEntry};
pub use game::{Game, Phase, Player};
pub use ids::{PlayerId, PromptId, RoomId, TaskId};
pub use prompt::{AutoPrompt, Prompt};
pub use role::{Role, RoleType, Team};
pub use rules::Rules;
pub use script::{GroupCounts, RoleRegistry, Script};
pub use voting::Nomination;
