//! The role capability set.
//!
//! Every role variant implements the full hook set with default no-op
//! bodies, so the engine can invoke hooks uniformly without inspecting the
//! concrete type. Role-specific transient state (a chosen master, a poison
//! target, a red herring) lives inside the variant and is exposed through
//! the narrow read-only probes below instead of runtime attribute probing.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Good,
    Evil,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Good => "GOOD",
            Team::Evil => "EVIL",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    Townsfolk,
    Outsider,
    Minion,
    Demon,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Townsfolk => "TOWNSFOLK",
            RoleType::Outsider => "OUTSIDER",
            RoleType::Minion => "MINION",
            RoleType::Demon => "DEMON",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polymorphic ability hooks invoked by the engine at defined points.
///
/// Hooks receive the game mutably; the engine detaches the role from its
/// owner for the duration of a hook call, so a hook never observes itself
/// through the player list.
#[async_trait]
pub trait Role: fmt::Debug + Send + Sync {
    /// Stable string identity, matching the script's night-order entries.
    fn id(&self) -> &'static str;
    fn team(&self) -> Team;
    fn role_type(&self) -> RoleType;
    fn owner(&self) -> Option<PlayerId>;
    fn set_owner(&mut self, owner: PlayerId);

    /// Called once at game start. May request setup tasks via
    /// [`Game::request_setup_task`]; must not assume any task is answered.
    fn on_setup(&mut self, _game: &mut Game) {}

    /// Consume a human answer for a previously requested setup task.
    /// May chain a follow-up task request; tasks can cascade.
    fn apply_setup(
        &mut self,
        _kind: &str,
        _selection: PlayerId,
        _game: &mut Game,
    ) -> Result<(), GameError> {
        Ok(())
    }

    /// Invoked in script-defined night order, once per night, only while
    /// the owner is alive.
    async fn on_night(&mut self, _game: &mut Game, _prompt: &dyn Prompt) {}

    fn on_day_start(&mut self, _game: &mut Game) {}

    /// Death reaction; the game phase at call time tells the role whether
    /// the death happened during the night.
    async fn on_death(&mut self, _game: &mut Game, _prompt: &dyn Prompt) {}

    /// Execution-time effect, called before the death is resolved.
    fn on_execution(&mut self, _game: &mut Game, _executed: PlayerId) {}

    // ------------------------------------------------------------------
    // Read-only probes for engine-resolved interactions
    // ------------------------------------------------------------------

    /// The player this role is currently poisoning, if any.
    fn poisoned_target(&self) -> Option<PlayerId> {
        None
    }

    /// The master a Butler has chosen, if any.
    fn chosen_master(&self) -> Option<PlayerId> {
        None
    }

    /// One-shot public day ability. Returns true exactly once, consuming
    /// the use; roles without such an ability always return false.
    fn consume_day_ability(&mut self) -> bool {
        false
    }
}
