//! Spy: sees the grimoire every night. The storyteller shows it out of
//! band; the log records that the Spy woke.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Spy {
    owner: Option<PlayerId>,
}

impl Spy {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Spy {
    fn id(&self) -> &'static str {
        "Spy"
    }

    fn team(&self) -> Team {
        Team::Evil
    }

    fn role_type(&self) -> RoleType {
        RoleType::Minion
    }

    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn set_owner(&mut self, owner: PlayerId) {
        self.owner = Some(owner);
    }

    async fn on_night(&mut self, game: &mut Game, _prompt: &dyn Prompt) {
        let Some(me) = self.owner else { return };
        if game.player(me).map(|p| p.alive).unwrap_or(false) {
            game.log
                .push(format!("{} (Spy) observes the grimoire", game.player_name(me)));
        }
    }
}
