//! Saint: executing the Saint hands the game to evil on the spot.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Saint {
    owner: Option<PlayerId>,
}

impl Saint {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Saint {
    fn id(&self) -> &'static str {
        "Saint"
    }

    fn team(&self) -> Team {
        Team::Good
    }

    fn role_type(&self) -> RoleType {
        RoleType::Outsider
    }

    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn set_owner(&mut self, owner: PlayerId) {
        self.owner = Some(owner);
    }

    fn on_execution(&mut self, game: &mut Game, executed: PlayerId) {
        let Some(me) = self.owner else { return };
        if executed != me {
            return;
        }
        if game.player(me).map(|p| p.alive).unwrap_or(false) {
            game.set_force_winner(Team::Evil);
            game.log.push("Evil wins (Saint was executed)".to_string());
        }
    }
}
