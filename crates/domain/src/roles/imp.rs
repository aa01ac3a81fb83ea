//! Imp: the demon. Picks a victim each night; the kill resolves at dawn
//! unless the target is protected or immune.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Imp {
    owner: Option<PlayerId>,
}

impl Imp {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Imp {
    fn id(&self) -> &'static str {
        "Imp"
    }

    fn team(&self) -> Team {
        Team::Evil
    }

    fn role_type(&self) -> RoleType {
        RoleType::Demon
    }

    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn set_owner(&mut self, owner: PlayerId) {
        self.owner = Some(owner);
    }

    async fn on_night(&mut self, game: &mut Game, _prompt: &dyn Prompt) {
        let Some(me) = self.owner else { return };
        if !game.player(me).map(|p| p.alive).unwrap_or(false) {
            return;
        }
        let Some(target) = game.choose_random_alive_other(me) else {
            return;
        };
        game.demon_attack(target);
    }
}
