//! Monk: protects a chosen player from the demon for the night. The
//! protection is ineffective while the Monk is poisoned-like.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Monk {
    owner: Option<PlayerId>,
}

impl Monk {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Monk {
    fn id(&self) -> &'static str {
        "Monk"
    }

    fn team(&self) -> Team {
        Team::Good
    }

    fn role_type(&self) -> RoleType {
        RoleType::Townsfolk
    }

    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn set_owner(&mut self, owner: PlayerId) {
        self.owner = Some(owner);
    }

    async fn on_night(&mut self, game: &mut Game, prompt: &dyn Prompt) {
        let Some(me) = self.owner else { return };
        if !game.player(me).map(|p| p.alive).unwrap_or(false) {
            return;
        }
        let candidates = game.alive_other_ids(me);
        if candidates.is_empty() {
            return;
        }
        let Some(pick) = prompt.choose_one(me, &candidates, "Protect a player").await else {
            return;
        };
        if !candidates.contains(&pick) {
            return;
        }
        if game.is_poisoned_like(me) {
            game.log.push(format!(
                "{} (Monk) attempts to protect {}, but is poisoned",
                game.player_name(me),
                game.player_name(pick)
            ));
            return;
        }
        game.protect(pick);
        game.log.push(format!(
            "{} (Monk) protects {}",
            game.player_name(me),
            game.player_name(pick)
        ));
    }
}
