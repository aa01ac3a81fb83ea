//! Undertaker: on nights after the first, learns the role of the player
//! executed the previous day.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Undertaker {
    owner: Option<PlayerId>,
}

impl Undertaker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Undertaker {
    fn id(&self) -> &'static str {
        "Undertaker"
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

    async fn on_night(&mut self, game: &mut Game, _prompt: &dyn Prompt) {
        if game.night() < 2 {
            return;
        }
        let Some(me) = self.owner else { return };
        if !game.player(me).map(|p| p.alive).unwrap_or(false) {
            return;
        }
        let Some(executed) = game.last_executed() else {
            return;
        };

        let my_name = game.player_name(me);
        let seen_name = game.player_name(executed);
        if game.is_poisoned(me) {
            game.log
                .push(format!("{my_name} (Undertaker) learns {seen_name} was the ???"));
            return;
        }
        let role_id = game
            .player(executed)
            .ok()
            .and_then(|p| p.role_id())
            .unwrap_or("Unknown");
        game.log.push(format!(
            "{my_name} (Undertaker) learns {seen_name} was the {role_id}"
        ));
    }
}
