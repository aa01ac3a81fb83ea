//! Empath: learns each night how many of their two seated neighbours are
//! evil, wrapping around the ends of the table.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Empath {
    owner: Option<PlayerId>,
}

impl Empath {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Empath {
    fn id(&self) -> &'static str {
        "Empath"
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
        let Some(me) = self.owner else { return };
        if !game.player(me).map(|p| p.alive).unwrap_or(false) {
            return;
        }
        let evil_neighbours = {
            let Some((left, right)) = game.seat_neighbours(me) else {
                return;
            };
            [left, right]
                .iter()
                .filter(|p| p.role.as_ref().map(|r| r.team()) == Some(Team::Evil))
                .count()
        };
        let evil_neighbours = if game.is_poisoned_like(me) {
            (evil_neighbours + 1) % 3
        } else {
            evil_neighbours
        };
        game.log.push(format!(
            "{} (Empath) senses {evil_neighbours} evil neighbours",
            game.player_name(me)
        ));
    }
}
