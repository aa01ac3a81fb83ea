//! Butler: picks a master each night. His "for" vote only counts when the
//! master also votes "for"; that adjustment happens when the nomination
//! closes.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Butler {
    owner: Option<PlayerId>,
    master: Option<PlayerId>,
}

impl Butler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Butler {
    fn id(&self) -> &'static str {
        "Butler"
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

    async fn on_night(&mut self, game: &mut Game, prompt: &dyn Prompt) {
        let Some(me) = self.owner else { return };
        if !game.player(me).map(|p| p.alive).unwrap_or(false) {
            return;
        }
        let candidates = game.alive_other_ids(me);
        if candidates.is_empty() {
            return;
        }
        let Some(pick) = prompt.choose_one(me, &candidates, "Choose your master").await else {
            return;
        };
        if !candidates.contains(&pick) {
            return;
        }
        self.master = Some(pick);
        game.log.push(format!(
            "{} (Butler) chooses {} as master",
            game.player_name(me),
            game.player_name(pick)
        ));
    }

    fn chosen_master(&self) -> Option<PlayerId> {
        self.master
    }
}
