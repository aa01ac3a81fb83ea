//! Investigator: learns on the first night that one of two players is a
//! particular Minion. Poison shows a wrong pair instead.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Investigator {
    owner: Option<PlayerId>,
}

impl Investigator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Investigator {
    fn id(&self) -> &'static str {
        "Investigator"
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
        if game.night() != 1 {
            return;
        }
        let Some(me) = self.owner else { return };
        if !game.player(me).map(|p| p.alive).unwrap_or(false) {
            return;
        }

        let minion = game
            .players()
            .iter()
            .find(|p| p.role.as_ref().map(|r| r.role_type()) == Some(RoleType::Minion));
        let role_name = minion
            .and_then(|p| p.role_id())
            .unwrap_or("Poisoner")
            .to_string();
        let minion_id = minion.map(|p| p.id);

        let candidates: Vec<PlayerId> = game
            .players()
            .iter()
            .filter(|p| p.id != me)
            .map(|p| p.id)
            .collect();
        if candidates.len() < 2 {
            return;
        }

        let my_name = game.player_name(me);
        if game.is_poisoned(me) || minion_id.is_none() {
            // Wrong info: both shown players are not the minion.
            game.log.push(format!(
                "{my_name} (Investigator) sees that {} or {} is the {role_name}",
                game.player_name(candidates[0]),
                game.player_name(candidates[1])
            ));
            return;
        }
        let minion_id = minion_id.unwrap_or(candidates[0]);

        let Some(bluff) = candidates.iter().find(|pid| **pid != minion_id).copied() else {
            return;
        };
        game.log.push(format!(
            "{my_name} (Investigator) sees that {} or {} is the {role_name}",
            game.player_name(minion_id),
            game.player_name(bluff)
        ));
    }
}
