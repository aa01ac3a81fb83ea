//! Librarian: learns on the first night that one of two players is a
//! particular Outsider. Mirrors the Washerwoman's setup-task cascade.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GameError;
use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

pub const SELECT_OUTSIDER: &str = "select_outsider";
pub const SELECT_WRONG: &str = "select_wrong";

#[derive(Debug, Default)]
pub struct Librarian {
    owner: Option<PlayerId>,
    shown_outsider: Option<PlayerId>,
    bluff: Option<PlayerId>,
}

impl Librarian {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Librarian {
    fn id(&self) -> &'static str {
        "Librarian"
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

    fn on_setup(&mut self, game: &mut Game) {
        let Some(me) = self.owner else { return };
        let outsiders: Vec<PlayerId> = game
            .alive_players()
            .iter()
            .filter(|p| p.id != me && p.role.as_ref().map(|r| r.role_type()) == Some(RoleType::Outsider))
            .map(|p| p.id)
            .collect();
        if !outsiders.is_empty() {
            game.request_setup_task(
                SELECT_OUTSIDER,
                self.id(),
                me,
                "Pick the outsider the Librarian learns",
                outsiders,
                Value::Null,
            );
        }
    }

    fn apply_setup(
        &mut self,
        kind: &str,
        selection: PlayerId,
        game: &mut Game,
    ) -> Result<(), GameError> {
        let Some(me) = self.owner else {
            return Err(GameError::invalid_operation("role has no owner"));
        };
        let still_alive = game.player(selection).map(|p| p.alive).unwrap_or(false);
        if !still_alive {
            return Err(GameError::invalid_operation(
                "selection is no longer a living player",
            ));
        }
        match kind {
            SELECT_OUTSIDER => {
                self.shown_outsider = Some(selection);
                let wrong: Vec<PlayerId> = game
                    .alive_players()
                    .iter()
                    .filter(|p| p.id != me && p.id != selection)
                    .map(|p| p.id)
                    .collect();
                if !wrong.is_empty() {
                    game.request_setup_task(
                        SELECT_WRONG,
                        self.id(),
                        me,
                        "Pick the bluff shown beside the true outsider",
                        wrong,
                        Value::Null,
                    );
                }
                Ok(())
            }
            SELECT_WRONG => {
                self.bluff = Some(selection);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn on_night(&mut self, game: &mut Game, _prompt: &dyn Prompt) {
        if game.night() != 1 {
            return;
        }
        let Some(me) = self.owner else { return };
        if !game.player(me).map(|p| p.alive).unwrap_or(false) {
            return;
        }

        let outsiders: Vec<PlayerId> = game
            .players()
            .iter()
            .filter(|p| p.role.as_ref().map(|r| r.role_type()) == Some(RoleType::Outsider))
            .map(|p| p.id)
            .collect();
        let others: Vec<PlayerId> = game
            .players()
            .iter()
            .filter(|p| p.id != me)
            .map(|p| p.id)
            .collect();
        if others.len() < 2 {
            return;
        }

        let my_name = game.player_name(me);
        if game.is_poisoned_like(me) || outsiders.is_empty() {
            game.log.push(format!(
                "{my_name} (Librarian) sees that {} or {} is an outsider",
                game.player_name(others[0]),
                game.player_name(others[1])
            ));
            return;
        }

        let shown = self
            .shown_outsider
            .filter(|pid| outsiders.contains(pid))
            .unwrap_or(outsiders[0]);
        let bluff = self
            .bluff
            .filter(|pid| *pid != shown && others.contains(pid))
            .or_else(|| others.iter().find(|pid| **pid != shown).copied());
        let Some(bluff) = bluff else { return };

        game.log.push(format!(
            "{my_name} (Librarian) sees that {} or {} is an outsider",
            game.player_name(shown),
            game.player_name(bluff)
        ));
    }
}
