//! Washerwoman: learns on the first night that one of two players is a
//! particular Townsfolk. The storyteller picks the true candidate and the
//! bluff through setup tasks before night one.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GameError;
use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

pub const SELECT_TOWNSFOLK: &str = "select_townsfolk";
pub const SELECT_WRONG: &str = "select_wrong";

#[derive(Debug, Default)]
pub struct Washerwoman {
    owner: Option<PlayerId>,
    shown_townsfolk: Option<PlayerId>,
    bluff: Option<PlayerId>,
}

impl Washerwoman {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Washerwoman {
    fn id(&self) -> &'static str {
        "Washerwoman"
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
        let townsfolk: Vec<PlayerId> = game
            .alive_players()
            .iter()
            .filter(|p| p.id != me && p.role.as_ref().map(|r| r.role_type()) == Some(RoleType::Townsfolk))
            .map(|p| p.id)
            .collect();
        if !townsfolk.is_empty() {
            game.request_setup_task(
                SELECT_TOWNSFOLK,
                self.id(),
                me,
                "Pick the townsfolk the Washerwoman learns",
                townsfolk,
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
        match kind {
            SELECT_TOWNSFOLK => {
                if !still_alive {
                    return Err(GameError::invalid_operation(
                        "selection is no longer a living player",
                    ));
                }
                self.shown_townsfolk = Some(selection);
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
                        "Pick the bluff shown beside the true townsfolk",
                        wrong,
                        Value::Null,
                    );
                }
                Ok(())
            }
            SELECT_WRONG => {
                if !still_alive {
                    return Err(GameError::invalid_operation(
                        "selection is no longer a living player",
                    ));
                }
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

        let townsfolk: Vec<PlayerId> = game
            .alive_players()
            .iter()
            .filter(|p| p.id != me && p.role.as_ref().map(|r| r.role_type()) == Some(RoleType::Townsfolk))
            .map(|p| p.id)
            .collect();
        let Some(&first_townsfolk) = townsfolk.first() else {
            return;
        };
        let shown = self
            .shown_townsfolk
            .filter(|pid| townsfolk.contains(pid))
            .unwrap_or(first_townsfolk);

        let others: Vec<PlayerId> = game
            .alive_players()
            .iter()
            .filter(|p| p.id != me && p.id != shown)
            .map(|p| p.id)
            .collect();
        let Some(&first_other) = others.first() else {
            return;
        };
        let bluff = self
            .bluff
            .filter(|pid| others.contains(pid))
            .unwrap_or(first_other);

        let my_name = game.player_name(me);
        if game.is_poisoned(me) {
            // Two false candidates while poisoned.
            let last = others.last().copied().unwrap_or(bluff);
            game.log.push(format!(
                "{my_name} (Washerwoman) sees that {} or {} is a townsfolk",
                game.player_name(bluff),
                game.player_name(last)
            ));
        } else {
            game.log.push(format!(
                "{my_name} (Washerwoman) sees that {} or {} is a townsfolk",
                game.player_name(shown),
                game.player_name(bluff)
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::GameEvent;
    use crate::testkit;

    #[test]
    fn setup_task_cascades_from_townsfolk_to_bluff() {
        let (mut game, ids) = testkit::game_with_roles(&[
            "Washerwoman", "Empath", "Chef", "Imp", "Recluse",
        ]);

        let mut ww = game.player_mut(ids[0]).expect("p").role.take().expect("role");
        ww.on_setup(&mut game);

        let events = game.drain_events();
        let Some(GameEvent::SetupTaskRequested { kind, options, .. }) = events.first() else {
            panic!("expected a setup task request");
        };
        assert_eq!(kind, SELECT_TOWNSFOLK);
        // The Empath and the Chef are the only other townsfolk.
        assert_eq!(options.len(), 2);

        ww.apply_setup(SELECT_TOWNSFOLK, ids[1], &mut game)
            .expect("apply");
        let events = game.drain_events();
        let Some(GameEvent::SetupTaskRequested { kind, options, .. }) = events.first() else {
            panic!("expected the cascaded request");
        };
        assert_eq!(kind, SELECT_WRONG);
        assert!(!options.contains(&ids[0]));
        assert!(!options.contains(&ids[1]));

        ww.apply_setup(SELECT_WRONG, ids[4], &mut game).expect("apply");
        game.player_mut(ids[0]).expect("p").role = Some(ww);
    }

    #[tokio::test]
    async fn night_one_shows_the_chosen_pair() {
        let (mut game, ids) = testkit::game_with_roles(&[
            "Washerwoman", "Empath", "Chef", "Imp", "Recluse",
        ]);
        game.phase = crate::game::Phase::Night;
        game.night = 1;

        let mut ww = game.player_mut(ids[0]).expect("p").role.take().expect("role");
        ww.apply_setup(SELECT_TOWNSFOLK, ids[1], &mut game).expect("apply");
        game.drain_events();
        ww.apply_setup(SELECT_WRONG, ids[4], &mut game).expect("apply");
        ww.on_night(&mut game, &crate::prompt::AutoPrompt).await;
        game.player_mut(ids[0]).expect("p").role = Some(ww);

        let line = game
            .log()
            .iter()
            .find(|l| l.contains("Washerwoman"))
            .expect("info line");
        assert!(line.contains("P2") && line.contains("P5"), "line: {line}");
    }
}
