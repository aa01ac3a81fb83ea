//! Ravenkeeper: fires only when killed during the night; learns one chosen
//! player's role, garbled while poisoned-like.

use async_trait::async_trait;

use crate::game::{Game, Phase};
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Ravenkeeper {
    owner: Option<PlayerId>,
}

impl Ravenkeeper {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Ravenkeeper {
    fn id(&self) -> &'static str {
        "Ravenkeeper"
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

    async fn on_death(&mut self, game: &mut Game, prompt: &dyn Prompt) {
        // Only a death during night processing wakes the Ravenkeeper.
        if game.phase() != Phase::Night {
            return;
        }
        let Some(me) = self.owner else { return };
        let candidates: Vec<PlayerId> = game
            .players()
            .iter()
            .filter(|p| p.id != me)
            .map(|p| p.id)
            .collect();
        if candidates.is_empty() {
            return;
        }
        let Some(pick) = prompt
            .choose_one(me, &candidates, "Choose a player to learn their role")
            .await
        else {
            return;
        };
        if !candidates.contains(&pick) {
            return;
        }

        let my_name = game.player_name(me);
        if game.is_poisoned_like(me) {
            game.log.push(format!("{my_name} (Ravenkeeper) learns ???"));
            return;
        }
        let role_id = game
            .player(pick)
            .ok()
            .and_then(|p| p.role_id())
            .unwrap_or("Unknown");
        game.log.push(format!(
            "{my_name} (Ravenkeeper) learns {} is the {role_id}",
            game.player_name(pick)
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::game::Phase;
    use crate::prompt::AutoPrompt;
    use crate::testkit;

    #[tokio::test]
    async fn fires_on_a_night_death_but_not_at_dusk() {
        let (mut game, ids) = testkit::game_with_roles(&[
            "Ravenkeeper", "Empath", "Chef", "Soldier", "Imp", "Recluse",
        ]);
        game.phase = Phase::Day;
        game.mark_dead(ids[0], "at dusk", &AutoPrompt).await;
        assert!(!game.log().iter().any(|l| l.contains("Ravenkeeper) learns")));

        let (mut game, ids) = testkit::game_with_roles(&[
            "Ravenkeeper", "Empath", "Chef", "Soldier", "Imp", "Recluse",
        ]);
        game.phase = Phase::Night;
        game.night = 2;
        game.mark_dead(ids[0], "at dawn", &AutoPrompt).await;
        assert!(game.log().iter().any(|l| l.contains("Ravenkeeper) learns")));
    }
}
