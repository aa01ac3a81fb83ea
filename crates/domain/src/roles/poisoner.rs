//! Poisoner: picks a victim each night. Information roles consult the
//! stored target through the poison checks on the game.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Poisoner {
    owner: Option<PlayerId>,
    poisoned: Option<PlayerId>,
}

impl Poisoner {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Poisoner {
    fn id(&self) -> &'static str {
        "Poisoner"
    }

    fn team(&self) -> Team {
        Team::Evil
    }

    fn role_type(&self) -> RoleType {
        RoleType::Minion
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
        let Some(pick) = prompt.choose_one(me, &candidates, "Poison whom?").await else {
            return;
        };
        if !candidates.contains(&pick) {
            return;
        }
        self.poisoned = Some(pick);
        game.log
            .push(format!("{} is poisoned tonight", game.player_name(pick)));
    }

    fn poisoned_target(&self) -> Option<PlayerId> {
        self.poisoned
    }
}

#[cfg(test)]
mod tests {
    use crate::game::Phase;
    use crate::prompt::AutoPrompt;
    use crate::testkit;

    #[tokio::test]
    async fn stored_target_drives_the_poison_check() {
        let (mut game, ids) = testkit::game_with_roles(&[
            "Poisoner", "Empath", "Chef", "Soldier", "Imp",
        ]);
        game.phase = Phase::Night;
        game.night = 1;

        let mut poisoner = game.player_mut(ids[0]).expect("p").role.take().expect("role");
        // AutoPrompt picks the first candidate: the Empath.
        poisoner.on_night(&mut game, &AutoPrompt).await;
        game.player_mut(ids[0]).expect("p").role = Some(poisoner);

        assert!(game.is_poisoned(ids[1]));
        assert!(!game.is_poisoned(ids[2]));
    }

    #[tokio::test]
    async fn a_dead_poisoner_no_longer_poisons() {
        let (mut game, ids) = testkit::game_with_roles(&[
            "Poisoner", "Empath", "Chef", "Soldier", "Imp",
        ]);
        game.phase = Phase::Night;
        game.night = 1;

        let mut poisoner = game.player_mut(ids[0]).expect("p").role.take().expect("role");
        poisoner.on_night(&mut game, &AutoPrompt).await;
        game.player_mut(ids[0]).expect("p").role = Some(poisoner);
        assert!(game.is_poisoned(ids[1]));

        game.mark_dead(ids[0], "at dusk", &AutoPrompt).await;
        assert!(!game.is_poisoned(ids[1]));
    }
}
