//! Fortune Teller: each night picks two players and learns whether either
//! is the demon. The storyteller seeds a red herring at setup; that player
//! always reads as a demon hit, and poison flips the whole reading.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GameError;
use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

pub const SELECT_RED_HERRING: &str = "select_red_herring";

#[derive(Debug, Default)]
pub struct FortuneTeller {
    owner: Option<PlayerId>,
    red_herring: Option<PlayerId>,
}

impl FortuneTeller {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for FortuneTeller {
    fn id(&self) -> &'static str {
        "Fortune Teller"
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
        let goods: Vec<PlayerId> = game
            .alive_players()
            .iter()
            .filter(|p| p.role.as_ref().map(|r| r.team()) == Some(Team::Good))
            .map(|p| p.id)
            .collect();
        if !goods.is_empty() {
            game.request_setup_task(
                SELECT_RED_HERRING,
                self.id(),
                me,
                "Pick a red herring for the Fortune Teller",
                goods,
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
        if kind != SELECT_RED_HERRING {
            return Ok(());
        }
        let still_alive = game.player(selection).map(|p| p.alive).unwrap_or(false);
        if !still_alive {
            return Err(GameError::invalid_operation(
                "selection is no longer a living player",
            ));
        }
        // The herring persists for the whole game.
        self.red_herring = Some(selection);
        Ok(())
    }

    async fn on_night(&mut self, game: &mut Game, prompt: &dyn Prompt) {
        let Some(me) = self.owner else { return };
        if !game.player(me).map(|p| p.alive).unwrap_or(false) {
            return;
        }
        let candidates = game.alive_other_ids(me);
        if candidates.len() < 2 {
            return;
        }
        let Some((a, b)) = prompt.choose_two(me, &candidates, "Choose two players").await else {
            return;
        };
        if !candidates.contains(&a) || !candidates.contains(&b) {
            return;
        }

        let demon_present = [a, b].iter().any(|pid| {
            game.player(*pid)
                .ok()
                .and_then(|p| p.role.as_ref())
                .map(|r| r.role_type() == RoleType::Demon)
                .unwrap_or(false)
        });
        let herring_hit = self.red_herring.map(|h| h == a || h == b).unwrap_or(false);
        let mut sees_yes = demon_present || herring_hit;
        if game.is_poisoned(me) {
            sees_yes = !sees_yes;
        }

        game.log.push(format!(
            "{} sees {} when checking {} & {}",
            game.player_name(me),
            if sees_yes { "YES" } else { "NO" },
            game.player_name(a),
            game.player_name(b)
        ));
    }
}
