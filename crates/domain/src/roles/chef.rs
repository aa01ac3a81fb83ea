//! Chef: learns on the first night how many pairs of evil players sit next
//! to each other, counting the table as a circle.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Chef {
    owner: Option<PlayerId>,
}

impl Chef {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Chef {
    fn id(&self) -> &'static str {
        "Chef"
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

        let players = game.players();
        let mut pairs = 0usize;
        for i in 0..players.len() {
            let a = &players[i];
            let b = &players[(i + 1) % players.len()];
            let a_evil = a.role.as_ref().map(|r| r.team()) == Some(Team::Evil);
            let b_evil = b.role.as_ref().map(|r| r.team()) == Some(Team::Evil);
            if a_evil && b_evil {
                pairs += 1;
            }
        }
        if game.is_poisoned_like(me) {
            // Small skew rather than a truthful count.
            pairs = (pairs + 1) % 3;
        }
        game.log.push(format!(
            "{} (Chef) learns there are {pairs} pairs of evil neighbors",
            game.player_name(me)
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::game::Phase;
    use crate::prompt::AutoPrompt;
    use crate::testkit;

    async fn chef_line(roles: &[&str]) -> String {
        let (mut game, ids) = testkit::game_with_roles(roles);
        game.phase = Phase::Night;
        game.night = 1;
        let chef_seat = roles.iter().position(|r| *r == "Chef").expect("chef seated");
        let mut chef = game
            .player_mut(ids[chef_seat])
            .expect("p")
            .role
            .take()
            .expect("role");
        chef.on_night(&mut game, &AutoPrompt).await;
        game.player_mut(ids[chef_seat]).expect("p").role = Some(chef);
        game.log()
            .iter()
            .find(|l| l.contains("Chef"))
            .expect("info line")
            .clone()
    }

    #[tokio::test]
    async fn counts_adjacent_evil_pairs_cyclically() {
        // Imp and Poisoner seated together: one pair.
        let line = chef_line(&["Imp", "Poisoner", "Chef", "Empath", "Soldier"]).await;
        assert!(line.contains("1 pairs"), "line: {line}");
    }

    #[tokio::test]
    async fn wraparound_pair_is_counted() {
        // Evil in the first and last seats are neighbours on a circle.
        let line = chef_line(&["Imp", "Chef", "Empath", "Soldier", "Poisoner"]).await;
        assert!(line.contains("1 pairs"), "line: {line}");
    }

    #[tokio::test]
    async fn separated_evil_means_zero_pairs() {
        let line = chef_line(&["Imp", "Chef", "Poisoner", "Empath", "Soldier"]).await;
        assert!(line.contains("0 pairs"), "line: {line}");
    }
}
