//! End-of-game rules, consulted during FINAL_CHECK.

use crate::game::Game;
use crate::role::{RoleType, Team};

/// Win-condition collaborator. A `true` result is terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rules;

impl Rules {
    /// Forced outcomes (a Saint execution) win regardless of the living
    /// count; otherwise good wins when no demon lives, evil when it
    /// matches or outnumbers good.
    pub fn check_end(&self, game: &mut Game) -> bool {
        if let Some(winner) = game.force_winner() {
            match winner {
                Team::Good => game.log.push("Good wins".to_string()),
                Team::Evil => game.log.push("Evil wins".to_string()),
            }
            return true;
        }

        let demon_alive = game.players().iter().any(|p| {
            p.alive
                && p.role
                    .as_ref()
                    .map(|r| r.role_type() == RoleType::Demon)
                    .unwrap_or(false)
        });
        let good_alive = game
            .players()
            .iter()
            .filter(|p| {
                p.alive
                    && p.role
                        .as_ref()
                        .map(|r| r.team() == Team::Good)
                        .unwrap_or(false)
            })
            .count();
        let evil_alive = game
            .players()
            .iter()
            .filter(|p| {
                p.alive
                    && p.role
                        .as_ref()
                        .map(|r| r.team() == Team::Evil)
                        .unwrap_or(false)
            })
            .count();

        if !demon_alive {
            game.log.push("Good wins".to_string());
            return true;
        }
        if evil_alive >= good_alive {
            game.log.push("Evil wins".to_string());
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AutoPrompt;
    use crate::testkit;

    #[tokio::test]
    async fn good_wins_when_the_demon_dies_without_an_heir() {
        let (mut game, ids) =
            testkit::game_with_roles(&["Imp", "Empath", "Chef", "Soldier", "Recluse"]);
        game.mark_dead(ids[0], "at dusk", &AutoPrompt).await;
        assert!(Rules.check_end(&mut game));
        assert!(game.log().iter().any(|l| l == "Good wins"));
    }

    #[tokio::test]
    async fn evil_wins_when_it_matches_good() {
        let (mut game, ids) = testkit::game_with_roles(&[
            "Imp", "Poisoner", "Empath", "Chef", "Soldier", "Recluse",
        ]);
        game.mark_dead(ids[3], "at dawn", &AutoPrompt).await;
        game.mark_dead(ids[4], "at dawn", &AutoPrompt).await;
        // 2 evil vs 2 good left.
        assert!(Rules.check_end(&mut game));
        assert!(game.log().iter().any(|l| l == "Evil wins"));
    }

    #[test]
    fn game_continues_while_good_outnumbers_evil() {
        let (mut game, _ids) = testkit::game_with_roles(&[
            "Imp", "Poisoner", "Empath", "Chef", "Soldier", "Recluse",
        ]);
        assert!(!Rules.check_end(&mut game));
    }
}
