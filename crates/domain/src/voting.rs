//! Nomination, voting and execution arithmetic.
//!
//! A day may produce many nominations sequentially, but at most one is open
//! at a time and at most one is retained as best-on-block. Replacement is
//! strictly-greater only: tied leaders never get executed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::{Game, Phase};
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::RoleType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nomination {
    pub nominator: PlayerId,
    pub target: PlayerId,
    /// Always equals the number of `true` entries in `votes`.
    pub votes_for: usize,
    pub closed: bool,
    /// Current vote per voter; a re-cast overwrites.
    pub votes: HashMap<PlayerId, bool>,
}

impl Nomination {
    fn new(nominator: PlayerId, target: PlayerId) -> Self {
        Self {
            nominator,
            target,
            votes_for: 0,
            closed: false,
            votes: HashMap::new(),
        }
    }
}

impl Game {
    /// Strictly more than half the living players.
    pub fn majority_required(&self) -> usize {
        self.alive_count() / 2 + 1
    }

    /// Open a nomination. Resolves the Virgin trigger immediately: a
    /// healthy Virgin nominated by a healthy Townsfolk is executed on the
    /// spot and the nomination closes without a vote.
    pub async fn start_nomination(
        &mut self,
        nominator: PlayerId,
        target: PlayerId,
        prompt: &dyn Prompt,
    ) -> Result<(), GameError> {
        if self.phase != Phase::Day {
            return Err(GameError::invalid_operation(
                "nominations are only open during the day",
            ));
        }
        if let Some(n) = &self.current_nomination {
            if !n.closed {
                return Err(GameError::invalid_operation(
                    "another nomination is still open",
                ));
            }
        }
        if !self.player(nominator)?.alive {
            return Err(GameError::invalid_operation("dead players cannot nominate"));
        }
        if !self.player(target)?.alive {
            return Err(GameError::invalid_operation(
                "dead players cannot be nominated",
            ));
        }

        self.current_nomination = Some(Nomination::new(nominator, target));
        self.log.push(format!(
            "Nomination: {} nominates {}",
            self.player_name(nominator),
            self.player_name(target)
        ));

        let target_is_virgin = self.player(target)?.role_id() == Some("Virgin");
        if target_is_virgin && !self.is_poisoned_like(target) {
            let nominator_type = self
                .player(nominator)?
                .role
                .as_ref()
                .map(|r| r.role_type());
            if nominator_type == Some(RoleType::Townsfolk) && !self.is_poisoned_like(nominator) {
                self.log
                    .push("Virgin ability triggers: immediate execution".to_string());
                self.execute(target, prompt).await;
                if let Some(n) = &mut self.current_nomination {
                    n.closed = true;
                }
            }
        }
        Ok(())
    }

    /// Record or overwrite a vote. Living voters may always vote; a dead
    /// voter spends their single ghost vote on first cast.
    pub fn cast_vote(&mut self, voter: PlayerId, vote_for: bool) -> Result<(), GameError> {
        match &self.current_nomination {
            None => {
                return Err(GameError::invalid_operation("no nomination to vote on"));
            }
            Some(n) if n.closed => {
                return Err(GameError::invalid_operation("nomination is closed"));
            }
            Some(_) => {}
        }

        let p = self.player(voter)?;
        let can_vote = p.alive || p.ghost_vote_available;
        if !can_vote {
            return Err(GameError::invalid_operation(
                "ghost vote already spent",
            ));
        }
        let is_ghost = !p.alive;

        let Some(n) = self.current_nomination.as_mut() else {
            return Err(GameError::invalid_operation("no nomination to vote on"));
        };
        // Incremental tally from the prior value, not a full recount.
        let prev = n.votes.insert(voter, vote_for);
        match (prev, vote_for) {
            (Some(true), false) => n.votes_for -= 1,
            (Some(false), true) | (None, true) => n.votes_for += 1,
            _ => {}
        }

        if is_ghost {
            if let Ok(p) = self.player_mut(voter) {
                p.ghost_vote_available = false;
            }
        }
        Ok(())
    }

    /// Close the open nomination, apply the Butler rule, compare against
    /// the majority, and update best-on-block on strictly greater votes.
    /// Returns whether the tally reached a majority.
    pub fn close_nomination(&mut self) -> Result<bool, GameError> {
        match &self.current_nomination {
            None => return Err(GameError::invalid_operation("no nomination to close")),
            Some(n) if n.closed => {
                return Err(GameError::invalid_operation("nomination already closed"));
            }
            Some(_) => {}
        }

        // A Butler's "for" only counts if their chosen master also voted
        // "for"; otherwise it is zeroed post hoc.
        let mut zeroed: Vec<PlayerId> = Vec::new();
        if let Some(n) = &self.current_nomination {
            for (&voter, &voted_for) in &n.votes {
                if !voted_for {
                    continue;
                }
                let Ok(p) = self.player(voter) else { continue };
                if p.role_id() != Some("Butler") {
                    continue;
                }
                let master = p.role.as_ref().and_then(|r| r.chosen_master());
                let master_voted_for = master
                    .map(|m| n.votes.get(&m).copied().unwrap_or(false))
                    .unwrap_or(false);
                if !master_voted_for {
                    zeroed.push(voter);
                }
            }
        }

        let needed = self.majority_required();
        let Some(n) = self.current_nomination.as_mut() else {
            return Err(GameError::invalid_operation("no nomination to close"));
        };
        n.closed = true;
        for voter in zeroed {
            n.votes.insert(voter, false);
            n.votes_for -= 1;
        }
        let passes = n.votes_for >= needed;
        let snapshot = n.clone();

        let for_names: Vec<String> = snapshot
            .votes
            .iter()
            .filter(|(_, &v)| v)
            .map(|(&pid, _)| self.player_name(pid))
            .collect();
        let against_names: Vec<String> = snapshot
            .votes
            .iter()
            .filter(|(_, &v)| !v)
            .map(|(&pid, _)| self.player_name(pid))
            .collect();
        self.log.push(format!(
            "Votes for {}: {} (needed {}) -> {}",
            self.player_name(snapshot.target),
            snapshot.votes_for,
            needed,
            if passes { "MAJORITY" } else { "NO MAJORITY" }
        ));
        self.log.push(format!(
            "For: {} | Against: {}",
            if for_names.is_empty() { "-".to_string() } else { for_names.join(", ") },
            if against_names.is_empty() { "-".to_string() } else { against_names.join(", ") },
        ));

        // Strictly greater takes the block; equal tallies leave tied
        // leaders, and tied leaders never get executed.
        let best_votes = self.best_nomination.as_ref().map(|best| best.votes_for);
        match best_votes {
            None => self.best_nomination = Some(snapshot),
            Some(v) if snapshot.votes_for > v => {
                self.best_nomination = Some(snapshot);
                self.best_tied = false;
            }
            Some(v) if snapshot.votes_for == v => self.best_tied = true,
            Some(_) => {}
        }
        Ok(passes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AutoPrompt;
    use crate::testkit;

    fn day_game(roles: &[&str]) -> (Game, Vec<PlayerId>) {
        let (mut game, ids) = testkit::game_with_roles(roles);
        game.phase = Phase::Day;
        (game, ids)
    }

    #[test]
    fn majority_is_floor_half_plus_one() {
        let (mut game, ids) = day_game(&[
            "Imp", "Empath", "Chef", "Soldier", "Recluse", "Monk", "Mayor", "Saint",
        ]);
        assert_eq!(game.majority_required(), 5); // 8 alive
        game.player_mut(ids[7]).expect("p").alive = false;
        assert_eq!(game.majority_required(), 4); // 7 alive
    }

    #[tokio::test]
    async fn tally_tracks_last_write_per_voter() {
        let (mut game, ids) = day_game(&["Imp", "Empath", "Chef", "Soldier", "Recluse"]);
        game.start_nomination(ids[1], ids[0], &AutoPrompt)
            .await
            .expect("nominate");

        game.cast_vote(ids[1], true).expect("vote");
        game.cast_vote(ids[2], true).expect("vote");
        game.cast_vote(ids[2], true).expect("re-vote same");
        game.cast_vote(ids[1], false).expect("flip");
        game.cast_vote(ids[3], false).expect("vote");
        game.cast_vote(ids[3], true).expect("flip back");

        let n = game.current_nomination().expect("open");
        assert_eq!(n.votes_for, 2);
        assert_eq!(
            n.votes_for,
            n.votes.values().filter(|v| **v).count(),
            "tally invariant"
        );
    }

    #[tokio::test]
    async fn ghost_vote_is_consumed_once() {
        let (mut game, ids) = day_game(&["Imp", "Empath", "Chef", "Soldier", "Recluse"]);
        game.mark_dead(ids[4], "at dawn", &AutoPrompt).await;
        game.start_nomination(ids[1], ids[0], &AutoPrompt)
            .await
            .expect("nominate");

        game.cast_vote(ids[4], true).expect("ghost vote");
        assert!(!game.player(ids[4]).expect("p").ghost_vote_available);
        let err = game.cast_vote(ids[4], false).expect_err("spent");
        assert!(matches!(err, GameError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn voting_outside_an_open_nomination_is_rejected() {
        let (mut game, ids) = day_game(&["Imp", "Empath", "Chef", "Soldier", "Recluse"]);
        assert!(game.cast_vote(ids[1], true).is_err());

        game.start_nomination(ids[1], ids[0], &AutoPrompt)
            .await
            .expect("nominate");
        game.close_nomination().expect("close");
        assert!(game.cast_vote(ids[1], true).is_err());
        assert!(game.close_nomination().is_err());
    }

    #[tokio::test]
    async fn ties_never_replace_best_on_block() {
        let (mut game, ids) = day_game(&[
            "Imp", "Empath", "Chef", "Soldier", "Recluse", "Monk",
        ]);
        game.start_nomination(ids[1], ids[0], &AutoPrompt)
            .await
            .expect("nominate");
        game.cast_vote(ids[1], true).expect("v");
        game.cast_vote(ids[2], true).expect("v");
        game.cast_vote(ids[3], true).expect("v");
        game.close_nomination().expect("close");
        assert_eq!(game.best_nomination().expect("best").target, ids[0]);

        // Same tally against a different target: best keeps the first.
        game.start_nomination(ids[2], ids[5], &AutoPrompt)
            .await
            .expect("nominate");
        game.cast_vote(ids[1], true).expect("v");
        game.cast_vote(ids[2], true).expect("v");
        game.cast_vote(ids[3], true).expect("v");
        game.close_nomination().expect("close");
        assert_eq!(game.best_nomination().expect("best").target, ids[0]);

        // Strictly greater does replace.
        game.start_nomination(ids[3], ids[4], &AutoPrompt)
            .await
            .expect("nominate");
        for pid in [ids[0], ids[1], ids[2], ids[3]] {
            game.cast_vote(pid, true).expect("v");
        }
        game.close_nomination().expect("close");
        assert_eq!(game.best_nomination().expect("best").target, ids[4]);
    }

    #[tokio::test]
    async fn tied_leaders_mean_no_execution_that_day() {
        let (mut game, ids) = day_game(&[
            "Imp", "Empath", "Chef", "Soldier", "Recluse", "Monk",
        ]);
        for target in [ids[0], ids[5]] {
            game.start_nomination(ids[1], target, &AutoPrompt)
                .await
                .expect("nominate");
            for pid in [ids[1], ids[2], ids[3], ids[4]] {
                game.cast_vote(pid, true).expect("v");
            }
            game.close_nomination().expect("close");
        }

        // The first target still holds the block, but the tie blocks dusk.
        assert_eq!(game.best_nomination().expect("best").target, ids[0]);

        game.phase = Phase::Execution;
        game.advance(&AutoPrompt).await.expect("advance");
        assert!(game.player(ids[0]).expect("p").alive);
        assert!(game.player(ids[5]).expect("p").alive);
        assert!(game
            .log()
            .iter()
            .any(|l| l.contains("No execution (tied votes)")));
    }

    #[tokio::test]
    async fn a_strictly_higher_tally_clears_an_earlier_tie() {
        let (mut game, ids) = day_game(&[
            "Imp", "Empath", "Chef", "Soldier", "Recluse", "Monk",
        ]);
        for target in [ids[0], ids[5]] {
            game.start_nomination(ids[1], target, &AutoPrompt)
                .await
                .expect("nominate");
            for pid in [ids[1], ids[2], ids[3], ids[4]] {
                game.cast_vote(pid, true).expect("v");
            }
            game.close_nomination().expect("close");
        }
        game.start_nomination(ids[2], ids[4], &AutoPrompt)
            .await
            .expect("nominate");
        for pid in [ids[0], ids[1], ids[2], ids[3], ids[5]] {
            game.cast_vote(pid, true).expect("v");
        }
        game.close_nomination().expect("close");

        game.phase = Phase::Execution;
        game.advance(&AutoPrompt).await.expect("advance");
        assert!(!game.player(ids[4]).expect("p").alive);
    }

    #[tokio::test]
    async fn butler_vote_counts_only_with_the_master() {
        let (mut game, ids) = day_game(&[
            "Imp", "Butler", "Empath", "Chef", "Soldier", "Recluse",
        ]);
        // Butler chose the Empath as master during the night.
        game.phase = Phase::Night;
        let mut butler = game.player_mut(ids[1]).expect("p").role.take().expect("role");
        butler.on_night(&mut game, &TestMaster(ids[2])).await;
        game.player_mut(ids[1]).expect("p").role = Some(butler);
        game.phase = Phase::Day;

        game.start_nomination(ids[2], ids[0], &AutoPrompt)
            .await
            .expect("nominate");
        game.cast_vote(ids[1], true).expect("butler for");
        game.cast_vote(ids[2], false).expect("master against");
        game.cast_vote(ids[3], true).expect("v");
        game.close_nomination().expect("close");

        let n = game.current_nomination().expect("closed");
        assert_eq!(n.votes_for, 1, "butler vote zeroed post hoc");
        assert_eq!(n.votes.get(&ids[1]), Some(&false));
    }

    #[tokio::test]
    async fn virgin_nomination_executes_the_virgin_immediately() {
        let (mut game, ids) = day_game(&[
            "Imp", "Virgin", "Empath", "Chef", "Soldier", "Recluse",
        ]);
        game.start_nomination(ids[2], ids[1], &AutoPrompt)
            .await
            .expect("nominate");

        assert!(!game.player(ids[1]).expect("virgin").alive);
        assert!(game.current_nomination().expect("n").closed);
        assert!(game
            .log()
            .iter()
            .any(|l| l.contains("Virgin ability triggers")));
    }

    #[tokio::test]
    async fn saint_execution_forces_an_evil_win() {
        let (mut game, ids) = day_game(&[
            "Imp", "Saint", "Empath", "Chef", "Soldier", "Recluse",
        ]);
        game.start_nomination(ids[2], ids[1], &AutoPrompt)
            .await
            .expect("nominate");
        for pid in [ids[0], ids[2], ids[3], ids[4]] {
            game.cast_vote(pid, true).expect("v");
        }
        assert!(game.close_nomination().expect("close"));

        game.execute(ids[1], &AutoPrompt).await;
        assert_eq!(game.force_winner(), Some(crate::role::Team::Evil));

        let rules = crate::rules::Rules;
        assert!(rules.check_end(&mut game));
        assert!(game.log().iter().any(|l| l.contains("Evil wins")));
    }

    #[tokio::test]
    async fn mayor_execution_is_redirected_to_no_death() {
        let (mut game, ids) = day_game(&[
            "Imp", "Mayor", "Empath", "Chef", "Soldier", "Recluse",
        ]);
        game.execute(ids[1], &AutoPrompt).await;
        assert!(game.player(ids[1]).expect("mayor").alive);
        assert!(game
            .log()
            .iter()
            .any(|l| l.contains("Mayor prevents an execution")));
    }

    /// Prompt stub that always picks a fixed player.
    struct TestMaster(PlayerId);

    #[async_trait::async_trait]
    impl Prompt for TestMaster {
        async fn choose_one(
            &self,
            _requester: PlayerId,
            _candidates: &[PlayerId],
            _title: &str,
        ) -> Option<PlayerId> {
            Some(self.0)
        }

        async fn choose_two(
            &self,
            _requester: PlayerId,
            _candidates: &[PlayerId],
            _title: &str,
        ) -> Option<(PlayerId, PlayerId)> {
            None
        }

        async fn confirm(&self, _requester: PlayerId, _title: &str) -> bool {
            false
        }
    }
}
