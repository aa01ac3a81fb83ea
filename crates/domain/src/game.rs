//! The game aggregate: phase state machine, night/day bookkeeping and
//! death resolution.
//!
//! All mutation goes through engine operations on [`Game`]; the room layer
//! observes outcomes via the in-game log and the event outbox.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GameError;
use crate::events::{GameEvent, WakeEntry};
use crate::ids::PlayerId;
use crate::prompt::Prompt;
use crate::role::{Role, RoleType, Team};
use crate::script::{RoleRegistry, Script};
use crate::voting::Nomination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Create,
    Setup,
    Night,
    Day,
    Voting,
    Execution,
    FinalCheck,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Create => "CREATE",
            Phase::Setup => "SETUP",
            Phase::Night => "NIGHT",
            Phase::Day => "DAY",
            Phase::Voting => "VOTING",
            Phase::Execution => "EXECUTION",
            Phase::FinalCheck => "FINAL_CHECK",
        }
    }

    /// Fixed successor table; the cycle re-enters NIGHT after FINAL_CHECK.
    pub fn successor(&self) -> Phase {
        match self {
            Phase::Create => Phase::Setup,
            Phase::Setup => Phase::Night,
            Phase::Night => Phase::Day,
            Phase::Day => Phase::Voting,
            Phase::Voting => Phase::Execution,
            Phase::Execution => Phase::FinalCheck,
            Phase::FinalCheck => Phase::Night,
        }
    }
}

#[derive(Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub seat: Option<usize>,
    pub alive: bool,
    pub role: Option<Box<dyn Role>>,
    /// Granted exactly once, at death; consumed on cast.
    pub ghost_vote_available: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, seat: Option<usize>) -> Self {
        Self {
            id,
            name: name.into(),
            seat,
            alive: true,
            role: None,
            ghost_vote_available: false,
        }
    }

    pub fn role_id(&self) -> Option<&'static str> {
        self.role.as_ref().map(|r| r.id())
    }
}

/// What the storyteller shows the evil team on the first night.
#[derive(Debug, Clone, Default)]
pub struct NightOneInfo {
    pub demon_id: Option<PlayerId>,
    pub minion_ids: Vec<PlayerId>,
    /// Townsfolk role names not in play, offered to the demon as bluffs.
    pub demon_bluffs: Vec<String>,
}

#[derive(Debug)]
pub struct Game {
    pub(crate) players: Vec<Player>,
    pub(crate) phase: Phase,
    pub(crate) night: u32,
    pub(crate) pending_dawn: Vec<PlayerId>,
    pub(crate) log: Vec<String>,
    pub(crate) script: Script,
    pub(crate) current_nomination: Option<Nomination>,
    pub(crate) best_nomination: Option<Nomination>,
    /// Set when a later nomination ties the best tally; tied leaders are
    /// nobody's execution.
    pub(crate) best_tied: bool,
    pub(crate) executed_today: Option<PlayerId>,
    pub(crate) night_protected: HashSet<PlayerId>,
    pub(crate) last_executed: Option<PlayerId>,
    pub(crate) force_winner: Option<Team>,
    pub(crate) night_one: NightOneInfo,
    pub(crate) wake_list: Vec<WakeEntry>,
    pub(crate) events: Vec<GameEvent>,
    registry: Arc<RoleRegistry>,
    rng: StdRng,
}

impl Game {
    /// Players are reordered by seat number; neighbour lookups assume the
    /// list is circular in seating order.
    pub fn new(
        mut players: Vec<Player>,
        script: Script,
        registry: Arc<RoleRegistry>,
        rng: StdRng,
    ) -> Self {
        players.sort_by_key(|p| p.seat.unwrap_or(usize::MAX));
        Self {
            players,
            phase: Phase::Create,
            night: 0,
            pending_dawn: Vec::new(),
            log: Vec::new(),
            script,
            current_nomination: None,
            best_nomination: None,
            best_tied: false,
            executed_today: None,
            night_protected: HashSet::new(),
            last_executed: None,
            force_winner: None,
            night_one: NightOneInfo::default(),
            wake_list: Vec::new(),
            events: Vec::new(),
            registry,
            rng,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn night(&self) -> u32 {
        self.night
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn wake_list(&self) -> &[WakeEntry] {
        &self.wake_list
    }

    pub fn night_one(&self) -> &NightOneInfo {
        &self.night_one
    }

    pub fn force_winner(&self) -> Option<Team> {
        self.force_winner
    }

    pub fn set_force_winner(&mut self, team: Team) {
        self.force_winner = Some(team);
    }

    pub fn last_executed(&self) -> Option<PlayerId> {
        self.last_executed
    }

    pub fn current_nomination(&self) -> Option<&Nomination> {
        self.current_nomination.as_ref()
    }

    pub fn best_nomination(&self) -> Option<&Nomination> {
        self.best_nomination.as_ref()
    }

    pub fn player(&self, pid: PlayerId) -> Result<&Player, GameError> {
        self.players
            .iter()
            .find(|p| p.id == pid)
            .ok_or_else(|| GameError::not_found("player", pid.to_string()))
    }

    pub fn player_mut(&mut self, pid: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .iter_mut()
            .find(|p| p.id == pid)
            .ok_or_else(|| GameError::not_found("player", pid.to_string()))
    }

    /// Display name, tolerant of unknown ids for log formatting.
    pub fn player_name(&self, pid: PlayerId) -> String {
        self.player(pid)
            .map(|p| p.name.clone())
            .unwrap_or_else(|_| "someone".to_string())
    }

    pub fn alive_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.alive).collect()
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn alive_other_ids(&self, pid: PlayerId) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.alive && p.id != pid)
            .map(|p| p.id)
            .collect()
    }

    /// Seat neighbours with wraparound, dead or alive.
    pub fn seat_neighbours(&self, pid: PlayerId) -> Option<(&Player, &Player)> {
        let len = self.players.len();
        if len < 2 {
            return None;
        }
        let idx = self.players.iter().position(|p| p.id == pid)?;
        let left = &self.players[(idx + len - 1) % len];
        let right = &self.players[(idx + 1) % len];
        Some((left, right))
    }

    pub fn assign_role(&mut self, pid: PlayerId, mut role: Box<dyn Role>) -> Result<(), GameError> {
        role.set_owner(pid);
        self.player_mut(pid)?.role = Some(role);
        Ok(())
    }

    /// Random living player other than `pid`, for deterministic-by-seed
    /// demon targeting.
    pub fn choose_random_alive_other(&mut self, pid: PlayerId) -> Option<PlayerId> {
        let candidates = self.alive_other_ids(pid);
        candidates.choose(&mut self.rng).copied()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ask a human to make a setup decision for a role. The answer comes
    /// back later through the room's task machinery and `apply_setup`.
    pub fn request_setup_task(
        &mut self,
        kind: &str,
        role: &'static str,
        owner_id: PlayerId,
        prompt: impl Into<String>,
        options: Vec<PlayerId>,
        payload: Value,
    ) {
        self.events.push(GameEvent::SetupTaskRequested {
            kind: kind.to_string(),
            role: role.to_string(),
            owner_id,
            prompt: prompt.into(),
            options,
            payload,
        });
    }

    // ------------------------------------------------------------------
    // Phase machine
    // ------------------------------------------------------------------

    /// Leave the current phase, enter the next, and return it.
    ///
    /// The only fallible step is deck building on entry to SETUP; on that
    /// failure the transition is rolled back with no role assigned.
    pub async fn advance(&mut self, prompt: &dyn Prompt) -> Result<Phase, GameError> {
        let current = self.phase;
        self.exit_phase(current, prompt).await;
        let next = current.successor();
        self.phase = next;
        if let Err(e) = self.enter_phase(next) {
            self.phase = current;
            return Err(e);
        }
        Ok(next)
    }

    async fn exit_phase(&mut self, phase: Phase, prompt: &dyn Prompt) {
        match phase {
            Phase::Night => {
                // Dawn deaths resolve in queued order while the phase is
                // still NIGHT, so death hooks see a night death.
                let queued = std::mem::take(&mut self.pending_dawn);
                for pid in queued {
                    self.mark_dead(pid, "at dawn", prompt).await;
                }
            }
            Phase::Execution => self.finish_day(prompt).await,
            _ => {}
        }
    }

    fn enter_phase(&mut self, phase: Phase) -> Result<(), GameError> {
        match phase {
            Phase::Setup => self.enter_setup()?,
            Phase::Night => {
                self.night = if self.night == 0 { 1 } else { self.night + 1 };
                self.night_protected.clear();
                if self.night == 1 {
                    self.compute_night_one_info();
                }
                self.build_wake_list();
                self.events.push(GameEvent::NightPrepared {
                    night: self.night,
                    wake_list: self.wake_list.clone(),
                });
                // Night hooks are not run here: they may suspend on human
                // prompts, so the caller schedules `run_night` as its own
                // step once the transition has been observed.
            }
            Phase::Day => self.start_day(),
            _ => {}
        }
        Ok(())
    }

    fn enter_setup(&mut self) -> Result<(), GameError> {
        let mut deck = self.build_role_deck()?;
        // The deck is complete; assignment can no longer fail.
        for player in &mut self.players {
            if let Some(mut role) = deck.pop() {
                role.set_owner(player.id);
                player.role = Some(role);
            }
        }
        let ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        for pid in ids {
            if let Some(mut role) = self.take_role(pid) {
                role.on_setup(self);
                self.restore_role(pid, role);
            }
        }
        Ok(())
    }

    /// One sample per role group, concatenated, then globally shuffled.
    fn build_role_deck(&mut self) -> Result<Vec<Box<dyn Role>>, GameError> {
        let player_count = self.players.len();
        let counts = *self.script.counts_for(player_count).ok_or_else(|| {
            GameError::configuration(format!("Unsupported player count: {player_count}"))
        })?;

        let mut selections: Vec<&'static str> = Vec::with_capacity(player_count);
        for group in [
            RoleType::Townsfolk,
            RoleType::Outsider,
            RoleType::Minion,
            RoleType::Demon,
        ] {
            let need = counts.for_group(group);
            let pool = self.script.group(group);
            if need > pool.len() {
                return Err(GameError::configuration(format!(
                    "Not enough roles in group {group}: need {need}, have {}",
                    pool.len()
                )));
            }
            let picked: Vec<&'static str> = pool
                .choose_multiple(&mut self.rng, need)
                .copied()
                .collect();
            selections.extend(picked);
        }

        if selections.len() != player_count {
            return Err(GameError::configuration(
                "Role deck size does not match player count",
            ));
        }

        let mut deck = Vec::with_capacity(selections.len());
        for id in selections {
            deck.push(self.registry.build(id)?);
        }
        deck.shuffle(&mut self.rng);
        Ok(deck)
    }

    fn start_day(&mut self) {
        self.current_nomination = None;
        self.best_nomination = None;
        self.best_tied = false;
        self.executed_today = None;
        let ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        for pid in ids {
            if let Some(mut role) = self.take_role(pid) {
                role.on_day_start(self);
                self.restore_role(pid, role);
            }
        }
    }

    fn compute_night_one_info(&mut self) {
        let mut demon_id = None;
        let mut minion_ids = Vec::new();
        let mut in_play: HashSet<&'static str> = HashSet::new();
        for p in &self.players {
            if let Some(role) = &p.role {
                in_play.insert(role.id());
                match role.role_type() {
                    RoleType::Demon => demon_id = Some(p.id),
                    RoleType::Minion => minion_ids.push(p.id),
                    _ => {}
                }
            }
        }

        let mut bluffs: Vec<&'static str> = self
            .script
            .group(RoleType::Townsfolk)
            .iter()
            .filter(|id| !in_play.contains(*id))
            .copied()
            .collect();
        bluffs.shuffle(&mut self.rng);
        bluffs.truncate(3);

        self.night_one = NightOneInfo {
            demon_id,
            minion_ids,
            demon_bluffs: bluffs.iter().map(|s| s.to_string()).collect(),
        };
    }

    fn build_wake_list(&mut self) {
        let mut alive_by_role: HashMap<&'static str, PlayerId> = HashMap::new();
        for p in &self.players {
            if !p.alive {
                continue;
            }
            if let Some(role) = &p.role {
                alive_by_role.insert(role.id(), p.id);
            }
        }

        let order = self.script.night_order(self.night).to_vec();
        let mut list = Vec::new();
        for role_id in order {
            if let Some(&pid) = alive_by_role.get(role_id) {
                list.push(WakeEntry {
                    role: role_id.to_string(),
                    owner: pid,
                    name: self.player_name(pid),
                });
            }
        }
        self.wake_list = list;
    }

    /// Run each present, living role's night hook in script order. Called
    /// by the room after the transition into NIGHT; hooks may suspend on
    /// prompts, so this is a separate step from [`Game::advance`].
    pub async fn run_night(&mut self, prompt: &dyn Prompt) {
        let entries = self.wake_list.clone();
        for entry in entries {
            let pid = entry.owner;
            let alive = self.player(pid).map(|p| p.alive).unwrap_or(false);
            if !alive {
                continue;
            }
            let Some(mut role) = self.take_role(pid) else {
                continue;
            };
            // Promotion can swap a role mid-night; the wake entry is stale then.
            if role.id() != entry.role {
                self.restore_role(pid, role);
                continue;
            }
            role.on_night(self, prompt).await;
            self.restore_role(pid, role);
        }
    }

    // ------------------------------------------------------------------
    // Hook plumbing
    // ------------------------------------------------------------------

    fn take_role(&mut self, pid: PlayerId) -> Option<Box<dyn Role>> {
        self.players
            .iter_mut()
            .find(|p| p.id == pid)
            .and_then(|p| p.role.take())
    }

    fn restore_role(&mut self, pid: PlayerId, role: Box<dyn Role>) {
        if let Some(p) = self.players.iter_mut().find(|p| p.id == pid) {
            p.role = Some(role);
        }
    }

    // ------------------------------------------------------------------
    // Death and execution
    // ------------------------------------------------------------------

    pub fn kill_at_dawn(&mut self, pid: PlayerId) {
        if !self.pending_dawn.contains(&pid) {
            self.pending_dawn.push(pid);
        }
    }

    pub fn pending_dawn(&self) -> &[PlayerId] {
        &self.pending_dawn
    }

    pub fn protect(&mut self, pid: PlayerId) {
        self.night_protected.insert(pid);
    }

    pub fn is_protected(&self, pid: PlayerId) -> bool {
        self.night_protected.contains(&pid)
    }

    /// Mark a player dead, grant the ghost vote, run the death hook and
    /// resolve demon-succession. Idempotent: a second call is a no-op.
    pub async fn mark_dead(&mut self, pid: PlayerId, cause: &str, prompt: &dyn Prompt) {
        let Ok(player) = self.player_mut(pid) else {
            return;
        };
        if !player.alive {
            return;
        }
        player.alive = false;
        player.ghost_vote_available = true;
        let name = player.name.clone();
        self.log.push(format!("{name} dies {cause}"));

        if let Some(mut role) = self.take_role(pid) {
            role.on_death(self, prompt).await;
            self.restore_role(pid, role);
        }

        self.maybe_promote_scarlet_woman(pid);
    }

    /// Dusk execution. Consults the target's role for an execution-
    /// preventing effect first, then delegates to death resolution.
    pub async fn execute(&mut self, pid: PlayerId, prompt: &dyn Prompt) {
        let Ok(player) = self.player(pid) else {
            return;
        };
        let name = player.name.clone();
        if player.role_id() == Some("Mayor") {
            self.log.push("Mayor prevents an execution".to_string());
            return;
        }

        if let Some(mut role) = self.take_role(pid) {
            role.on_execution(self, pid);
            self.restore_role(pid, role);
        }

        self.mark_dead(pid, "at dusk", prompt).await;
        self.last_executed = Some(pid);
        self.executed_today = Some(pid);
        self.log.push(format!("{name} is executed at dusk"));
    }

    /// Resolve the day's best-on-block when EXECUTION ends, unless an
    /// immediate effect already executed someone today.
    async fn finish_day(&mut self, prompt: &dyn Prompt) {
        if self.executed_today.is_some() {
            return;
        }
        let Some(best) = self.best_nomination.clone() else {
            self.log.push("No execution today".to_string());
            return;
        };
        if self.best_tied {
            self.log.push("No execution (tied votes)".to_string());
            return;
        }
        if best.votes_for < self.majority_required() {
            self.log.push("No execution (no majority)".to_string());
            return;
        }
        self.execute(best.target, prompt).await;
    }

    fn maybe_promote_scarlet_woman(&mut self, dead_pid: PlayerId) {
        let dead_was_demon = self
            .player(dead_pid)
            .ok()
            .and_then(|p| p.role.as_ref())
            .map(|r| r.role_type() == RoleType::Demon)
            .unwrap_or(false);
        if !dead_was_demon {
            return;
        }
        // Succession needs 5+ players alive after the death.
        if self.alive_count() < 5 {
            return;
        }
        let Some(sw_id) = self
            .players
            .iter()
            .find(|p| p.alive && p.role_id() == Some("Scarlet Woman"))
            .map(|p| p.id)
        else {
            return;
        };
        let mut imp: Box<dyn Role> = Box::new(crate::roles::imp::Imp::new());
        imp.set_owner(sw_id);
        let name = self.player_name(sw_id);
        if let Ok(p) = self.player_mut(sw_id) {
            p.role = Some(imp);
        }
        self.log.push(format!("{name} becomes the Imp (Scarlet Woman)"));
    }

    /// Demon night attack: Soldier immunity, Monk protection, otherwise
    /// the target is queued to die at dawn.
    pub fn demon_attack(&mut self, target: PlayerId) {
        let Ok(t) = self.player(target) else {
            return;
        };
        if !t.alive {
            return;
        }
        let name = t.name.clone();
        if t.role_id() == Some("Soldier") {
            self.log.push(format!("{name} (Soldier) resists the demon"));
            return;
        }
        if self.night_protected.contains(&target) {
            self.log.push(format!("{name} is protected from the demon"));
            return;
        }
        self.kill_at_dawn(target);
    }

    /// The Slayer's once-per-game public shot. Returns `Ok(false)` when the
    /// ability was already spent.
    pub async fn slayer_shot(
        &mut self,
        slayer: PlayerId,
        target: PlayerId,
        prompt: &dyn Prompt,
    ) -> Result<bool, GameError> {
        if self.phase != Phase::Day {
            return Err(GameError::invalid_operation("slaying is a day action"));
        }
        let shooter = self.player(slayer)?;
        if !shooter.alive {
            return Err(GameError::invalid_operation("dead players cannot slay"));
        }
        if shooter.role_id() != Some("Slayer") {
            return Err(GameError::invalid_operation("only the Slayer may slay"));
        }
        self.player(target)?;

        let fired = self
            .player_mut(slayer)?
            .role
            .as_mut()
            .map(|r| r.consume_day_ability())
            .unwrap_or(false);
        if !fired {
            return Ok(false);
        }

        let target_is_demon = self
            .player(target)?
            .role
            .as_ref()
            .map(|r| r.role_type() == RoleType::Demon)
            .unwrap_or(false);
        if target_is_demon {
            self.mark_dead(target, "to the Slayer's bolt", prompt).await;
        } else {
            self.log.push("Slayer misses".to_string());
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Poison
    // ------------------------------------------------------------------

    /// True if any living Poisoner currently targets this player.
    pub fn is_poisoned(&self, pid: PlayerId) -> bool {
        self.players.iter().any(|p| {
            p.alive
                && p.role
                    .as_ref()
                    .map(|r| r.id() == "Poisoner" && r.poisoned_target() == Some(pid))
                    .unwrap_or(false)
        })
    }

    /// Poisoned, or inherently unreliable (the Drunk).
    pub fn is_poisoned_like(&self, pid: PlayerId) -> bool {
        if self.is_poisoned(pid) {
            return true;
        }
        self.player(pid)
            .ok()
            .and_then(|p| p.role_id())
            .map(|id| id == "Drunk")
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AutoPrompt;
    use crate::testkit;

    mod deck_building {
        use super::*;
        use rand::SeedableRng;

        fn fresh_game(count: usize, seed: u64) -> Game {
            let players = (0..count)
                .map(|i| Player::new(PlayerId::new(), format!("P{}", i + 1), Some(i + 1)))
                .collect();
            Game::new(
                players,
                crate::script::trouble_brewing(),
                Arc::new(RoleRegistry::standard()),
                StdRng::seed_from_u64(seed),
            )
        }

        #[tokio::test]
        async fn deck_matches_headcount_table() {
            for count in [5, 7, 10, 15] {
                let mut game = fresh_game(count, 11);
                game.advance(&AutoPrompt).await.expect("setup");
                assert_eq!(game.phase(), Phase::Setup);

                let counts = *game.script().counts_for(count).expect("counts");
                let mut per_group = HashMap::new();
                let mut seen = HashSet::new();
                for p in game.players() {
                    let role = p.role.as_ref().expect("role assigned");
                    assert!(seen.insert(role.id()), "duplicate role {}", role.id());
                    *per_group.entry(role.role_type()).or_insert(0usize) += 1;
                    assert_eq!(role.owner(), Some(p.id));
                }
                assert_eq!(
                    per_group.get(&RoleType::Townsfolk).copied().unwrap_or(0),
                    counts.townsfolk
                );
                assert_eq!(
                    per_group.get(&RoleType::Outsider).copied().unwrap_or(0),
                    counts.outsiders
                );
                assert_eq!(
                    per_group.get(&RoleType::Minion).copied().unwrap_or(0),
                    counts.minions
                );
                assert_eq!(
                    per_group.get(&RoleType::Demon).copied().unwrap_or(0),
                    counts.demons
                );
            }
        }

        #[tokio::test]
        async fn unsupported_headcount_aborts_before_assignment() {
            let mut game = fresh_game(4, 3);
            let err = game.advance(&AutoPrompt).await.expect_err("must fail");
            assert!(matches!(err, GameError::Configuration(_)));
            // Rolled back: no phase change, no roles dealt.
            assert_eq!(game.phase(), Phase::Create);
            assert!(game.players().iter().all(|p| p.role.is_none()));
        }
    }

    mod deaths {
        use super::*;

        #[tokio::test]
        async fn mark_dead_is_idempotent() {
            let (mut game, ids) = testkit::game_with_roles(&[
                "Imp", "Empath", "Chef", "Soldier", "Recluse",
            ]);
            game.mark_dead(ids[1], "at dawn", &AutoPrompt).await;
            game.mark_dead(ids[1], "at dawn", &AutoPrompt).await;

            let death_lines = game
                .log()
                .iter()
                .filter(|l| l.contains("dies at dawn"))
                .count();
            assert_eq!(death_lines, 1);
            let p = game.player(ids[1]).expect("player");
            assert!(!p.alive);
            assert!(p.ghost_vote_available);
        }

        #[tokio::test]
        async fn dawn_queue_resolves_in_order_and_clears() {
            let (mut game, ids) = testkit::game_with_roles(&[
                "Imp", "Empath", "Chef", "Soldier", "Recluse", "Monk",
            ]);
            game.phase = Phase::Night;
            game.night = 1;
            game.kill_at_dawn(ids[1]);
            game.kill_at_dawn(ids[2]);
            game.kill_at_dawn(ids[1]); // duplicate ignored

            let phase = game.advance(&AutoPrompt).await.expect("advance");
            assert_eq!(phase, Phase::Day);
            assert!(game.pending_dawn().is_empty());
            assert!(!game.player(ids[1]).expect("p").alive);
            assert!(!game.player(ids[2]).expect("p").alive);

            // The following night starts with a clean protection set.
            game.protect(ids[3]);
            game.phase = Phase::FinalCheck;
            game.advance(&AutoPrompt).await.expect("advance");
            assert_eq!(game.phase(), Phase::Night);
            assert!(!game.is_protected(ids[3]));
        }

        #[tokio::test]
        async fn scarlet_woman_inherits_the_demon() {
            let (mut game, ids) = testkit::game_with_roles(&[
                "Imp",
                "Scarlet Woman",
                "Empath",
                "Chef",
                "Soldier",
                "Recluse",
            ]);
            // Six alive; killing the Imp leaves five, enough for succession.
            game.mark_dead(ids[0], "to the Slayer's bolt", &AutoPrompt).await;

            let sw = game.player(ids[1]).expect("player");
            assert_eq!(sw.role_id(), Some("Imp"));
            assert!(game.log().iter().any(|l| l.contains("becomes the Imp")));
        }

        #[tokio::test]
        async fn scarlet_woman_stays_minion_below_five_alive() {
            let (mut game, ids) = testkit::game_with_roles(&[
                "Imp", "Scarlet Woman", "Empath", "Chef", "Soldier",
            ]);
            game.mark_dead(ids[0], "at dusk", &AutoPrompt).await;
            // Four alive after the death; no promotion.
            assert_eq!(game.player(ids[1]).expect("p").role_id(), Some("Scarlet Woman"));
        }

        #[tokio::test]
        async fn demon_attack_respects_soldier_and_protection() {
            let (mut game, ids) = testkit::game_with_roles(&[
                "Imp", "Soldier", "Empath", "Chef", "Recluse",
            ]);
            game.demon_attack(ids[1]);
            assert!(game.pending_dawn().is_empty());
            assert!(game.log().iter().any(|l| l.contains("resists the demon")));

            game.protect(ids[2]);
            game.demon_attack(ids[2]);
            assert!(game.pending_dawn().is_empty());
            assert!(game
                .log()
                .iter()
                .any(|l| l.contains("is protected from the demon")));

            game.demon_attack(ids[4]);
            assert_eq!(game.pending_dawn(), &[ids[4]]);
        }
    }

    mod slayer {
        use super::*;

        #[tokio::test]
        async fn slayer_kills_the_demon_once() {
            let (mut game, ids) = testkit::game_with_roles(&[
                "Imp", "Slayer", "Empath", "Chef", "Recluse",
            ]);
            game.phase = Phase::Day;

            let fired = game
                .slayer_shot(ids[1], ids[0], &AutoPrompt)
                .await
                .expect("shot");
            assert!(fired);
            assert!(!game.player(ids[0]).expect("imp").alive);

            let again = game
                .slayer_shot(ids[1], ids[2], &AutoPrompt)
                .await
                .expect("second shot");
            assert!(!again, "ability is one-shot");
        }

        #[tokio::test]
        async fn slayer_misses_non_demons_and_night_shots_are_rejected() {
            let (mut game, ids) = testkit::game_with_roles(&[
                "Imp", "Slayer", "Empath", "Chef", "Recluse",
            ]);
            game.phase = Phase::Night;
            let err = game
                .slayer_shot(ids[1], ids[2], &AutoPrompt)
                .await
                .expect_err("night shot");
            assert!(matches!(err, GameError::InvalidOperation(_)));

            game.phase = Phase::Day;
            game.slayer_shot(ids[1], ids[2], &AutoPrompt)
                .await
                .expect("day shot");
            assert!(game.player(ids[2]).expect("target").alive);
            assert!(game.log().iter().any(|l| l.contains("Slayer misses")));
        }
    }

    mod poison {
        use super::*;

        #[tokio::test]
        async fn drunk_is_always_poisoned_like() {
            let (game, ids) = testkit::game_with_roles(&[
                "Imp", "Drunk", "Empath", "Chef", "Recluse",
            ]);
            assert!(!game.is_poisoned(ids[1]));
            assert!(game.is_poisoned_like(ids[1]));
            assert!(!game.is_poisoned_like(ids[2]));
        }
    }
}
