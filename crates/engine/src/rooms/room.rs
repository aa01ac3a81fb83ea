//! The room orchestrator: membership, game lifecycle, setup tasks and
//! broadcast.
//!
//! All state-mutating operations serialize on one lock per room. The
//! prompt bus, the peer set and the cached snapshot have their own
//! interior locks, so answering a prompt and serving a read-only connect
//! proceed while an engine operation is suspended on a human.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use grimoire_domain::{
    Game, GameError, GameEvent, Phase, Player, PlayerId, PromptId, RoleRegistry, Rules, Script,
    TaskId,
};
use grimoire_shared::requests::Identity;
use grimoire_shared::views::{RoomInfo, RoomStatus, TaskView};
use grimoire_shared::{Envelope, PromptAnswer, ServerMessage};

use crate::connections::RoomPeers;
use crate::prompt_bus::PromptBus;
use crate::views::{build_snapshot, Snapshot};
use crate::ws_prompt::WsPrompt;

const MIN_RESIDENTS: usize = 5;
const MAX_RESIDENTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Done,
}

/// A durable, human-answerable request raised by a role during setup.
#[derive(Debug, Clone)]
pub struct SetupTask {
    pub id: TaskId,
    pub kind: String,
    pub role: String,
    pub owner_id: PlayerId,
    pub prompt: String,
    pub options: Vec<PlayerId>,
    pub payload: Value,
    pub status: TaskStatus,
}

impl SetupTask {
    pub fn view(&self) -> TaskView {
        TaskView {
            id: self.id,
            kind: self.kind.clone(),
            role: self.role.clone(),
            owner_id: self.owner_id,
            prompt: self.prompt.clone(),
            options: self.options.clone(),
            status: match self.status {
                TaskStatus::Pending => "PENDING".to_string(),
                TaskStatus::Done => "DONE".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Seat {
    pub no: usize,
    pub occupant: Option<Occupant>,
}

#[derive(Debug, Clone)]
pub struct Occupant {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Spectator {
    pub id: PlayerId,
    pub name: String,
}

/// Everything behind the per-room lock.
#[derive(Debug)]
pub struct RoomState {
    pub info: RoomInfo,
    pub seats: Vec<Seat>,
    pub spectators: Vec<Spectator>,
    pub game: Option<Game>,
    pub setup_tasks: Vec<SetupTask>,
    pub next_task_id: u64,
}

impl RoomState {
    fn occupied(&self) -> usize {
        self.seats.iter().filter(|s| s.occupant.is_some()).count()
    }

    fn is_storyteller(&self, id: PlayerId) -> bool {
        self.info.storyteller_id == id
    }

    fn is_spectator(&self, id: PlayerId) -> bool {
        self.spectators.iter().any(|s| s.id == id)
    }

    fn is_seated(&self, id: PlayerId) -> bool {
        self.seats
            .iter()
            .any(|s| s.occupant.as_ref().map(|o| o.id) == Some(id))
    }
}

#[derive(Debug)]
pub struct GameRoom {
    script: Script,
    roles: Arc<RoleRegistry>,
    state: Mutex<RoomState>,
    snapshot: RwLock<Arc<Snapshot>>,
    pub bus: Arc<PromptBus>,
    pub peers: Arc<RoomPeers>,
    prompt: WsPrompt,
}

impl GameRoom {
    pub fn new(
        info: RoomInfo,
        script: Script,
        roles: Arc<RoleRegistry>,
        seat_count: usize,
    ) -> Self {
        let seat_count = seat_count.clamp(MIN_RESIDENTS, MAX_RESIDENTS);
        let state = RoomState {
            info: info.clone(),
            seats: (1..=seat_count)
                .map(|no| Seat { no, occupant: None })
                .collect(),
            spectators: Vec::new(),
            game: None,
            setup_tasks: Vec::new(),
            next_task_id: 1,
        };
        let snapshot = Arc::new(build_snapshot(&state));
        let bus = Arc::new(PromptBus::new());
        let peers = Arc::new(RoomPeers::new());
        let prompt = WsPrompt::new(info.gid, bus.clone(), peers.clone());
        Self {
            script,
            roles,
            state: Mutex::new(state),
            snapshot: RwLock::new(snapshot),
            bus,
            peers,
            prompt,
        }
    }

    /// The latest cached per-audience snapshot. Never blocks on the room
    /// lock, so it is safe for read-only peers while an operation is
    /// suspended on a prompt.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn info(&self) -> RoomInfo {
        self.state.lock().await.info.clone()
    }

    pub async fn is_seated(&self, id: PlayerId) -> bool {
        self.state.lock().await.is_seated(id)
    }

    async fn rebuild_and_broadcast(&self) {
        let fresh = {
            let state = self.state.lock().await;
            Arc::new(build_snapshot(&state))
        };
        *self.snapshot.write().await = fresh.clone();
        self.peers.broadcast(&fresh).await;
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    pub async fn join_spectator(&self, who: Identity) -> Result<(), GameError> {
        {
            let mut state = self.state.lock().await;
            if !state.is_storyteller(who.id) && !state.is_spectator(who.id) && !state.is_seated(who.id)
            {
                state.spectators.push(Spectator {
                    id: who.id,
                    name: who.name,
                });
            }
        }
        self.rebuild_and_broadcast().await;
        Ok(())
    }

    pub async fn sit(&self, spectator_id: PlayerId, seat_no: usize) -> Result<(), GameError> {
        {
            let mut state = self.state.lock().await;
            if state.info.status != RoomStatus::Open {
                return Err(GameError::invalid_operation("seats are locked in play"));
            }
            if seat_no < 1 || seat_no > state.seats.len() {
                return Err(GameError::invalid_operation("invalid seat"));
            }
            let Some(idx) = state.spectators.iter().position(|s| s.id == spectator_id) else {
                return Err(GameError::not_found("spectator", spectator_id.to_string()));
            };
            if state.seats[seat_no - 1].occupant.is_some() {
                return Err(GameError::invalid_operation("seat occupied"));
            }
            let spectator = state.spectators.remove(idx);
            state.seats[seat_no - 1].occupant = Some(Occupant {
                id: spectator.id,
                name: spectator.name,
            });
        }
        self.rebuild_and_broadcast().await;
        Ok(())
    }

    pub async fn vacate(&self, player_id: PlayerId, seat_no: usize) -> Result<(), GameError> {
        let (gid, name) = {
            let mut state = self.state.lock().await;
            if state.info.status != RoomStatus::Open {
                return Err(GameError::invalid_operation("seats are locked in play"));
            }
            if seat_no < 1 || seat_no > state.seats.len() {
                return Err(GameError::invalid_operation("invalid seat"));
            }
            let seat = &mut state.seats[seat_no - 1];
            match seat.occupant.as_ref().map(|o| o.id) {
                None => return Err(GameError::invalid_operation("seat empty")),
                Some(id) if id != player_id => {
                    return Err(GameError::invalid_operation(
                        "seat not occupied by that player",
                    ));
                }
                Some(_) => {}
            }
            let Some(occ) = seat.occupant.take() else {
                return Err(GameError::invalid_operation("seat empty"));
            };
            let name = occ.name.clone();
            state.spectators.push(Spectator {
                id: occ.id,
                name: occ.name,
            });
            (state.info.gid, name)
        };
        self.peers
            .send_to_storyteller(Envelope::new(
                gid,
                ServerMessage::PlayerVacatedSeat {
                    player_id,
                    player_name: name,
                    seat: seat_no,
                },
            ))
            .await;
        self.rebuild_and_broadcast().await;
        Ok(())
    }

    pub async fn leave(&self, id: PlayerId) -> Result<(), GameError> {
        {
            let mut state = self.state.lock().await;
            if let Some(idx) = state.spectators.iter().position(|s| s.id == id) {
                state.spectators.remove(idx);
            } else if state.is_seated(id) {
                if state.info.status != RoomStatus::Open {
                    return Err(GameError::invalid_operation(
                        "seated players cannot leave in play",
                    ));
                }
                for seat in &mut state.seats {
                    if seat.occupant.as_ref().map(|o| o.id) == Some(id) {
                        seat.occupant = None;
                    }
                }
            } else {
                return Err(GameError::not_found("player", id.to_string()));
            }
        }
        self.rebuild_and_broadcast().await;
        Ok(())
    }

    pub async fn resize_seats(&self, new_count: usize) -> Result<(), GameError> {
        {
            let mut state = self.state.lock().await;
            if state.info.status != RoomStatus::Open {
                return Err(GameError::invalid_operation("seats are locked in play"));
            }
            if new_count < MIN_RESIDENTS {
                return Err(GameError::invalid_operation("min seats is 5"));
            }
            if new_count > MAX_RESIDENTS {
                return Err(GameError::invalid_operation("max seats is 20"));
            }
            if new_count < state.occupied() {
                return Err(GameError::invalid_operation(
                    "cannot reduce below occupied seats",
                ));
            }
            while state.seats.len() < new_count {
                let no = state.seats.len() + 1;
                state.seats.push(Seat { no, occupant: None });
            }
            while state.seats.len() > new_count {
                // Drop the highest-numbered empty seat.
                let Some(idx) = state
                    .seats
                    .iter()
                    .rposition(|s| s.occupant.is_none())
                else {
                    break;
                };
                state.seats.remove(idx);
                for (i, seat) in state.seats.iter_mut().enumerate() {
                    seat.no = i + 1;
                }
            }
        }
        self.rebuild_and_broadcast().await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Game lifecycle
    // ------------------------------------------------------------------

    /// Deal the deck and run every role's setup. Fails with no state
    /// change when the table is too small or the script cannot cover the
    /// headcount.
    pub async fn start_game(&self) -> Result<(), GameError> {
        {
            let mut state = self.state.lock().await;
            if state.info.status != RoomStatus::Open {
                return Err(GameError::invalid_operation("game already started"));
            }
            let occupied = state.occupied();
            if occupied < MIN_RESIDENTS {
                return Err(GameError::invalid_operation("not enough seated players"));
            }
            // Checked before the seats are touched: a failed start leaves
            // the room exactly as it was.
            if self.script.counts_for(occupied).is_none() {
                return Err(GameError::configuration(format!(
                    "Unsupported player count: {occupied}"
                )));
            }

            // Collapse to occupied seats; the table is fixed from here on.
            state.seats.retain(|s| s.occupant.is_some());
            for (i, seat) in state.seats.iter_mut().enumerate() {
                seat.no = i + 1;
            }

            let players: Vec<Player> = state
                .seats
                .iter()
                .filter_map(|seat| {
                    seat.occupant
                        .as_ref()
                        .map(|occ| Player::new(occ.id, occ.name.clone(), Some(seat.no)))
                })
                .collect();

            let mut game = Game::new(
                players,
                self.script.clone(),
                self.roles.clone(),
                StdRng::from_entropy(),
            );
            // CREATE -> SETUP deals roles and runs on_setup; a failed deck
            // build leaves the room untouched.
            game.advance(&self.prompt).await?;
            state.info.status = RoomStatus::InPlay;
            self.collect_events(&mut state, game.drain_events()).await?;
            state.game = Some(game);
            tracing::info!(gid = %state.info.gid, players = state.seats.len(), "game started");
        }
        self.rebuild_and_broadcast().await;
        Ok(())
    }

    /// Advance the phase machine one step. Entering NIGHT schedules the
    /// night-hook run as its own task so this call never waits on a human.
    pub async fn advance_phase(self: &Arc<Self>) -> Result<(Phase, u32), GameError> {
        let (phase, night) = {
            let mut state = self.state.lock().await;
            let game = state
                .game
                .as_mut()
                .ok_or_else(|| GameError::invalid_operation("game not started"))?;
            let phase = game.advance(&self.prompt).await?;
            let night = game.night();
            let events = game.drain_events();
            if phase == Phase::FinalCheck {
                let rules = Rules;
                if rules.check_end(game) {
                    state.info.status = RoomStatus::Finished;
                }
            }
            self.collect_events(&mut state, events).await?;
            (phase, night)
        };
        self.rebuild_and_broadcast().await;

        if phase == Phase::Night {
            let room = Arc::clone(self);
            tokio::spawn(async move {
                room.run_night().await;
            });
        }
        Ok((phase, night))
    }

    /// The scheduled night step: runs the wake list in script order,
    /// suspending on prompts as roles require.
    async fn run_night(self: Arc<Self>) {
        {
            let mut state = self.state.lock().await;
            let Some(game) = state.game.as_mut() else {
                return;
            };
            // A fast second step can reach DAY before this task runs; the
            // skipped night resolves as all-declined.
            if game.phase() != Phase::Night {
                return;
            }
            game.run_night(&self.prompt).await;
        }
        self.rebuild_and_broadcast().await;
    }

    /// Answer a live prompt. Does not take the room lock: the suspended
    /// operation holding it is exactly what this resumes.
    pub async fn respond(&self, cid: PromptId, answer: Option<PromptAnswer>) {
        self.bus.fulfill(cid, answer);
        let snapshot = self.snapshot().await;
        self.peers.broadcast(&snapshot).await;
    }

    // ------------------------------------------------------------------
    // Nominations and day actions
    // ------------------------------------------------------------------

    pub async fn nominate(&self, nominator: PlayerId, target: PlayerId) -> Result<(), GameError> {
        {
            let mut state = self.state.lock().await;
            let prompt = self.prompt.clone();
            let game = state
                .game
                .as_mut()
                .ok_or_else(|| GameError::invalid_operation("game not started"))?;
            game.start_nomination(nominator, target, &prompt).await?;
        }
        self.rebuild_and_broadcast().await;
        Ok(())
    }

    pub async fn cast_vote(&self, voter: PlayerId, vote_for: bool) -> Result<(), GameError> {
        {
            let mut state = self.state.lock().await;
            let game = state
                .game
                .as_mut()
                .ok_or_else(|| GameError::invalid_operation("game not started"))?;
            game.cast_vote(voter, vote_for)?;
        }
        self.rebuild_and_broadcast().await;
        Ok(())
    }

    pub async fn close_nomination(&self) -> Result<bool, GameError> {
        let passed = {
            let mut state = self.state.lock().await;
            let game = state
                .game
                .as_mut()
                .ok_or_else(|| GameError::invalid_operation("game not started"))?;
            game.close_nomination()?
        };
        self.rebuild_and_broadcast().await;
        Ok(passed)
    }

    pub async fn slay(&self, slayer: PlayerId, target: PlayerId) -> Result<bool, GameError> {
        let fired = {
            let mut state = self.state.lock().await;
            let prompt = self.prompt.clone();
            let game = state
                .game
                .as_mut()
                .ok_or_else(|| GameError::invalid_operation("game not started"))?;
            game.slayer_shot(slayer, target, &prompt).await?
        };
        self.rebuild_and_broadcast().await;
        Ok(fired)
    }

    // ------------------------------------------------------------------
    // Setup tasks
    // ------------------------------------------------------------------

    /// Turn drained game events into storyteller notifications and durable
    /// setup-task records.
    async fn collect_events(
        &self,
        state: &mut RoomState,
        events: Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let gid = state.info.gid;
        for event in events {
            match event {
                GameEvent::NightPrepared { night, wake_list } => {
                    self.peers
                        .send_to_storyteller(Envelope::new(
                            gid,
                            ServerMessage::NightPrepared { night, wake_list },
                        ))
                        .await;
                }
                GameEvent::SetupTaskRequested {
                    kind,
                    role,
                    owner_id,
                    prompt,
                    options,
                    payload,
                } => {
                    let task = SetupTask {
                        id: TaskId::new(state.next_task_id),
                        kind,
                        role,
                        owner_id,
                        prompt,
                        options,
                        payload,
                        status: TaskStatus::Pending,
                    };
                    state.next_task_id += 1;
                    self.peers
                        .send_to_storyteller(Envelope::new(
                            gid,
                            ServerMessage::SetupTasks {
                                tasks: vec![task.view()],
                            },
                        ))
                        .await;
                    state.setup_tasks.push(task);
                }
            }
        }
        Ok(())
    }

    /// Apply a human answer to a pending setup task. Validates status,
    /// option membership and that the owner still holds the recorded role;
    /// a task moves PENDING → DONE exactly once.
    pub async fn perform_setup_task(
        &self,
        task_id: TaskId,
        selection: PlayerId,
    ) -> Result<(), GameError> {
        {
            let mut state = self.state.lock().await;

            let Some(task) = state.setup_tasks.iter().find(|t| t.id == task_id).cloned() else {
                return Err(GameError::not_found("task", task_id.to_string()));
            };
            if task.status != TaskStatus::Pending {
                return Err(GameError::invalid_operation("task already answered"));
            }
            if !task.options.is_empty() && !task.options.contains(&selection) {
                return Err(GameError::invalid_operation("invalid choice"));
            }

            let game = state
                .game
                .as_mut()
                .ok_or_else(|| GameError::invalid_operation("game not started"))?;
            let owner = game.player(task.owner_id)?;
            let actual = owner.role_id().unwrap_or("none");
            if actual != task.role {
                return Err(GameError::role_mismatch(task.role.clone(), actual));
            }

            // Detach the role for the hook call, as the engine does for
            // every other hook.
            let Some(mut role) = game
                .player_mut(task.owner_id)
                .ok()
                .and_then(|p| p.role.take())
            else {
                return Err(GameError::role_mismatch(task.role.clone(), "none"));
            };
            let applied = role.apply_setup(&task.kind, selection, game);
            if let Ok(p) = game.player_mut(task.owner_id) {
                p.role = Some(role);
            }
            applied?;

            let cascaded = game.drain_events();
            if let Some(t) = state.setup_tasks.iter_mut().find(|t| t.id == task_id) {
                t.status = TaskStatus::Done;
            }
            let gid = state.info.gid;
            self.peers
                .send_to_storyteller(Envelope::new(gid, ServerMessage::TaskDone { id: task_id }))
                .await;
            self.collect_events(&mut state, cascaded).await?;

            let none_pending = state
                .setup_tasks
                .iter()
                .all(|t| t.status == TaskStatus::Done);
            let in_setup = state.game.as_ref().map(|g| g.phase()) == Some(Phase::Setup);
            if none_pending && in_setup {
                self.peers
                    .send_to_storyteller(Envelope::new(gid, ServerMessage::SetupComplete))
                    .await;
            }
        }
        self.rebuild_and_broadcast().await;
        Ok(())
    }

    /// Tear the room down: every outstanding prompt resolves exactly once
    /// and all peers are detached. The registry removes the room before
    /// calling this, so no further operation can reach it.
    pub async fn shutdown(&self) {
        self.bus.cancel_all();
        self.peers.disconnect_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn open_room() -> Arc<GameRoom> {
        let storyteller = Identity {
            id: PlayerId::new(),
            name: "Otto".to_string(),
        };
        let info = RoomInfo {
            gid: grimoire_domain::RoomId::from_uuid(Uuid::new_v4()),
            name: "Test Table".to_string(),
            script_name: "Trouble Brewing".to_string(),
            storyteller_id: storyteller.id,
            storyteller_name: storyteller.name,
            status: RoomStatus::Open,
        };
        Arc::new(GameRoom::new(
            info,
            grimoire_domain::script::trouble_brewing(),
            Arc::new(RoleRegistry::standard()),
            8,
        ))
    }

    async fn seat_players(room: &Arc<GameRoom>, count: usize) -> Vec<PlayerId> {
        let mut ids = Vec::new();
        for i in 0..count {
            let who = Identity {
                id: PlayerId::new(),
                name: format!("P{}", i + 1),
            };
            ids.push(who.id);
            room.join_spectator(who).await.expect("join");
            room.sit(ids[i], i + 1).await.expect("sit");
        }
        ids
    }

    #[tokio::test]
    async fn sit_rejects_occupied_seats_and_unknown_spectators() {
        let room = open_room();
        let a = Identity {
            id: PlayerId::new(),
            name: "A".into(),
        };
        let b = Identity {
            id: PlayerId::new(),
            name: "B".into(),
        };
        room.join_spectator(a.clone()).await.expect("join");
        room.join_spectator(b.clone()).await.expect("join");

        room.sit(a.id, 1).await.expect("sit");
        let err = room.sit(b.id, 1).await.expect_err("occupied");
        assert!(matches!(err, GameError::InvalidOperation(_)));

        let err = room.sit(PlayerId::new(), 2).await.expect_err("unknown");
        assert!(matches!(err, GameError::NotFound { .. }));

        // Seat and spectator bookkeeping stay mutually consistent.
        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.room_view().players, 1);
        assert_eq!(snapshot.room_view().spectators.len(), 1);
    }

    #[tokio::test]
    async fn start_game_needs_five_seated_players() {
        let room = open_room();
        seat_players(&room, 4).await;
        let err = room.start_game().await.expect_err("too few");
        assert!(matches!(err, GameError::InvalidOperation(_)));
        assert_eq!(room.info().await.status, RoomStatus::Open);
    }

    #[tokio::test]
    async fn start_game_deals_roles_and_locks_the_room() {
        let room = open_room();
        seat_players(&room, 7).await;
        room.start_game().await.expect("start");

        let info = room.info().await;
        assert_eq!(info.status, RoomStatus::InPlay);

        let err = room.start_game().await.expect_err("double start");
        assert!(matches!(err, GameError::InvalidOperation(_)));

        // Seat changes are rejected once in play.
        let err = room.resize_seats(9).await.expect_err("locked");
        assert!(matches!(err, GameError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn setup_tasks_flow_pending_to_done_exactly_once() {
        // Deal until the deck contains a task-raising role.
        for _ in 0..20 {
            let room = open_room();
            seat_players(&room, 7).await;
            room.start_game().await.expect("start");

            let tasks: Vec<(TaskId, Vec<PlayerId>)> = {
                let state = room.state.lock().await;
                state
                    .setup_tasks
                    .iter()
                    .map(|t| (t.id, t.options.clone()))
                    .collect()
            };
            let Some((task_id, options)) = tasks.first().cloned() else {
                continue;
            };
            let choice = options.first().copied().expect("options");

            room.perform_setup_task(task_id, choice).await.expect("answer");
            let err = room
                .perform_setup_task(task_id, choice)
                .await
                .expect_err("re-submit");
            assert!(matches!(err, GameError::InvalidOperation(_)));
            return;
        }
        panic!("no deal produced a setup task");
    }

    #[tokio::test]
    async fn resize_keeps_occupied_seats() {
        let room = open_room();
        seat_players(&room, 6).await;

        room.resize_seats(10).await.expect("grow");
        assert_eq!(room.snapshot().await.room_view().seats.len(), 10);

        room.resize_seats(6).await.expect("shrink");
        assert_eq!(room.snapshot().await.room_view().seats.len(), 6);

        let err = room.resize_seats(5).await.expect_err("below occupied");
        assert!(matches!(err, GameError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn advance_runs_the_cycle_and_resolves_dawn() {
        let room = open_room();
        seat_players(&room, 7).await;
        room.start_game().await.expect("start");

        let (phase, night) = room.advance_phase().await.expect("to night");
        assert_eq!(phase, Phase::Night);
        assert_eq!(night, 1);

        // The night task may be waiting on prompts; cancel them so the
        // hooks resolve to declined and the run completes.
        tokio::task::yield_now().await;
        room.bus.cancel_all();

        let (phase, _) = room.advance_phase().await.expect("to day");
        assert_eq!(phase, Phase::Day);
    }

    #[tokio::test]
    async fn shutdown_cancels_outstanding_prompts() {
        let room = open_room();
        let rx = room.bus.wait_for(room.bus.new_cid());
        room.shutdown().await;
        assert_eq!(rx.await.ok().flatten(), None);
    }
}
