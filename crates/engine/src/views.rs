//! Builds the per-audience views from authoritative room state.
//!
//! Redaction rules: players see only their own role, and only once the
//! room status has left "open"; the storyteller sees every occupied seat's
//! role; room viewers never see a role. A [`Snapshot`] is built after each
//! mutation and cached, so read-only peers can be served without touching
//! the room lock.

use std::collections::HashMap;

use grimoire_domain::{Game, PlayerId, RoomId};
use grimoire_shared::views::{
    AudienceView, NightOneView, OccupantView, PlayerStateView, PlayerView, RoomStatus, RoomView,
    SeatView, SpectatorView, StorytellerView, YouView,
};
use grimoire_shared::{Envelope, ServerMessage};

use crate::rooms::room::RoomState;

/// All three audience views over one consistent state observation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    gid: RoomId,
    room: RoomView,
    storyteller: StorytellerView,
    players: HashMap<PlayerId, PlayerView>,
}

impl Snapshot {
    pub fn gid(&self) -> RoomId {
        self.gid
    }

    pub fn room_view(&self) -> &RoomView {
        &self.room
    }

    pub fn room_state(&self) -> Envelope {
        Envelope::new(
            self.gid,
            ServerMessage::State {
                view: AudienceView::Room(self.room.clone()),
            },
        )
    }

    pub fn storyteller_state(&self) -> Envelope {
        Envelope::new(
            self.gid,
            ServerMessage::State {
                view: AudienceView::Storyteller(Box::new(self.storyteller.clone())),
            },
        )
    }

    pub fn player_state(&self, pid: PlayerId) -> Option<Envelope> {
        self.players.get(&pid).map(|view| {
            Envelope::new(
                self.gid,
                ServerMessage::State {
                    view: AudienceView::Player(Box::new(view.clone())),
                },
            )
        })
    }
}

pub fn build_snapshot(state: &RoomState) -> Snapshot {
    let gid = state.info.gid;
    let spectators: Vec<SpectatorView> = state
        .spectators
        .iter()
        .map(|s| SpectatorView {
            id: s.id,
            name: s.name.clone(),
        })
        .collect();
    let occupied = state.seats.iter().filter(|s| s.occupant.is_some()).count();

    let room = RoomView {
        info: state.info.clone(),
        seats: build_seats(state, false, None),
        spectators: spectators.clone(),
        players: occupied,
    };

    let storyteller = StorytellerView {
        room: RoomView {
            info: state.info.clone(),
            seats: build_seats(state, true, None),
            spectators: spectators.clone(),
            players: occupied,
        },
        phase: state.game.as_ref().map(|g| g.phase().as_str().to_string()),
        night: state.game.as_ref().map(Game::night),
        log: state
            .game
            .as_ref()
            .map(|g| g.log().to_vec())
            .unwrap_or_default(),
        tasks: state.setup_tasks.iter().map(|t| t.view()).collect(),
        wake_list: state
            .game
            .as_ref()
            .map(|g| g.wake_list().to_vec())
            .unwrap_or_default(),
        night_one: state
            .game
            .as_ref()
            .filter(|g| g.night() >= 1)
            .map(|g| {
                let info = g.night_one();
                NightOneView {
                    demon_id: info.demon_id,
                    minion_ids: info.minion_ids.clone(),
                    demon_bluffs: info.demon_bluffs.clone(),
                }
            }),
    };

    let mut players = HashMap::new();
    for seat in &state.seats {
        let Some(occ) = &seat.occupant else { continue };
        players.insert(occ.id, build_player_view(state, occ.id, &spectators, occupied));
    }

    Snapshot {
        gid,
        room,
        storyteller,
        players,
    }
}

fn build_player_view(
    state: &RoomState,
    pid: PlayerId,
    spectators: &[SpectatorView],
    occupied: usize,
) -> PlayerView {
    let reveal_own = state.info.status != RoomStatus::Open;
    let only_role_id = reveal_own.then_some(pid);

    let player = state.game.as_ref().and_then(|game| {
        let you = game.players().iter().find(|p| p.id == pid)?;
        Some(PlayerStateView {
            phase: game.phase().as_str().to_string(),
            night: game.night(),
            status: state.info.status,
            you: YouView {
                id: you.id,
                name: you.name.clone(),
                seat: you.seat,
                alive: you.alive,
                ghost: you.ghost_vote_available,
                role: reveal_own
                    .then(|| you.role_id().map(str::to_string))
                    .flatten(),
            },
        })
    });

    PlayerView {
        room: RoomView {
            info: state.info.clone(),
            seats: build_seats(state, false, only_role_id),
            spectators: spectators.to_vec(),
            players: occupied,
        },
        player,
    }
}

/// `include_roles` reveals every occupant's role (storyteller);
/// `only_role_id` reveals just that player's own seat (player self).
fn build_seats(
    state: &RoomState,
    include_roles: bool,
    only_role_id: Option<PlayerId>,
) -> Vec<SeatView> {
    state
        .seats
        .iter()
        .map(|seat| {
            let occupant = seat.occupant.as_ref().map(|occ| {
                let game_player = state
                    .game
                    .as_ref()
                    .and_then(|g| g.players().iter().find(|p| p.id == occ.id));
                let reveal = include_roles || only_role_id == Some(occ.id);
                OccupantView {
                    id: occ.id,
                    name: occ.name.clone(),
                    seat: seat.no,
                    alive: game_player.map(|p| p.alive).unwrap_or(true),
                    ghost: game_player.map(|p| p.ghost_vote_available).unwrap_or(false),
                    role: reveal
                        .then(|| game_player.and_then(|p| p.role_id()).map(str::to_string))
                        .flatten(),
                }
            });
            SeatView {
                seat: seat.no,
                occupant,
            }
        })
        .collect()
}
