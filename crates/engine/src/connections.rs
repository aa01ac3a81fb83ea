//! Per-room peer management and fan-out.
//!
//! Three audience classes with distinct views: seated players, the
//! storyteller, and anonymous room viewers. Delivery is best-effort: a
//! peer whose channel is closed or full is pruned from the audience set
//! without aborting the broadcast to the others.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use grimoire_domain::PlayerId;
use grimoire_shared::Envelope;

use crate::views::Snapshot;

/// Buffer size for each peer's outbound channel.
const PEER_CHANNEL_BUFFER: usize = 256;

pub type PeerId = Uuid;
pub type PeerSender = mpsc::Sender<Envelope>;

#[derive(Debug, Default)]
pub struct RoomPeers {
    storyteller: RwLock<Option<(PeerId, PeerSender)>>,
    players: RwLock<HashMap<PlayerId, HashMap<PeerId, PeerSender>>>,
    viewers: RwLock<HashMap<PeerId, PeerSender>>,
}

impl RoomPeers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the outbound channel for a new peer. The receiver half is
    /// drained by the socket's send task.
    pub fn channel() -> (PeerSender, mpsc::Receiver<Envelope>) {
        mpsc::channel(PEER_CHANNEL_BUFFER)
    }

    /// Attach the storyteller socket, displacing a previous one.
    pub async fn attach_storyteller(&self, peer: PeerId, sender: PeerSender) {
        let mut st = self.storyteller.write().await;
        *st = Some((peer, sender));
        tracing::debug!(peer = %peer, "storyteller attached");
    }

    pub async fn attach_player(&self, pid: PlayerId, peer: PeerId, sender: PeerSender) {
        let mut players = self.players.write().await;
        players.entry(pid).or_default().insert(peer, sender);
        tracing::debug!(peer = %peer, player = %pid, "player peer attached");
    }

    pub async fn attach_viewer(&self, peer: PeerId, sender: PeerSender) {
        let mut viewers = self.viewers.write().await;
        viewers.insert(peer, sender);
        tracing::debug!(peer = %peer, "room viewer attached");
    }

    /// Remove a peer from whichever audience holds it.
    pub async fn detach(&self, peer: PeerId) {
        {
            let mut st = self.storyteller.write().await;
            if st.as_ref().map(|(id, _)| *id) == Some(peer) {
                *st = None;
            }
        }
        {
            let mut players = self.players.write().await;
            for socks in players.values_mut() {
                socks.remove(&peer);
            }
            players.retain(|_, socks| !socks.is_empty());
        }
        let mut viewers = self.viewers.write().await;
        viewers.remove(&peer);
    }

    /// Deliver a frame to the storyteller, if connected. A failed send
    /// detaches the stale socket.
    pub async fn send_to_storyteller(&self, envelope: Envelope) {
        let mut st = self.storyteller.write().await;
        let stale = match st.as_ref() {
            Some((peer, sender)) => {
                let failed = sender.try_send(envelope).is_err();
                if failed {
                    tracing::warn!(peer = %peer, "storyteller channel closed, detaching");
                }
                failed
            }
            None => false,
        };
        if stale {
            *st = None;
        }
    }

    /// Fan the current snapshot out to every audience, pruning any peer
    /// whose channel is gone.
    pub async fn broadcast(&self, snapshot: &Snapshot) {
        {
            let mut players = self.players.write().await;
            for (pid, socks) in players.iter_mut() {
                let Some(view) = snapshot.player_state(*pid) else {
                    continue;
                };
                socks.retain(|peer, sender| {
                    let ok = sender.try_send(view.clone()).is_ok();
                    if !ok {
                        tracing::debug!(peer = %peer, player = %pid, "pruning dead player peer");
                    }
                    ok
                });
            }
            players.retain(|_, socks| !socks.is_empty());
        }

        self.send_to_storyteller(snapshot.storyteller_state()).await;

        let mut viewers = self.viewers.write().await;
        let view = snapshot.room_state();
        viewers.retain(|peer, sender| {
            let ok = sender.try_send(view.clone()).is_ok();
            if !ok {
                tracing::debug!(peer = %peer, "pruning dead room viewer");
            }
            ok
        });
    }

    /// Drop every peer channel. Used at room teardown; the socket tasks
    /// observe the closed channel and shut down.
    pub async fn disconnect_all(&self) {
        self.storyteller.write().await.take();
        self.players.write().await.clear();
        self.viewers.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grimoire_domain::RoomId;
    use grimoire_shared::views::{RoomInfo, RoomStatus};

    use crate::rooms::room::RoomState;
    use crate::views::build_snapshot;

    fn snapshot() -> Snapshot {
        let state = RoomState {
            info: RoomInfo {
                gid: RoomId::new(),
                name: "Table".to_string(),
                script_name: "Trouble Brewing".to_string(),
                storyteller_id: PlayerId::new(),
                storyteller_name: "Otto".to_string(),
                status: RoomStatus::Open,
            },
            seats: Vec::new(),
            spectators: Vec::new(),
            game: None,
            setup_tasks: Vec::new(),
            next_task_id: 1,
        };
        build_snapshot(&state)
    }

    #[tokio::test]
    async fn broadcast_prunes_peers_whose_channel_is_gone() {
        let peers = RoomPeers::new();
        let (alive_tx, mut alive_rx) = RoomPeers::channel();
        let (dead_tx, dead_rx) = RoomPeers::channel();
        peers.attach_viewer(Uuid::new_v4(), alive_tx).await;
        peers.attach_viewer(Uuid::new_v4(), dead_tx).await;
        drop(dead_rx);

        let snap = snapshot();
        peers.broadcast(&snap).await;
        assert!(alive_rx.recv().await.is_some(), "live peer still served");
        assert_eq!(peers.viewers.read().await.len(), 1, "dead peer pruned");

        peers.broadcast(&snap).await;
        assert!(alive_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn storyteller_send_detaches_a_stale_socket() {
        let peers = RoomPeers::new();
        let (tx, rx) = RoomPeers::channel();
        peers.attach_storyteller(Uuid::new_v4(), tx).await;
        drop(rx);

        peers
            .send_to_storyteller(snapshot().storyteller_state())
            .await;
        assert!(peers.storyteller.read().await.is_none());
    }

    #[tokio::test]
    async fn detach_removes_a_peer_from_its_audience() {
        let peers = RoomPeers::new();
        let pid = PlayerId::new();
        let peer = Uuid::new_v4();
        let (tx, _rx) = RoomPeers::channel();
        peers.attach_player(pid, peer, tx).await;

        peers.detach(peer).await;
        assert!(peers.players.read().await.is_empty());
    }
}
