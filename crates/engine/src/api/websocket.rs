//! WebSocket endpoints for the three audiences.
//!
//! `/ws/{gid}/st` is the storyteller channel: it receives prompts, night
//! preparation and task events, and sends prompt answers and day actions.
//! `/ws/{gid}/player/{pid}` and `/ws/{gid}/room` receive their redacted
//! state frames and send nothing but heartbeats.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use grimoire_domain::{GameError, PlayerId, RoomId};
use grimoire_shared::{ClientMessage, Envelope, ServerMessage};

use crate::api::error::ApiError;
use crate::app::App;
use crate::connections::RoomPeers;
use crate::rooms::GameRoom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Storyteller,
    Player(PlayerId),
    Viewer,
}

pub fn router() -> Router<Arc<App>> {
    Router::new()
        .route("/ws/{gid}/st", get(storyteller_ws))
        .route("/ws/{gid}/player/{pid}", get(player_ws))
        .route("/ws/{gid}/room", get(viewer_ws))
}

async fn storyteller_ws(
    ws: WebSocketUpgrade,
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
) -> Result<Response, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, room, Audience::Storyteller)))
}

async fn player_ws(
    ws: WebSocketUpgrade,
    State(app): State<Arc<App>>,
    Path((gid, pid)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    let pid = PlayerId::from_uuid(pid);
    if !room.is_seated(pid).await {
        return Err(GameError::not_found("player", pid.to_string()).into());
    }
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, room, Audience::Player(pid))))
}

async fn viewer_ws(
    ws: WebSocketUpgrade,
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
) -> Result<Response, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, room, Audience::Viewer)))
}

async fn handle_socket(socket: WebSocket, room: Arc<GameRoom>, audience: Audience) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let peer_id = Uuid::new_v4();
    let (tx, mut rx) = RoomPeers::channel();

    match audience {
        Audience::Storyteller => room.peers.attach_storyteller(peer_id, tx.clone()).await,
        Audience::Player(pid) => room.peers.attach_player(pid, peer_id, tx.clone()).await,
        Audience::Viewer => room.peers.attach_viewer(peer_id, tx.clone()).await,
    }
    tracing::info!(peer = %peer_id, ?audience, "websocket connected");

    // Initial frames come from the cached snapshot: a read-only connect
    // must not contend with an engine operation suspended on a prompt.
    let snapshot = room.snapshot().await;
    let gid = snapshot.gid();
    let _ = tx.try_send(Envelope::new(gid, ServerMessage::Hello));
    let state = match audience {
        Audience::Storyteller => Some(snapshot.storyteller_state()),
        Audience::Player(pid) => snapshot.player_state(pid),
        Audience::Viewer => Some(snapshot.room_state()),
    };
    if let Some(frame) = state {
        let _ = tx.try_send(frame);
    }
    drop(snapshot);

    // Forward outbound frames from the channel onto the socket.
    let send_task = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&envelope) else {
                continue;
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => dispatch(&room, audience, msg, &tx, gid).await,
                Err(e) => {
                    tracing::warn!(peer = %peer_id, error = %e, "unparseable frame");
                    let _ = tx.try_send(Envelope::new(
                        gid,
                        ServerMessage::Error {
                            code: "parse_error".to_string(),
                            message: format!("invalid message format: {e}"),
                        },
                    ));
                }
            },
            Ok(Message::Ping(_)) => {
                let _ = tx.try_send(Envelope::new(gid, ServerMessage::Pong));
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::warn!(peer = %peer_id, error = %e, "websocket error");
                break;
            }
            _ => {}
        }
    }

    room.peers.detach(peer_id).await;
    send_task.abort();
    tracing::info!(peer = %peer_id, "websocket disconnected");
}

/// Route a parsed frame. Day actions and prompt answers are accepted only
/// on the storyteller channel. Actions that take the room lock run on
/// their own task: the read loop must stay free to deliver the prompt
/// answer that an in-flight engine operation may be suspended on.
async fn dispatch(
    room: &Arc<GameRoom>,
    audience: Audience,
    msg: ClientMessage,
    tx: &crate::connections::PeerSender,
    gid: RoomId,
) {
    if let ClientMessage::Heartbeat = msg {
        let _ = tx.try_send(Envelope::new(gid, ServerMessage::Pong));
        return;
    }
    if audience != Audience::Storyteller {
        send_rejection(
            tx,
            gid,
            &GameError::invalid_operation("only the storyteller channel may act"),
        );
        return;
    }
    if let ClientMessage::Respond { cid, answer } = msg {
        // Resolves via the bus, never the room lock.
        room.respond(cid, answer).await;
        return;
    }

    let room = room.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = match msg {
            ClientMessage::Nominate { nominator, target } => {
                room.nominate(nominator, target).await
            }
            ClientMessage::CastVote { voter, vote_for } => room.cast_vote(voter, vote_for).await,
            ClientMessage::CloseNomination => room.close_nomination().await.map(|_| ()),
            ClientMessage::Slay { slayer, target } => room.slay(slayer, target).await.map(|_| ()),
            ClientMessage::Respond { .. } | ClientMessage::Heartbeat => Ok(()),
        };
        if let Err(e) = outcome {
            send_rejection(&tx, gid, &e);
        }
    });
}

fn send_rejection(tx: &crate::connections::PeerSender, gid: RoomId, err: &GameError) {
    let _ = tx.try_send(Envelope::new(
        gid,
        ServerMessage::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    ));
}
