//! Room lifecycle HTTP routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use grimoire_domain::{RoomId, TaskId};
use grimoire_shared::requests::{
    CreateRoomRequest, CreateRoomResponse, Identity, JoinRequest, LeaveRequest,
    ResizeSeatsRequest, SetupTaskAnswer, SitRequest, StepResponse, VacateRequest,
};
use grimoire_shared::views::{RoomInfo, RoomView};

use crate::api::error::ApiError;
use crate::app::App;

pub fn router() -> Router<Arc<App>> {
    Router::new()
        .route("/api/lobby", get(lobby))
        .route("/api/rooms", post(create_room))
        .route("/api/rooms/{gid}", get(room_details).delete(teardown_room))
        .route("/api/rooms/{gid}/join", post(join_room))
        .route("/api/rooms/{gid}/leave", post(leave_room))
        .route("/api/rooms/{gid}/sit", post(sit))
        .route("/api/rooms/{gid}/vacate", post(vacate))
        .route("/api/rooms/{gid}/seats", post(resize_seats))
        .route("/api/rooms/{gid}/start", post(start_game))
        .route("/api/rooms/{gid}/step", post(step))
        .route("/api/rooms/{gid}/tasks/{task_id}", post(perform_setup_task))
}

async fn lobby(State(app): State<Arc<App>>) -> Json<Vec<RoomInfo>> {
    Json(app.rooms.lobby().await)
}

async fn create_room(
    State(app): State<Arc<App>>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    let (gid, room) = app.rooms.create(
        req.name,
        req.script.as_deref(),
        req.seat_count.unwrap_or(8),
        req.creator,
        app.roles.clone(),
    )?;
    tracing::debug!(gid = %gid, "room creation served");
    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            room: room.info().await,
        }),
    ))
}

async fn room_details(
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
) -> Result<Json<RoomView>, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    let snapshot = room.snapshot().await;
    Ok(Json(snapshot.room_view().clone()))
}

async fn teardown_room(
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.rooms.teardown(RoomId::from_uuid(gid)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn join_room(
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<Identity>, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    let who = Identity {
        id: req.id,
        name: req.name,
    };
    room.join_spectator(who.clone()).await?;
    Ok(Json(who))
}

async fn leave_room(
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
    Json(req): Json<LeaveRequest>,
) -> Result<StatusCode, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    room.leave(req.id).await?;
    Ok(StatusCode::OK)
}

async fn sit(
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
    Json(req): Json<SitRequest>,
) -> Result<StatusCode, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    room.sit(req.spectator_id, req.seat_no).await?;
    Ok(StatusCode::OK)
}

async fn vacate(
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
    Json(req): Json<VacateRequest>,
) -> Result<StatusCode, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    room.vacate(req.player_id, req.seat_no).await?;
    Ok(StatusCode::OK)
}

async fn resize_seats(
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
    Json(req): Json<ResizeSeatsRequest>,
) -> Result<StatusCode, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    room.resize_seats(req.seat_count).await?;
    Ok(StatusCode::OK)
}

async fn start_game(
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    room.start_game().await?;
    Ok(StatusCode::OK)
}

async fn step(
    State(app): State<Arc<App>>,
    Path(gid): Path<Uuid>,
) -> Result<Json<StepResponse>, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    let (phase, night) = room.advance_phase().await?;
    Ok(Json(StepResponse {
        ok: true,
        phase: phase.as_str().to_string(),
        night,
    }))
}

async fn perform_setup_task(
    State(app): State<Arc<App>>,
    Path((gid, task_id)): Path<(Uuid, u64)>,
    Json(req): Json<SetupTaskAnswer>,
) -> Result<StatusCode, ApiError> {
    let room = app.rooms.get(RoomId::from_uuid(gid))?;
    room.perform_setup_task(TaskId::new(task_id), req.player_id)
        .await?;
    Ok(StatusCode::OK)
}
