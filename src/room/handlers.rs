use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use super::types::{
    CreateRoomRequest, GetRoomQuery, JoinRoomRequest, JoinRoomResponse, LeaveRoomResponse,
    RoomDetailsResponse, RoomResponse, UpdateRoomRequest, UserInRoomResponse,
    INVALID_ROOM_CODE_MESSAGE,
};
use crate::session::{SessionHandle, SessionKey};
use crate::shared::{AppError, AppState};
use crate::validation::extract::{ValidatedJson, ValidatedQuery};

/// HTTP handler for listing all rooms
///
/// GET /api/room
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let rooms = state.room_service.list_rooms().await?;

    info!(room_count = rooms.len(), "Rooms listed successfully");

    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// HTTP handler for looking up a room by code
///
/// GET /api/get-room?code=<code>
/// Also reports whether the caller hosts the room
#[instrument(name = "get_room", skip(state, session, query), fields(room_code = %query.code))]
pub async fn get_room(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    ValidatedQuery(query): ValidatedQuery<GetRoomQuery>,
) -> Result<Json<RoomDetailsResponse>, AppError> {
    let room = state
        .room_service
        .find_by_code(&query.code)
        .await?
        .ok_or_else(|| AppError::RoomNotFound(INVALID_ROOM_CODE_MESSAGE.to_string()))?;

    let session = session.lock().await;
    let is_host = room.is_host(session.session_key());

    Ok(Json(RoomDetailsResponse {
        room: room.into(),
        is_host,
    }))
}

/// HTTP handler for joining a room
///
/// POST /api/join-room
/// Remembers the room code in the caller's session
#[instrument(name = "join_room", skip(state, session, request), fields(room_code = %request.code))]
pub async fn join_room(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    ValidatedJson(request): ValidatedJson<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    let mut session = session.lock().await;
    session.ensure().await?;

    if state.room_service.find_by_code(&request.code).await?.is_none() {
        info!("Join attempted with unknown room code");
        return Err(AppError::BadRequest(INVALID_ROOM_CODE_MESSAGE.to_string()));
    }

    session.set(SessionKey::RoomCode.as_ref(), request.code);
    info!("Session joined room");

    Ok(Json(JoinRoomResponse {
        message: "Room Joined!".to_string(),
    }))
}

/// HTTP handler for creating a room
///
/// POST /api/create-room
/// A caller that already hosts a room gets that room back with the new policy
#[instrument(name = "create_room", skip(state, session))]
pub async fn create_room(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    ValidatedJson(request): ValidatedJson<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), AppError> {
    let mut session = session.lock().await;
    let host = session.ensure().await?.to_string();

    let (room, created) = state
        .room_service
        .create_or_update(&host, request.settings())
        .await?;
    session.set(SessionKey::RoomCode.as_ref(), room.code.clone());

    info!(room_code = %room.code, created, "Room ready for host");

    Ok((StatusCode::CREATED, Json(room.into())))
}

/// HTTP handler reporting which room the caller's session is in
///
/// GET /api/user-in-room
#[instrument(name = "user_in_room", skip(session))]
pub async fn user_in_room(
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<UserInRoomResponse>, AppError> {
    let mut session = session.lock().await;
    session.ensure().await?;

    Ok(Json(UserInRoomResponse {
        code: session
            .get(SessionKey::RoomCode.as_ref())
            .map(str::to_string),
    }))
}

/// HTTP handler for leaving the current room
///
/// POST /api/leave-room
/// Closes the room if the caller hosts it. Always succeeds.
#[instrument(name = "leave_room", skip(state, session))]
pub async fn leave_room(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<LeaveRoomResponse>, AppError> {
    let mut session = session.lock().await;
    let room_key = SessionKey::RoomCode;

    if session.contains(room_key.as_ref()) {
        let room_code = session.pop(room_key.as_ref()).unwrap_or_default();
        info!(room_code = %room_code, "Session left room");

        if let Some(host) = session.session_key() {
            state.room_service.delete_by_host(host).await?;
        }
    }

    Ok(Json(LeaveRoomResponse {
        message: "Success".to_string(),
    }))
}

/// HTTP handler for changing a room's policy
///
/// PATCH /api/update-room
/// Only the host may update
#[instrument(name = "update_room", skip(state, session, request), fields(room_code = %request.code))]
pub async fn update_room(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    ValidatedJson(request): ValidatedJson<UpdateRoomRequest>,
) -> Result<Json<RoomResponse>, AppError> {
    let mut session = session.lock().await;
    let caller = session.ensure().await?;

    let room = state
        .room_service
        .update_settings(
            &request.code,
            caller,
            request.guest_can_pause,
            request.votes_to_skip,
        )
        .await?;

    Ok(Json(room.into()))
}
