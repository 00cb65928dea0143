// Library crate for the jam room server
// This file exposes the public API for main and integration tests

pub mod config;
pub mod room;
pub mod session;
pub mod shared;
pub mod spotify;
pub mod validation;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use config::AppConfig;
use room::{repository::RoomRepository, RoomService};
use session::{repository::SessionRepository, service::SessionService};

// Re-export commonly used types for easier access in tests
pub use room::models::{RoomModel, RoomSettings};
pub use shared::{AppError, AppState};

/// Wires repositories and configuration into the shared application state
pub fn build_state(
    config: AppConfig,
    session_repository: Arc<dyn SessionRepository + Send + Sync>,
    room_repository: Arc<dyn RoomRepository + Send + Sync>,
) -> AppState {
    let session_service = SessionService::new(session_repository, &config.session);
    let room_service = RoomService::new(room_repository, &config.room);

    AppState::new(
        Arc::new(session_service),
        Arc::new(room_service),
        Arc::new(config),
    )
}

/// Builds the HTTP router. Every `/api` and `/spotify` route runs inside the session layer.
pub fn build_router(app_state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/api/room", get(room::list_rooms))
        .route("/api/get-room", get(room::get_room))
        .route("/api/join-room", post(room::join_room))
        .route("/api/create-room", post(room::create_room))
        .route("/api/user-in-room", get(room::user_in_room))
        .route("/api/leave-room", post(room::leave_room))
        .route("/api/update-room", patch(room::update_room))
        .route("/spotify/get-auth-url", get(spotify::get_auth_url))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            session::session_layer,
        ));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
