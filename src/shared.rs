use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::room::service::RoomService;
use crate::session::service::SessionService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub room_service: Arc<RoomService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        session_service: Arc<SessionService>,
        room_service: Arc<RoomService>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            session_service,
            room_service,
            config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Client input problem, rendered as `{"Bad Request": msg}`
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown room code on lookup, rendered as `{"Room Not Found": msg}`
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Could not generate a unique room code after {0} attempts")]
    RoomCodeExhausted(u32),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "Bad Request": msg })),
            AppError::RoomNotFound(msg) => {
                (StatusCode::NOT_FOUND, json!({ "Room Not Found": msg }))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "Message": msg })),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "Message": msg })),
            AppError::JwtError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Token error: {}", msg) }),
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Database error: {}", msg) }),
            ),
            err @ AppError::RoomCodeExhausted(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": err.to_string() }),
            ),
            AppError::NotConfigured(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": msg }))
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
