use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::shared::{AppError, AppState};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthUrlResponse {
    pub url: String,
}

/// HTTP handler returning the music service authorize URL
///
/// GET /spotify/get-auth-url
#[instrument(name = "get_auth_url", skip(state))]
pub async fn get_auth_url(State(state): State<AppState>) -> Result<Json<AuthUrlResponse>, AppError> {
    let spotify = state.config.spotify.as_ref().ok_or_else(|| {
        info!("Authorize URL requested but Spotify is not configured");
        AppError::NotConfigured("Spotify integration is not configured".to_string())
    })?;

    Ok(Json(AuthUrlResponse {
        url: spotify.authorization_url()?,
    }))
}
