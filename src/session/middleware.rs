use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::context::SessionHandle;
use crate::shared::{AppError, AppState};

/// Session middleware - resolves the caller's session from the session cookie
/// (or an `Authorization: Bearer` header) and adds a `SessionHandle` to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::session_layer))
/// Handlers can then extract Extension(session): Extension<SessionHandle>.
///
/// After the handler runs, pending changes to the session bag are saved and a
/// cookie is set if the handler created a new session.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn session_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let service = &state.session_service;

    let token = extract_token(req.headers(), service.cookie_name());
    let context = service.load(token.as_deref()).await?;
    let handle = SessionHandle::new(context);

    req.extensions_mut().insert(handle.clone());
    let mut response = next.run(req).await;

    let mut session = handle.lock().await;
    if response.status().is_server_error() {
        return Ok(response);
    }

    // A failed save keeps the handler's response
    if session.is_modified() {
        if let Err(e) = session.save().await {
            warn!(error = %e, "Failed to save session after request");
        }
    }

    if session.was_created() {
        let Some(session_id) = session.session_key() else {
            return Err(AppError::Internal);
        };
        let token = service.issue_token(session_id)?;
        let cookie = session_cookie(service.cookie_name(), &token, service.expiration_days());

        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                debug!(session_id = %session_id, "Issuing session cookie");
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                warn!(error = %e, "Session cookie is not a valid header value");
                return Err(AppError::Internal);
            }
        }
    }

    Ok(response)
}

/// Finds the session token in the named cookie, falling back to a Bearer header
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim_matches('"').to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
    })
    .filter(|token| !token.is_empty())
}

fn session_cookie(name: &str, token: &str, expiration_days: i64) -> String {
    let max_age = expiration_days.max(0) * 24 * 60 * 60;
    format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}")
}
