use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    context::SessionContext, models::SessionModel, repository::SessionRepository,
    token::TokenConfig,
};
use crate::config::SessionConfig;
use crate::shared::AppError;

/// Service for resolving, issuing and expiring sessions
pub struct SessionService {
    token_config: TokenConfig,
    repository: Arc<dyn SessionRepository + Send + Sync>,
    cookie_name: String,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository + Send + Sync>, config: &SessionConfig) -> Self {
        Self {
            token_config: TokenConfig::new(config),
            repository,
            cookie_name: config.cookie_name.clone(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn expiration_days(&self) -> i64 {
        self.token_config.expiration_days
    }

    /// Builds the session context for a request.
    ///
    /// A missing, malformed or revoked token yields an anonymous context;
    /// only storage failures are errors.
    #[instrument(skip(self, token))]
    pub async fn load(&self, token: Option<&str>) -> Result<SessionContext, AppError> {
        let session = match token {
            Some(token) => self.resolve(token).await?,
            None => None,
        };

        Ok(SessionContext::new(
            Arc::clone(&self.repository),
            self.token_config.expiration_days,
            session,
        ))
    }

    async fn resolve(&self, token: &str) -> Result<Option<SessionModel>, AppError> {
        let claims = match self.token_config.validate_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Ignoring invalid session token");
                return Ok(None);
            }
        };

        match self.repository.get_session(&claims.session_id).await? {
            Some(session) if session.is_expired() => {
                debug!(session_id = %session.id, "Session has expired");
                Ok(None)
            }
            Some(session) => Ok(Some(session)),
            None => {
                debug!(session_id = %claims.session_id, "Session not found, may have been revoked");
                Ok(None)
            }
        }
    }

    /// Issues the client-side token for a session id
    pub fn issue_token(&self, session_id: &str) -> Result<String, AppError> {
        self.token_config.create_token(session_id)
    }

    /// Cleans up expired sessions from the store
    #[instrument(skip(self))]
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let removed_count = self.repository.cleanup_expired_sessions().await?;

        if removed_count > 0 {
            info!(removed_sessions = removed_count, "Expired sessions removed");
        } else {
            debug!("No expired sessions to remove");
        }
        Ok(removed_count)
    }
}
