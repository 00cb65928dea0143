use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};

use super::models::SessionModel;
use super::repository::SessionRepository;
use crate::shared::AppError;

/// Per-request view of the caller's session.
///
/// Handlers receive this explicitly and use it as a key-value bag. Reads and
/// writes only touch the in-memory copy; `create` and `save` go to the
/// injected repository.
pub struct SessionContext {
    repository: Arc<dyn SessionRepository + Send + Sync>,
    expiration_days: i64,
    session: Option<SessionModel>,
    data: HashMap<String, String>,
    created: bool,
    modified: bool,
}

impl SessionContext {
    /// Wraps a session loaded for this request, or `None` for an anonymous caller
    pub fn new(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        expiration_days: i64,
        session: Option<SessionModel>,
    ) -> Self {
        let data = session
            .as_ref()
            .map(|session| session.data.clone())
            .unwrap_or_default();

        Self {
            repository,
            expiration_days,
            session,
            data,
            created: false,
            modified: false,
        }
    }

    /// The session key, if the caller has a session
    pub fn session_key(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.id.as_str())
    }

    /// Checks the store for a live record under the current key
    #[instrument(skip(self))]
    pub async fn exists(&self) -> Result<bool, AppError> {
        let Some(key) = self.session_key() else {
            return Ok(false);
        };

        Ok(self
            .repository
            .get_session(key)
            .await?
            .is_some_and(|session| !session.is_expired()))
    }

    /// Starts a fresh, empty session and persists it immediately
    pub async fn create(&mut self) -> Result<&str, AppError> {
        let session = SessionModel::new(self.expiration_days);
        self.repository.create_session(&session).await?;
        debug!(session_id = %session.id, "Created new session");

        self.data.clear();
        self.created = true;
        self.modified = false;
        Ok(&self.session.insert(session).id)
    }

    /// Creates a session unless a live one already exists
    pub async fn ensure(&mut self) -> Result<&str, AppError> {
        if !self.exists().await? {
            self.create().await?;
        }
        self.session_key().ok_or(AppError::Internal)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.data.insert(key.to_string(), value.into());
        self.modified = true;
    }

    pub fn pop(&mut self, key: &str) -> Option<String> {
        let value = self.data.remove(key);
        if value.is_some() {
            self.modified = true;
        }
        value
    }

    /// Whether `create` ran during this request
    pub fn was_created(&self) -> bool {
        self.created
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Writes the bag back to the store, creating the session first if needed
    #[instrument(skip(self))]
    pub async fn save(&mut self) -> Result<(), AppError> {
        if self.session.is_none() {
            let data = std::mem::take(&mut self.data);
            self.create().await?;
            self.data = data;
        }

        let Some(session) = self.session.as_mut() else {
            return Err(AppError::Internal);
        };
        session.data = self.data.clone();
        session.touch();
        self.repository.update_session(session).await?;

        debug!(session_id = %session.id, keys = self.data.len(), "Session saved");
        self.modified = false;
        Ok(())
    }
}

/// Shared handle placed in request extensions by the session middleware
#[derive(Clone)]
pub struct SessionHandle(Arc<Mutex<SessionContext>>);

impl SessionHandle {
    pub fn new(context: SessionContext) -> Self {
        Self(Arc::new(Mutex::new(context)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, SessionContext> {
        self.0.lock().await
    }
}
