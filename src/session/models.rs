use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Database model for user sessions table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionModel {
    pub id: String, // UUID v4 as string, also the room host identifier
    pub data: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl SessionModel {
    /// Creates a new empty session with generated ID and timestamps
    pub fn new(expiration_days: i64) -> Self {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(expiration_days);

        Self {
            id: Uuid::new_v4().to_string(),
            data: HashMap::new(),
            created_at: now,
            expires_at,
            last_accessed: Some(now),
        }
    }

    /// Checks if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Updates the last accessed timestamp
    pub fn touch(&mut self) {
        self.last_accessed = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_model() {
        let session = SessionModel::new(7);

        assert!(!session.id.is_empty());
        assert!(Uuid::parse_str(&session.id).is_ok());
        assert!(session.data.is_empty());
        assert!(session.expires_at > session.created_at);
        assert!(!session.is_expired());
    }

    #[test]
    fn test_session_expiration() {
        let session = SessionModel::new(-1);
        assert!(session.is_expired());
    }

    #[test]
    fn test_touch_moves_last_accessed_forward() {
        let mut session = SessionModel::new(7);
        let before = session.last_accessed.unwrap();

        session.touch();

        assert!(session.last_accessed.unwrap() >= before);
    }
}
