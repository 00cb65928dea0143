use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_GUEST_CAN_PAUSE: bool = true;
pub const DEFAULT_VOTES_TO_SKIP: i32 = 1;

/// Database model for rooms table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct RoomModel {
    pub code: String, // Random uppercase alphanumeric code, never changes
    pub host: String, // Session key of the room's owner
    pub guest_can_pause: bool,
    pub votes_to_skip: i32,
    pub created_at: DateTime<Utc>,
}

impl RoomModel {
    /// Creates a new room model with the given code and policy
    pub fn new(code: String, host: String, settings: RoomSettings) -> Self {
        Self {
            code,
            host,
            guest_can_pause: settings.guest_can_pause,
            votes_to_skip: settings.votes_to_skip,
            created_at: Utc::now(),
        }
    }

    /// Check if the given session owns this room
    pub fn is_host(&self, session_key: Option<&str>) -> bool {
        session_key == Some(self.host.as_str())
    }

    pub fn settings(&self) -> RoomSettings {
        RoomSettings {
            guest_can_pause: self.guest_can_pause,
            votes_to_skip: self.votes_to_skip,
        }
    }

    pub fn apply_settings(&mut self, settings: RoomSettings) {
        self.guest_can_pause = settings.guest_can_pause;
        self.votes_to_skip = settings.votes_to_skip;
    }
}

/// The two playback policy fields a host controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    pub guest_can_pause: bool,
    pub votes_to_skip: i32,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            guest_can_pause: DEFAULT_GUEST_CAN_PAUSE,
            votes_to_skip: DEFAULT_VOTES_TO_SKIP,
        }
    }
}
