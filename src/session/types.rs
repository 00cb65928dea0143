use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// JWT claims carried in the session cookie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub session_id: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Well-known keys stored in the session bag
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionKey {
    /// Code of the room this session last created or joined
    RoomCode,
}
