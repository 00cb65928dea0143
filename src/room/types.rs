use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{RoomModel, RoomSettings};
use crate::validation::{FieldKind, FieldSpec, Schema, Validate, ValidationError};

pub const JOIN_MISSING_CODE_MESSAGE: &str = "Invalid post data, did not find a code key";
pub const INVALID_ROOM_CODE_MESSAGE: &str = "Invalid Room Code.";
pub const MISSING_CODE_PARAMETER_MESSAGE: &str = "Code parameter not found in request";

/// Request payload for creating (or re-configuring) the caller's room
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub guest_can_pause: Option<bool>,
    pub votes_to_skip: Option<i32>,
}

impl CreateRoomRequest {
    pub fn settings(&self) -> RoomSettings {
        let defaults = RoomSettings::default();
        RoomSettings {
            guest_can_pause: self.guest_can_pause.unwrap_or(defaults.guest_can_pause),
            votes_to_skip: self.votes_to_skip.unwrap_or(defaults.votes_to_skip),
        }
    }
}

impl Validate for CreateRoomRequest {
    const SCHEMA: Schema = Schema::new(&[
        FieldSpec::optional("guest_can_pause", FieldKind::Boolean),
        FieldSpec::optional("votes_to_skip", FieldKind::PositiveInteger),
    ]);
}

/// Request payload for changing a room's policy
#[derive(Debug, Deserialize)]
pub struct UpdateRoomRequest {
    pub code: String,
    pub guest_can_pause: Option<bool>,
    pub votes_to_skip: Option<i32>,
}

impl Validate for UpdateRoomRequest {
    const SCHEMA: Schema = Schema::new(&[
        FieldSpec::optional("guest_can_pause", FieldKind::Boolean),
        FieldSpec::optional("votes_to_skip", FieldKind::PositiveInteger),
        FieldSpec::required("code", FieldKind::NonEmptyString),
    ]);
}

/// Request payload for joining a room
#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub code: String,
}

impl Validate for JoinRoomRequest {
    const SCHEMA: Schema = Schema::new(&[FieldSpec::required(
        "code",
        FieldKind::NonEmptyString,
    )]);

    fn rejection_message(errors: &[ValidationError]) -> String {
        // A code that is present but unusable can never match a room. `null` counts as absent.
        let only_bad_value = errors
            .iter()
            .all(|e| matches!(e, ValidationError::InvalidType { .. }));

        if only_bad_value && !errors.is_empty() {
            INVALID_ROOM_CODE_MESSAGE.to_string()
        } else {
            JOIN_MISSING_CODE_MESSAGE.to_string()
        }
    }
}

/// Query parameters for looking up a room
#[derive(Debug, Deserialize)]
pub struct GetRoomQuery {
    pub code: String,
}

impl Validate for GetRoomQuery {
    const SCHEMA: Schema = Schema::new(&[FieldSpec::required(
        "code",
        FieldKind::NonEmptyString,
    )]);

    fn rejection_message(_errors: &[ValidationError]) -> String {
        MISSING_CODE_PARAMETER_MESSAGE.to_string()
    }
}

/// Public representation of a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomResponse {
    pub code: String,
    pub host: String,
    pub guest_can_pause: bool,
    pub votes_to_skip: i32,
    pub created_at: DateTime<Utc>,
}

impl From<RoomModel> for RoomResponse {
    fn from(room: RoomModel) -> Self {
        Self {
            code: room.code,
            host: room.host,
            guest_can_pause: room.guest_can_pause,
            votes_to_skip: room.votes_to_skip,
            created_at: room.created_at,
        }
    }
}

/// Room lookup response, tells the caller whether they host it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomDetailsResponse {
    #[serde(flatten)]
    pub room: RoomResponse,
    pub is_host: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JoinRoomResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LeaveRoomResponse {
    #[serde(rename = "Message")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserInRoomResponse {
    pub code: Option<String>,
}
