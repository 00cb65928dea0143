//! Request schema validation.
//!
//! Schemas describe the fields a request body or query must carry and are
//! checked against raw JSON before anything is deserialized or handed to a
//! handler. Nothing in here depends on the web framework; see [`extract`]
//! for the axum adapter.

pub mod extract;

use serde::de::DeserializeOwned;
use serde_json::Value;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// Message used when a request does not say anything more specific
pub const INVALID_DATA_MESSAGE: &str = "Invalid Data...";

/// The shape a field value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FieldKind {
    #[strum(serialize = "boolean")]
    Boolean,
    /// Integer in `1..=i32::MAX`
    #[strum(serialize = "positive integer")]
    PositiveInteger,
    #[strum(serialize = "non-empty string")]
    NonEmptyString,
}

impl FieldKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::PositiveInteger => value
                .as_i64()
                .is_some_and(|n| (1..=i64::from(i32::MAX)).contains(&n)),
            FieldKind::NonEmptyString => value.as_str().is_some_and(|s| !s.is_empty()),
        }
    }
}

/// A single named field in a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    Malformed(String),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("field `{0}` is null")]
    Null(&'static str),

    #[error("field `{field}` must be a {expected}")]
    InvalidType {
        field: &'static str,
        expected: FieldKind,
    },
}

/// Ordered set of field specs for one kind of request
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Checks every field and returns all problems found.
    ///
    /// Unknown keys are ignored. An explicit `null` is reported on its own so
    /// callers can treat it like an absent key.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<ValidationError>> {
        let Some(object) = value.as_object() else {
            return Err(vec![ValidationError::NotAnObject]);
        };

        let errors: Vec<ValidationError> = self
            .fields
            .iter()
            .filter_map(|spec| match object.get(spec.name) {
                None if spec.required => Some(ValidationError::Missing(spec.name)),
                None => None,
                Some(Value::Null) => Some(ValidationError::Null(spec.name)),
                Some(value) if spec.kind.accepts(value) => None,
                Some(_) => Some(ValidationError::InvalidType {
                    field: spec.name,
                    expected: spec.kind,
                }),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A request type with a schema that must pass before it is deserialized
pub trait Validate: DeserializeOwned {
    const SCHEMA: Schema;

    /// Client-facing message for a rejected request
    fn rejection_message(_errors: &[ValidationError]) -> String {
        INVALID_DATA_MESSAGE.to_string()
    }
}

/// Validates `value` against `T::SCHEMA` and deserializes it
pub fn validate_into<T: Validate>(value: Value) -> Result<T, Vec<ValidationError>> {
    T::SCHEMA.validate(&value)?;
    serde_json::from_value(value).map_err(|e| vec![ValidationError::Malformed(e.to_string())])
}

/// Parses a raw body and validates it. An empty body is treated as `{}`.
pub fn validate_body<T: Validate>(body: &[u8]) -> Result<T, Vec<ValidationError>> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(body).map_err(|e| vec![ValidationError::Malformed(e.to_string())])?
    };
    validate_into(value)
}
