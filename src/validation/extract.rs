use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde_json::{Map, Value};
use tracing::debug;

use super::{validate_body, validate_into, Validate, ValidationError};
use crate::shared::AppError;

/// JSON body extractor that runs the type's schema before deserializing.
/// Rejections are always 400 with the type's own message.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|e| {
            debug!(error = %e, "Failed to read request body");
            reject::<T>(vec![ValidationError::Malformed(e.to_string())])
        })?;

        validate_body::<T>(&body).map(ValidatedJson).map_err(reject::<T>)
    }
}

/// Query string extractor that runs the type's schema over the query
/// parameters, all of which are strings.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| reject::<T>(vec![ValidationError::Malformed(e.to_string())]))?;

        // First occurrence wins for repeated keys
        let mut object = Map::new();
        for (key, value) in pairs {
            object.entry(key).or_insert(Value::String(value));
        }

        validate_into::<T>(Value::Object(object))
            .map(ValidatedQuery)
            .map_err(reject::<T>)
    }
}

fn reject<T: Validate>(errors: Vec<ValidationError>) -> AppError {
    debug!(?errors, "Request failed validation");
    AppError::BadRequest(T::rejection_message(&errors))
}
