use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::SessionClaims;
use crate::config::SessionConfig;
use crate::shared::AppError;

/// Signs and verifies the token that carries a session id to the client
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_days: i64,
}

impl TokenConfig {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration_days: config.expiration_days,
        }
    }

    /// Creates a new JWT token for the given session id
    #[instrument(skip(self, session_id))]
    pub fn create_token(&self, session_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::days(self.expiration_days)).timestamp() as usize;

        debug!(
            expiration_days = self.expiration_days,
            exp_timestamp = exp,
            "Creating session token"
        );

        let claims = SessionClaims {
            session_id: session_id.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode session token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Validates a JWT token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(session_id = %data.claims.session_id, "Session token decoded");
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode session token");
            AppError::JwtError(e.to_string())
        })
    }
}
