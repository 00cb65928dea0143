// Public API - what other modules can use
pub use handlers::get_auth_url;

// Internal modules
mod handlers;

use tracing::warn;

use crate::shared::AppError;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_SCOPES: &[&str] = &[
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
];

/// Client settings for the music service's OAuth authorize step
#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl SpotifyConfig {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// URL the browser is sent to so the user can grant playback access
    pub fn authorization_url(&self) -> Result<String, AppError> {
        let scope = self.scopes.join(" ");
        let query = serde_urlencoded::to_string([
            ("scope", scope.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
        ])
        .map_err(|e| {
            warn!(error = %e, "Failed to encode authorize query");
            AppError::Internal
        })?;

        Ok(format!("{AUTHORIZE_ENDPOINT}?{query}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let config = SpotifyConfig::new("client-123", "http://localhost:8000/spotify/redirect");

        let url = config.authorization_url().unwrap();

        assert_eq!(
            url,
            "https://accounts.spotify.com/authorize\
             ?scope=user-read-playback-state+user-modify-playback-state+user-read-currently-playing\
             &response_type=code\
             &redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fspotify%2Fredirect\
             &client_id=client-123"
        );
    }

    #[test]
    fn test_custom_scopes() {
        let mut config = SpotifyConfig::new("id", "http://example.com/cb");
        config.scopes = vec!["streaming".to_string()];

        let url = config.authorization_url().unwrap();
        assert!(url.contains("scope=streaming&"));
    }
}
