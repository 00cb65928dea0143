use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::spotify::SpotifyConfig;

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Session cookie and token settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    pub expiration_days: i64,
    pub cookie_name: String,
    pub cleanup_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            expiration_days: 14,
            cookie_name: "sessionid".to_string(),
            cleanup_interval: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

/// Room code generation settings
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub code_length: usize,
    pub max_code_attempts: u32,
}

impl RoomConfig {
    /// Width of the `rooms.code` column
    pub const MAX_CODE_LENGTH: usize = 16;
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            max_code_attempts: 32,
        }
    }
}

/// Application configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub session: SessionConfig,
    pub room: RoomConfig,
    pub spotify: Option<SpotifyConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            database_url: None,
            session: SessionConfig::default(),
            room: RoomConfig::default(),
            spotify: None,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup (env-like)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = parse_or(&lookup, "JAMROOM_BIND_ADDR", defaults.bind_addr);

        let session = SessionConfig {
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.session.jwt_secret),
            expiration_days: parse_or(
                &lookup,
                "SESSION_EXPIRATION_DAYS",
                defaults.session.expiration_days,
            ),
            cookie_name: lookup("SESSION_COOKIE_NAME")
                .filter(|name| !name.is_empty())
                .unwrap_or(defaults.session.cookie_name),
            cleanup_interval: Duration::from_secs(parse_or(
                &lookup,
                "SESSION_CLEANUP_INTERVAL_SECS",
                defaults.session.cleanup_interval.as_secs(),
            )),
        };

        let room = RoomConfig {
            code_length: clamp_code_length(parse_or(
                &lookup,
                "ROOM_CODE_LENGTH",
                defaults.room.code_length,
            )),
            max_code_attempts: parse_or(
                &lookup,
                "ROOM_CODE_MAX_ATTEMPTS",
                defaults.room.max_code_attempts,
            )
            .max(1),
        };

        let spotify = match (lookup("SPOTIFY_CLIENT_ID"), lookup("SPOTIFY_REDIRECT_URI")) {
            (Some(client_id), Some(redirect_uri)) => {
                let mut config = SpotifyConfig::new(client_id, redirect_uri);
                if let Some(scopes) = lookup("SPOTIFY_SCOPES") {
                    config.scopes = scopes.split_whitespace().map(str::to_string).collect();
                }
                Some(config)
            }
            _ => None,
        };

        Self {
            bind_addr,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            session,
            room,
            spotify,
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, "Invalid configuration value, using default");
            default
        }),
        None => default,
    }
}

fn clamp_code_length(length: usize) -> usize {
    let clamped = length.clamp(1, RoomConfig::MAX_CODE_LENGTH);
    if clamped != length {
        warn!(
            requested = length,
            used = clamped,
            "ROOM_CODE_LENGTH out of range, clamping"
        );
    }
    clamped
}
