//! Client configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use std::env;
use std::time::Duration;

/// Default REST backend of the gym console.
pub const DEFAULT_API_URL: &str = "https://gymsmart.azurewebsites.net/api";

/// Delay before a highlighted event moves into history, in milliseconds.
pub const DEFAULT_PROMOTION_DELAY_MS: u64 = 3000;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST base URL, without trailing slash
    pub api_url: String,
    /// Server-Sent-Events endpoint for the live door feed
    pub events_url: String,
    /// How long an event stays highlighted before moving to history
    pub promotion_delay: Duration,
    /// Gym whose door events the feed subscribes to (all gyms when unset)
    pub gym_id: Option<u32>,

    // --- Optional console login (used by the binary) ---
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080/api".to_string(),
            events_url: "http://127.0.0.1:8080/api/hikvision/events".to_string(),
            promotion_delay: Duration::from_millis(DEFAULT_PROMOTION_DELAY_MS),
            gym_id: None,
            email: None,
            password: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = env::var("GYM_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let events_url =
            env::var("GYM_EVENTS_URL").unwrap_or_else(|_| format!("{}/hikvision/events", api_url));

        let promotion_delay = match env::var("PROMOTION_DELAY_MS") {
            Ok(v) => Duration::from_millis(
                v.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("PROMOTION_DELAY_MS", v.clone()))?,
            ),
            Err(_) => Duration::from_millis(DEFAULT_PROMOTION_DELAY_MS),
        };

        let gym_id = match env::var("GYM_ID") {
            Ok(v) if !v.trim().is_empty() => Some(
                v.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("GYM_ID", v.clone()))?,
            ),
            _ => None,
        };

        Ok(Self {
            api_url,
            events_url,
            promotion_delay,
            gym_id,
            email: env::var("GYM_EMAIL").ok().filter(|v| !v.is_empty()),
            password: env::var("GYM_PASSWORD").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Email/password pair when both are configured.
    pub fn login(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(e), Some(p)) => Some((e.as_str(), p.as_str())),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
