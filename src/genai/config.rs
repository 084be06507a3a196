//! Generation configuration parsed from environment variables.

use super::types::GenError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";
pub const DEFAULT_GEN_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_GEN_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 60;

// =============================================================================
// POLL POLICY
// =============================================================================

/// Delay shape between poll attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same interval every attempt.
    Fixed,
    /// Interval grows linearly with the attempt number.
    Linear,
}

/// Bounds for the poll driver: no unbounded fixed-sleep loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval_ms: u64,
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval_ms: DEFAULT_POLL_INTERVAL_MS, max_attempts: DEFAULT_POLL_MAX_ATTEMPTS, backoff: Backoff::Fixed }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub video_model: String,
    pub timeouts: GenTimeouts,
    pub poll: PollPolicy,
}

impl GenConfig {
    /// Build typed generation config from environment variables.
    ///
    /// Required:
    /// - `GEN_API_KEY_ENV` (names the env var containing the key)
    ///
    /// Optional:
    /// - `GEN_BASE_URL`: provider API base URL
    /// - `GEN_TEXT_MODEL` / `GEN_IMAGE_MODEL` / `GEN_VIDEO_MODEL`
    /// - `GEN_REQUEST_TIMEOUT_SECS`: default 120
    /// - `GEN_CONNECT_TIMEOUT_SECS`: default 10
    /// - `GEN_POLL_INTERVAL_MS`: default 10000
    /// - `GEN_POLL_MAX_ATTEMPTS`: default 60
    /// - `GEN_POLL_BACKOFF`: `fixed` (default) or `linear`
    ///
    /// # Errors
    ///
    /// Returns a [`GenError`] when the API key is absent or a value fails to
    /// parse.
    pub fn from_env() -> Result<Self, GenError> {
        let key_var =
            std::env::var("GEN_API_KEY_ENV").map_err(|_| GenError::MissingApiKey { var: "GEN_API_KEY_ENV".into() })?;
        let api_key = std::env::var(&key_var).map_err(|_| GenError::MissingApiKey { var: key_var.clone() })?;

        let base_url = std::env::var("GEN_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeouts = GenTimeouts {
            request_secs: env_parse("GEN_REQUEST_TIMEOUT_SECS", DEFAULT_GEN_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("GEN_CONNECT_TIMEOUT_SECS", DEFAULT_GEN_CONNECT_TIMEOUT_SECS),
        };
        let poll = PollPolicy {
            interval_ms: env_parse("GEN_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS),
            max_attempts: env_parse("GEN_POLL_MAX_ATTEMPTS", DEFAULT_POLL_MAX_ATTEMPTS),
            backoff: parse_backoff(std::env::var("GEN_POLL_BACKOFF").ok().as_deref())?,
        };

        Ok(Self {
            api_key,
            base_url,
            text_model: std::env::var("GEN_TEXT_MODEL").unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string()),
            image_model: std::env::var("GEN_IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            video_model: std::env::var("GEN_VIDEO_MODEL").unwrap_or_else(|_| DEFAULT_VIDEO_MODEL.to_string()),
            timeouts,
            poll,
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_backoff(raw: Option<&str>) -> Result<Backoff, GenError> {
    match raw.unwrap_or("fixed") {
        "fixed" => Ok(Backoff::Fixed),
        "linear" => Ok(Backoff::Linear),
        other => Err(GenError::ConfigParse(format!(
            "unsupported GEN_POLL_BACKOFF '{other}' (expected 'fixed' or 'linear')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
