//! Client configuration.
//!
//! Loaded from JSON (host applications going through the C ABI) or from
//! `REST_CLIENT_*` environment variables. Unset fields take the defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_TIMEOUT_MS: &str = "REST_CLIENT_TIMEOUT_MS";
pub const ENV_MAX_REDIRECTS: &str = "REST_CLIENT_MAX_REDIRECTS";
pub const ENV_USER_AGENT: &str = "REST_CLIENT_USER_AGENT";

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_REDIRECTS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Whole-call timeout in milliseconds. `None` disables it.
    pub timeout_ms: Option<u64>,
    pub max_redirects: u32,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms: u64 = parse_value(ENV_TIMEOUT_MS, &raw)?;
            config.timeout_ms = (ms > 0).then_some(ms);
        }
        if let Some(raw) = lookup(ENV_MAX_REDIRECTS) {
            config.max_redirects = parse_value(ENV_MAX_REDIRECTS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_USER_AGENT) {
            let trimmed = raw.trim();
            config.user_agent = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
