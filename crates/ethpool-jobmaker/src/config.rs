//! Job maker configuration.
//!
//! Loaded once at startup from a JSON document and then passed by reference
//! to constructors. Example:
//!
//! ```json
//! {
//!   "threads": 2,
//!   "blockRefreshInterval": "120ms",
//!   "upstreamCheckInterval": "5s",
//!   "upstream": [
//!     { "name": "main", "url": "http://127.0.0.1:8545", "timeout": "10s" },
//!     { "name": "backup", "url": "http://127.0.0.2:8545", "timeout": "10s" }
//!   ]
//! }
//! ```
//!
//! Durations use the friendly format (`"500ms"`, `"2s"`, `"1m30s"`) and
//! must be positive.

use std::path::Path;
use std::time::Duration;

use ethpool_rpc::NodeEndpoint;
use jiff::SignedDuration;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "jobmaker.cfg";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Worker thread hint; values <= 0 keep the runtime default
    #[serde(default)]
    pub threads: i64,

    /// Delay between the end of one refresh and the start of the next
    #[serde(deserialize_with = "deserialize_duration")]
    pub block_refresh_interval: Duration,

    /// Delay between the end of one health check and the start of the next
    #[serde(deserialize_with = "deserialize_duration")]
    pub upstream_check_interval: Duration,

    /// Upstream nodes in priority order; the first one is the primary
    pub upstream: Vec<UpstreamConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub name: String,
    pub url: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Config {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        contents.parse()
    }

    /// Runtime worker count requested by `threads`, if any.
    pub fn worker_threads(&self) -> Option<usize> {
        usize::try_from(self.threads).ok().filter(|&n| n > 0)
    }

    /// Endpoints for every upstream, in priority order.
    pub fn endpoints(&self) -> Result<Vec<NodeEndpoint>, ConfigError> {
        self.upstream.iter().map(UpstreamConfig::endpoint).collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.is_empty() {
            return Err(ConfigError::NoUpstreams);
        }
        self.endpoints().map(|_| ())
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl UpstreamConfig {
    pub fn endpoint(&self) -> Result<NodeEndpoint, ConfigError> {
        NodeEndpoint::new(self.name.clone(), self.url.clone(), self.timeout).map_err(|e| {
            ConfigError::InvalidUpstream {
                name: self.name.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Parse a strictly positive duration such as `"120ms"` or `"1m30s"`.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let parsed: SignedDuration = value
        .parse()
        .map_err(|e| format!("invalid duration '{}': {}", value, e))?;

    if parsed.is_zero() || parsed.is_negative() {
        return Err(format!("duration '{}' must be positive", value));
    }

    Duration::try_from(parsed).map_err(|e| format!("invalid duration '{}': {}", value, e))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_duration(&value).map_err(serde::de::Error::custom)
}
