use ethpool_rpc::RpcError;
use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. All of them are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No upstreams configured")]
    NoUpstreams,

    #[error("Invalid upstream '{name}': {reason}")]
    InvalidUpstream { name: String, reason: String },
}

/// A hex quantity from a node could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("empty hex value '{0}'")]
    Empty(String),

    #[error("invalid hex digit in '{0}'")]
    InvalidDigit(String),

    #[error("hex value '{0}' overflows")]
    Overflow(String),
}

/// Why a refresh cycle was abandoned. Logged, never surfaced to readers.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("getWork on {upstream} failed: {source}")]
    Work {
        upstream: String,
        #[source]
        source: RpcError,
    },

    #[error("pending block on {upstream} failed: {source}")]
    PendingBlock {
        upstream: String,
        #[source]
        source: RpcError,
    },

    #[error("can't parse pending block number: {0}")]
    Height(#[source] HexError),

    #[error("can't parse pending block difficulty: {0}")]
    Difficulty(#[source] HexError),
}
