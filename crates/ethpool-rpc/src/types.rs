//! Reply payloads returned by upstream nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RpcError};

/// Current work package from `eth_getWork`.
///
/// All three values are hex strings exactly as the node sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Work {
    /// Header hash (without nonce) identifying the job
    pub header: String,
    /// Seed hash for the DAG
    pub seed: String,
    /// Boundary condition (target) the solution must meet
    pub target: String,
}

impl Work {
    pub fn new(header: impl Into<String>, seed: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            seed: seed.into(),
            target: target.into(),
        }
    }

    /// Decode from a JSON-RPC result.
    ///
    /// The result must be an array whose first three elements are strings.
    /// Newer nodes append the block number as a fourth element; anything
    /// past the third is ignored.
    pub fn from_result(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(RpcError::InvalidResponse(format!(
                    "Expected work array, got {}",
                    other
                )))
            }
        };

        if items.len() < 3 {
            return Err(RpcError::InvalidResponse(format!(
                "Expected at least 3 work items, got {}",
                items.len()
            )));
        }

        let mut strings = Vec::with_capacity(3);
        for item in items.into_iter().take(3) {
            match item {
                Value::String(s) => strings.push(s),
                other => {
                    return Err(RpcError::InvalidResponse(format!(
                        "Work item is not a string: {}",
                        other
                    )))
                }
            }
        }

        let [header, seed, target]: [String; 3] = strings
            .try_into()
            .map_err(|_| RpcError::InvalidResponse("Truncated work".to_string()))?;

        Ok(Self { header, seed, target })
    }
}

/// The subset of `eth_getBlockByNumber("pending")` the job maker uses.
///
/// Both fields are hex-encoded quantities and are decoded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBlock {
    pub number: String,
    pub difficulty: String,
}

impl PendingBlock {
    pub fn new(number: impl Into<String>, difficulty: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            difficulty: difficulty.into(),
        }
    }

    /// Decode from a JSON-RPC result, ignoring every other block field.
    pub fn from_result(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| RpcError::InvalidResponse(format!("Malformed pending block: {}", e)))
    }
}
