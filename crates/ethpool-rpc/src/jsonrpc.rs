//! JSON-RPC 2.0 envelope types.
//!
//! Only the pieces the job maker needs as a *client*: building requests,
//! decoding responses, and turning an `error` member into an [`RpcError`].
//! The constructors on [`JsonRpcResponse`] and [`JsonRpcError`] also serve
//! test nodes that answer these requests.
//!
//! # Example
//!
//! ```
//! use ethpool_rpc::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
//! use serde_json::json;
//!
//! let request = JsonRpcRequest::new("eth_getWork", json!([]), 1);
//! assert_eq!(request.method, "eth_getWork");
//!
//! let response = JsonRpcResponse::success(json!(1), json!(["0xabc", "0xdef", "0x01"]));
//! assert!(response.into_result().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RpcError};

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Name of the method to invoke
    pub method: String,
    /// Positional parameters
    pub params: Value,
    /// Request identifier
    pub id: Value,
}

/// JSON-RPC 2.0 response
///
/// Nodes usually omit whichever of `result`/`error` does not apply, so both
/// default to `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Result value on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Request identifier (must match the request id)
    #[serde(default)]
    pub id: Value,
}

/// JSON-RPC 2.0 error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    /// Error code (standard codes are negative integers)
    pub code: i32,
    /// Short description of the error
    pub message: String,
    /// Additional data (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// The method does not exist / is not available
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Application-defined server error
pub const SERVER_ERROR: i32 = -32000;

impl JsonRpcRequest {
    pub fn new(method: &str, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id: Value::from(id),
        }
    }
}

impl JsonRpcError {
    /// Create a method not found error (-32601)
    pub fn method_not_found() -> Self {
        Self {
            code: METHOD_NOT_FOUND,
            message: "Method not found".into(),
            data: None,
        }
    }

    /// Create a server error (-32000)
    ///
    /// Geth answers `eth_getWork` with this code while it has no work to
    /// hand out (e.g. still syncing).
    pub fn server_error(msg: &str) -> Self {
        Self {
            code: SERVER_ERROR,
            message: msg.into(),
            data: None,
        }
    }
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Extract the result, mapping an `error` member to [`RpcError::Node`]
    /// and a missing or `null` result to [`RpcError::InvalidResponse`].
    pub fn into_result(self) -> Result<Value> {
        if let Some(error) = self.error {
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }

        match self.result {
            Some(Value::Null) | None => Err(RpcError::InvalidResponse(
                "Response missing result".to_string(),
            )),
            Some(result) => Ok(result),
        }
    }
}
