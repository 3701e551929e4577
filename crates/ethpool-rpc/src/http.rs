//! JSON-RPC 2.0 over HTTP.
//!
//! [`HttpNodeClient`] POSTs one JSON-RPC request per call to the endpoint
//! URL and decodes the reply. Connections are pooled by the underlying
//! hyper client; each call is bounded by the endpoint timeout, covering
//! connect, send and reading the whole body.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::client::NodeClient;
use crate::endpoint::NodeEndpoint;
use crate::error::{Result, RpcError};
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::types::{PendingBlock, Work};

const GET_WORK: &str = "eth_getWork";
const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";

/// Node client speaking JSON-RPC over plain HTTP.
pub struct HttpNodeClient {
    endpoint: NodeEndpoint,
    client: Client<HttpConnector, Full<Bytes>>,
    next_id: AtomicU64,
}

impl HttpNodeClient {
    pub fn new(endpoint: NodeEndpoint) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();

        Self {
            endpoint,
            client,
            next_id: AtomicU64::new(1),
        }
    }

    /// Call a JSON-RPC method and return its `result` member.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, id);
        let body = serde_json::to_vec(&request)?;

        let http_request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| RpcError::Transport(format!("Failed to build request: {}", e)))?;

        trace!(upstream = %self.endpoint.name, method, id, "Sending request");

        let exchange = async {
            let response = self
                .client
                .request(http_request)
                .await
                .map_err(|e| RpcError::Transport(format!("HTTP request failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(RpcError::HttpStatus(status.as_u16()));
            }

            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| RpcError::Transport(format!("Failed to read response: {}", e)))?
                .to_bytes();

            let reply: JsonRpcResponse = serde_json::from_slice(&body)?;
            reply.into_result()
        };

        tokio::time::timeout(self.endpoint.timeout, exchange)
            .await
            .map_err(|_| RpcError::Timeout(self.endpoint.timeout_ms()))?
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    fn endpoint(&self) -> &NodeEndpoint {
        &self.endpoint
    }

    /// Probes with `eth_getWork`: a node that cannot hand out work is not a
    /// usable upstream, even if it answers other calls.
    async fn check(&self) -> bool {
        match self.get_work().await {
            Ok(_) => true,
            Err(e) => {
                debug!(upstream = %self.endpoint.name, error = %e, "Health probe failed");
                false
            }
        }
    }

    async fn get_work(&self) -> Result<Work> {
        let result = self.call(GET_WORK, json!([])).await?;
        Work::from_result(result)
    }

    async fn get_pending_block(&self) -> Result<PendingBlock> {
        let result = self.call(GET_BLOCK_BY_NUMBER, json!(["pending", false])).await?;
        PendingBlock::from_result(result)
    }
}
