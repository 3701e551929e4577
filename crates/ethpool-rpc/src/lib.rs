// Copyright 2025 ethpool Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # ethpool RPC
//!
//! Node client layer for the ethpool job maker.
//!
//! A *node client* is the job maker's view of one upstream blockchain node.
//! It answers three questions:
//!
//! - **Is it alive?** [`NodeClient::check`], a cheap liveness probe
//! - **What is the current work?** [`NodeClient::get_work`], the
//!   `(header, seed, target)` triple
//! - **What is pending?** [`NodeClient::get_pending_block`], the hex-encoded
//!   height and difficulty of the block being built
//!
//! # Components
//!
//! - [`client`] - The [`NodeClient`] trait shared by every transport
//! - [`endpoint`] - [`NodeEndpoint`], the immutable identity of an upstream
//! - [`http`] - [`HttpNodeClient`], JSON-RPC 2.0 over HTTP POST
//! - [`jsonrpc`] - JSON-RPC 2.0 envelope types
//! - [`types`] - Reply payloads ([`Work`], [`PendingBlock`])
//! - [`error`] - [`RpcError`] and the crate [`Result`] alias
//!
//! # Example
//!
//! ```no_run
//! use ethpool_rpc::{HttpNodeClient, NodeClient, NodeEndpoint};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> ethpool_rpc::Result<()> {
//! let endpoint = NodeEndpoint::new("main", "http://127.0.0.1:8545", Duration::from_secs(2))?;
//! let client = HttpNodeClient::new(endpoint);
//!
//! if client.check().await {
//!     let work = client.get_work().await?;
//!     println!("header: {}", work.header);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod jsonrpc;
pub mod types;

pub use client::NodeClient;
pub use endpoint::NodeEndpoint;
pub use error::{Result, RpcError};
pub use http::HttpNodeClient;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use types::{PendingBlock, Work};
