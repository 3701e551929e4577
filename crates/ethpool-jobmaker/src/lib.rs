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

//! # ethpool job maker
//!
//! Keeps a fresh block template available to the pool while talking to a
//! prioritized list of redundant upstream nodes.
//!
//! # Architecture
//!
//! ```text
//!            HealthChecker ──writes──► ActiveUpstream ◄──reads── JobRefresher
//!                 │                         │                      │
//!                 └──probes──► UpstreamRegistry ◄──calls───────────┘
//!                                                                  │
//!   readers ──current_template()──► PublishedTemplate ◄──publishes─┘
//! ```
//!
//! - [`registry`] - The ordered upstream list and the active index
//! - [`health_checker`] - Periodic probes and failover to the
//!   highest-priority healthy upstream
//! - [`refresher`] - Periodic template refresh, deduplicated by header
//! - [`template`] - [`BlockTemplate`] and its lock-free publication slot
//! - [`job_maker`] - The [`JobMaker`] facade and its task handle
//! - [`config`] - JSON configuration
//! - [`hex`] - Hex quantity decoding
//!
//! # Example
//!
//! ```no_run
//! use ethpool_jobmaker::{Config, JobMaker};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("jobmaker.cfg".as_ref())?;
//! let job_maker = JobMaker::new(&config).await?;
//! let handle = job_maker.start().ok_or("already started")?;
//!
//! if let Some(template) = job_maker.current_template() {
//!     println!("height {} header {}", template.height, template.header);
//! }
//!
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod health_checker;
pub mod hex;
pub mod job_maker;
pub mod refresher;
pub mod registry;
pub mod template;

#[cfg(test)]
mod mock;

pub use config::{Config, UpstreamConfig, DEFAULT_CONFIG_FILE};
pub use error::{ConfigError, HexError, RefreshError};
pub use health_checker::HealthChecker;
pub use job_maker::{JobMaker, JobMakerHandle};
pub use refresher::{JobRefresher, RefreshOutcome};
pub use registry::{ActiveUpstream, UpstreamRegistry};
pub use template::{BlockTemplate, PublishedTemplate};
