//! Upstream registry and the active upstream pointer.
//!
//! The registry is the fixed, ordered list of node clients built at startup;
//! an upstream's priority is its position, index 0 being the primary.
//! [`ActiveUpstream`] adds the single shared index naming the upstream the
//! refresher should use. Only the health checker moves it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ethpool_rpc::{HttpNodeClient, NodeClient};

use crate::config::UpstreamConfig;
use crate::error::ConfigError;

/// Ordered, fixed set of upstream node clients.
pub struct UpstreamRegistry {
    upstreams: Vec<Arc<dyn NodeClient>>,
}

impl UpstreamRegistry {
    /// Create a registry from clients in priority order.
    ///
    /// Fails if the list is empty, since there would be no primary.
    pub fn new(upstreams: Vec<Arc<dyn NodeClient>>) -> Result<Self, ConfigError> {
        if upstreams.is_empty() {
            return Err(ConfigError::NoUpstreams);
        }
        Ok(Self { upstreams })
    }

    /// Build an HTTP client for every configured upstream.
    pub fn from_config(upstreams: &[UpstreamConfig]) -> Result<Self, ConfigError> {
        let clients = upstreams
            .iter()
            .map(|upstream| -> Result<Arc<dyn NodeClient>, ConfigError> {
                Ok(Arc::new(HttpNodeClient::new(upstream.endpoint()?)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(clients)
    }

    pub fn resolve(&self, index: usize) -> Option<&Arc<dyn NodeClient>> {
        self.upstreams.get(index)
    }

    pub fn len(&self) -> usize {
        self.upstreams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upstreams.is_empty()
    }

    /// Upstreams in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn NodeClient>> {
        self.upstreams.iter()
    }
}

/// The currently preferred upstream.
///
/// Holds a registry index that is valid by construction: it starts at 0
/// (registries are never empty) and [`switch_to`](Self::switch_to) refuses
/// out-of-range values.
pub struct ActiveUpstream {
    registry: Arc<UpstreamRegistry>,
    index: AtomicUsize,
}

impl ActiveUpstream {
    pub fn new(registry: Arc<UpstreamRegistry>) -> Self {
        Self {
            registry,
            index: AtomicUsize::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<UpstreamRegistry> {
        &self.registry
    }

    pub fn index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    /// Resolve the active upstream, returning its index alongside.
    pub fn current(&self) -> (usize, Arc<dyn NodeClient>) {
        let index = self.index();
        // index < len is upheld by `new` and `switch_to`
        (index, self.registry.upstreams[index].clone())
    }

    pub fn client(&self) -> Arc<dyn NodeClient> {
        self.current().1
    }

    /// Make `index` the active upstream. Returns false, leaving the index
    /// unchanged, if it is out of range.
    pub(crate) fn switch_to(&self, index: usize) -> bool {
        if index >= self.registry.len() {
            return false;
        }
        self.index.store(index, Ordering::Release);
        true
    }
}
