use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::registry::ActiveUpstream;

/// Periodic upstream health check and failover.
///
/// Each cycle probes every upstream and makes the highest-priority healthy
/// one active. There is no hysteresis: a recovered primary takes over again
/// on the first cycle that sees it healthy. If nothing is healthy the
/// primary (index 0) becomes active.
pub struct HealthChecker {
    active: Arc<ActiveUpstream>,
    interval: Duration,
}

impl HealthChecker {
    /// Creates a new health checker.
    ///
    /// # Arguments
    /// * `active` - The active upstream pointer this checker owns writes to
    /// * `interval` - Delay between the end of one check and the next
    pub fn new(active: Arc<ActiveUpstream>, interval: Duration) -> Self {
        Self { active, interval }
    }

    /// Starts the health checker task.
    pub fn spawn(self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    /// Fixed-delay loop: the next sleep only starts once a check finishes.
    async fn run(self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.check_all() => {}
            }
        }
        debug!("Health checker stopped");
    }

    /// Probe all upstreams and fail over if needed.
    ///
    /// Probes run concurrently, each cut off at its endpoint's timeout; the
    /// choice still follows registry order. Returns the index that is active
    /// afterwards.
    pub async fn check_all(&self) -> usize {
        let registry = self.active.registry();

        let probes = registry.iter().map(|upstream| async move {
            let timeout = upstream.endpoint().timeout;
            match tokio::time::timeout(timeout, upstream.check()).await {
                Ok(healthy) => healthy,
                Err(_) => {
                    debug!(upstream = %upstream.name(), "Health probe timed out");
                    false
                }
            }
        });
        let results = join_all(probes).await;

        for (upstream, healthy) in registry.iter().zip(&results) {
            if !healthy {
                debug!(upstream = %upstream.name(), "Upstream is unhealthy");
            }
        }

        let candidate = match results.iter().position(|&healthy| healthy) {
            Some(index) => index,
            None => {
                warn!("No healthy upstreams, falling back to primary");
                0
            }
        };

        if self.active.index() != candidate && self.active.switch_to(candidate) {
            if let Some(upstream) = registry.resolve(candidate) {
                warn!("Switching to {} upstream", upstream.name());
            }
        }

        candidate
    }
}
