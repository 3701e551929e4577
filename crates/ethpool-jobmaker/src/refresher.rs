use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::error::RefreshError;
use crate::hex;
use crate::registry::ActiveUpstream;
use crate::template::{BlockTemplate, PublishedTemplate};

/// Result of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new template was published.
    Published(Arc<BlockTemplate>),
    /// The node still serves the published header; nothing was fetched
    /// beyond the work package.
    Unchanged,
    /// The cycle was abandoned; the published template was left as is.
    Failed,
}

/// Periodic block template refresh from the active upstream.
///
/// Sole writer of the [`PublishedTemplate`].
pub struct JobRefresher {
    active: Arc<ActiveUpstream>,
    published: Arc<PublishedTemplate>,
    interval: Duration,
}

impl JobRefresher {
    pub fn new(
        active: Arc<ActiveUpstream>,
        published: Arc<PublishedTemplate>,
        interval: Duration,
    ) -> Self {
        Self {
            active,
            published,
            interval,
        }
    }

    /// Starts the refresh task.
    pub fn spawn(self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    /// Fixed-delay loop: a slow node delays the next refresh rather than
    /// stacking refreshes on top of each other.
    async fn run(self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.refresh_once() => {}
            }
        }
        debug!("Block refresher stopped");
    }

    /// Run one refresh cycle, logging any failure.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        match self.try_refresh().await {
            Ok(Some(template)) => RefreshOutcome::Published(template),
            Ok(None) => RefreshOutcome::Unchanged,
            Err(e) => {
                error!("Error while refreshing block template: {}", e);
                RefreshOutcome::Failed
            }
        }
    }

    /// Run one refresh cycle.
    ///
    /// The active upstream is resolved separately for each of the two calls,
    /// so a failover in between makes the template mix data from two nodes.
    /// That case is logged but not prevented.
    pub async fn try_refresh(&self) -> Result<Option<Arc<BlockTemplate>>, RefreshError> {
        let (work_index, upstream) = self.active.current();
        let work = upstream
            .get_work()
            .await
            .map_err(|source| RefreshError::Work {
                upstream: upstream.name().to_string(),
                source,
            })?;

        // No need to update, we have fresh job
        if self.published.header().as_deref() == Some(work.header.as_str()) {
            trace!(upstream = %upstream.name(), header = %work.header, "Job unchanged");
            return Ok(None);
        }

        let (pending_index, pending_upstream) = self.active.current();
        if pending_index != work_index {
            warn!(
                work_upstream = %upstream.name(),
                pending_upstream = %pending_upstream.name(),
                "Upstream switched during refresh, template combines two nodes"
            );
        }

        let pending = pending_upstream
            .get_pending_block()
            .await
            .map_err(|source| RefreshError::PendingBlock {
                upstream: pending_upstream.name().to_string(),
                source,
            })?;

        let height = hex::parse_u64(&pending.number).map_err(RefreshError::Height)?;
        let difficulty = hex::parse_u256(&pending.difficulty).map_err(RefreshError::Difficulty)?;

        let template = self.published.publish(BlockTemplate {
            header: work.header,
            seed: work.seed,
            target: work.target,
            height,
            difficulty,
        });

        info!(
            "New block to mine on {} at height {} / {}",
            upstream.name(),
            height,
            template.header
        );

        Ok(Some(template))
    }
}
