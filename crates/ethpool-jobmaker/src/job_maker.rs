use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ethpool_rpc::NodeEndpoint;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ConfigError;
use crate::health_checker::HealthChecker;
use crate::refresher::JobRefresher;
use crate::registry::{ActiveUpstream, UpstreamRegistry};
use crate::template::{BlockTemplate, PublishedTemplate};

/// Job maker facade.
///
/// Owns the upstream registry, the active upstream pointer and the published
/// template. Construction performs one refresh against the primary so a
/// template is usually available before [`start`](Self::start) launches the
/// background loops.
///
/// Readers call [`current_template`](Self::current_template) from any task;
/// it never blocks and always returns a complete template.
pub struct JobMaker {
    active: Arc<ActiveUpstream>,
    published: Arc<PublishedTemplate>,
    refresh_interval: Duration,
    check_interval: Duration,
    started: AtomicBool,
}

impl JobMaker {
    /// Build the job maker from a validated config.
    pub async fn new(config: &Config) -> Result<Self, ConfigError> {
        let registry = UpstreamRegistry::from_config(&config.upstream)?;
        Ok(Self::with_registry(
            registry,
            config.block_refresh_interval,
            config.upstream_check_interval,
        )
        .await)
    }

    /// Build the job maker over an existing registry.
    pub async fn with_registry(
        registry: UpstreamRegistry,
        refresh_interval: Duration,
        check_interval: Duration,
    ) -> Self {
        for upstream in registry.iter() {
            info!("Upstream: {} => {}", upstream.name(), upstream.endpoint().url);
        }

        let active = Arc::new(ActiveUpstream::new(Arc::new(registry)));
        let primary = active.client();
        info!(
            "Default upstream: {} => {}",
            primary.name(),
            primary.endpoint().url
        );

        let job_maker = Self {
            active,
            published: Arc::new(PublishedTemplate::new()),
            refresh_interval,
            check_interval,
            started: AtomicBool::new(false),
        };

        // A failure here is logged; the loop will retry
        job_maker.refresher().refresh_once().await;
        job_maker
    }

    /// Launch the health check and refresh loops.
    ///
    /// Only the first call starts anything; later calls return `None` so the
    /// published template keeps a single writer.
    pub fn start(&self) -> Option<JobMakerHandle> {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!("Job maker already started");
            return None;
        }

        info!("Set block refresh every {:?}", self.refresh_interval);
        info!("Set upstream check interval every {:?}", self.check_interval);

        let shutdown = CancellationToken::new();
        let health_checker =
            HealthChecker::new(self.active.clone(), self.check_interval).spawn(shutdown.clone());
        let refresher = self.refresher().spawn(shutdown.clone());

        Some(JobMakerHandle {
            shutdown,
            health_checker,
            refresher,
        })
    }

    /// Latest published template, or `None` if no refresh has succeeded yet.
    pub fn current_template(&self) -> Option<Arc<BlockTemplate>> {
        self.published.load()
    }

    /// Registry index of the active upstream.
    pub fn active_index(&self) -> usize {
        self.active.index()
    }

    pub fn active_endpoint(&self) -> NodeEndpoint {
        self.active.client().endpoint().clone()
    }

    pub fn upstream_count(&self) -> usize {
        self.active.registry().len()
    }

    fn refresher(&self) -> JobRefresher {
        JobRefresher::new(
            self.active.clone(),
            self.published.clone(),
            self.refresh_interval,
        )
    }
}

/// Handle to the running background loops.
pub struct JobMakerHandle {
    shutdown: CancellationToken,
    health_checker: JoinHandle<()>,
    refresher: JoinHandle<()>,
}

impl JobMakerHandle {
    /// Token cancelled by [`shutdown`](Self::shutdown); clones can be handed
    /// to other tasks that should stop with the job maker.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop both loops and wait for them to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let (health, refresh) = tokio::join!(self.health_checker, self.refresher);
        if let Err(e) = health {
            error!("Health checker task failed: {}", e);
        }
        if let Err(e) = refresh {
            error!("Block refresher task failed: {}", e);
        }
        info!("Job maker stopped");
    }
}
