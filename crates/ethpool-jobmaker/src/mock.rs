//! Scriptable in-memory node for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ethpool_rpc::{NodeClient, NodeEndpoint, PendingBlock, Result, RpcError, Work};

type Hook = Box<dyn Fn() + Send + Sync>;

pub struct MockNode {
    endpoint: NodeEndpoint,
    healthy: AtomicBool,
    check_delay: Mutex<Duration>,
    work_delay: Mutex<Duration>,
    on_work: Mutex<Option<Hook>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    work: Mutex<Option<Work>>,
    pending: Mutex<Option<PendingBlock>>,
    checks: AtomicUsize,
    work_calls: AtomicUsize,
    pending_calls: AtomicUsize,
}

impl MockNode {
    pub fn new(name: &str, healthy: bool) -> Arc<Self> {
        let endpoint = NodeEndpoint::new(
            name,
            format!("http://{}.test:8545", name),
            Duration::from_millis(100),
        )
        .unwrap();

        Arc::new(Self {
            endpoint,
            healthy: AtomicBool::new(healthy),
            check_delay: Mutex::new(Duration::ZERO),
            work_delay: Mutex::new(Duration::ZERO),
            on_work: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            work: Mutex::new(None),
            pending: Mutex::new(None),
            checks: AtomicUsize::new(0),
            work_calls: AtomicUsize::new(0),
            pending_calls: AtomicUsize::new(0),
        })
    }

    pub fn healthy(name: &str) -> Arc<Self> {
        Self::new(name, true)
    }

    pub fn unhealthy(name: &str) -> Arc<Self> {
        Self::new(name, false)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Make `check()` take this long before answering.
    pub fn set_check_delay(&self, delay: Duration) {
        *self.check_delay.lock().unwrap() = delay;
    }

    /// Make `get_work()` take this long before answering.
    pub fn set_work_delay(&self, delay: Duration) {
        *self.work_delay.lock().unwrap() = delay;
    }

    /// Run `hook` inside every `get_work()` call, before it answers.
    pub fn on_work(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_work.lock().unwrap() = Some(Box::new(hook));
    }

    /// Serve this work; `None` makes `get_work` fail.
    pub fn set_work(&self, work: Option<Work>) {
        *self.work.lock().unwrap() = work;
    }

    /// Serve this pending block; `None` makes `get_pending_block` fail.
    pub fn set_pending(&self, pending: Option<PendingBlock>) {
        *self.pending.lock().unwrap() = pending;
    }

    /// Serve a job in one go.
    pub fn serve(&self, header: &str, number: &str, difficulty: &str) {
        self.set_work(Some(Work::new(header, "0xseed", "0xtarget")));
        self.set_pending(Some(PendingBlock::new(number, difficulty)));
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn work_calls(&self) -> usize {
        self.work_calls.load(Ordering::SeqCst)
    }

    pub fn pending_calls(&self) -> usize {
        self.pending_calls.load(Ordering::SeqCst)
    }

    /// Most `get_work()` calls ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeClient for MockNode {
    fn endpoint(&self) -> &NodeEndpoint {
        &self.endpoint
    }

    async fn check(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let delay = *self.check_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.healthy.load(Ordering::SeqCst)
    }

    async fn get_work(&self) -> Result<Work> {
        self.work_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *self.work_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(hook) = self.on_work.lock().unwrap().as_ref() {
            hook();
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let work = self.work.lock().unwrap().clone();
        work.ok_or_else(|| RpcError::Transport("connection refused".to_string()))
    }

    async fn get_pending_block(&self) -> Result<PendingBlock> {
        self.pending_calls.fetch_add(1, Ordering::SeqCst);
        let pending = self.pending.lock().unwrap().clone();
        pending.ok_or_else(|| RpcError::Timeout(100))
    }
}
