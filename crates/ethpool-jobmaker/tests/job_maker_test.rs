//! Job Maker Integration Tests
//!
//! Runs the job maker against small JSON-RPC nodes on loopback ports and
//! verifies that:
//! - The first template is available right after construction
//! - The refresher only fetches the pending block when the header changes
//! - Failover follows node health and returns to the primary on recovery

use alloy_primitives::U256;
use ethpool_jobmaker::{Config, ConfigError, JobMaker};
use ethpool_rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// What a test node currently serves
#[derive(Debug, Clone)]
struct NodeState {
    healthy: bool,
    header: String,
    number: String,
    difficulty: String,
}

impl NodeState {
    fn new(header: &str, number: &str, difficulty: &str) -> Self {
        Self {
            healthy: true,
            header: header.to_string(),
            number: number.to_string(),
            difficulty: difficulty.to_string(),
        }
    }
}

/// Minimal geth-like node with scriptable state
struct TestNode {
    addr: String,
    state: Arc<Mutex<NodeState>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestNode {
    async fn new(state: NodeState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let state = Arc::new(Mutex::new(state));
        let calls = Arc::new(Mutex::new(HashMap::new()));
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();

        let server_state = state.clone();
        let server_calls = calls.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        let Ok((stream, _)) = result else { continue };
                        let io = TokioIo::new(stream);
                        let state = server_state.clone();
                        let calls = server_calls.clone();

                        tokio::spawn(async move {
                            let service = service_fn(move |req: Request<Incoming>| {
                                let state = state.clone();
                                let calls = calls.clone();
                                async move {
                                    let body = req.into_body().collect().await?.to_bytes();
                                    let rpc: JsonRpcRequest = serde_json::from_slice(&body).unwrap();
                                    *calls.lock().unwrap().entry(rpc.method.clone()).or_insert(0) += 1;

                                    let response = answer(&rpc, &state.lock().unwrap());
                                    Ok::<_, hyper::Error>(
                                        Response::builder()
                                            .header("Content-Type", "application/json")
                                            .body(Full::new(Bytes::from(
                                                serde_json::to_vec(&response).unwrap(),
                                            )))
                                            .unwrap(),
                                    )
                                }
                            });

                            let _ = http1::Builder::new().serve_connection(io, service).await;
                        });
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Self {
            addr,
            state,
            calls,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn set_healthy(&self, healthy: bool) {
        self.state.lock().unwrap().healthy = healthy;
    }

    fn serve(&self, header: &str, number: &str, difficulty: &str) {
        let mut state = self.state.lock().unwrap();
        state.header = header.to_string();
        state.number = number.to_string();
        state.difficulty = difficulty.to_string();
    }

    fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn answer(req: &JsonRpcRequest, state: &NodeState) -> JsonRpcResponse {
    if !state.healthy {
        return JsonRpcResponse::error(req.id.clone(), JsonRpcError::server_error("node is syncing"));
    }

    match req.method.as_str() {
        "eth_getWork" => JsonRpcResponse::success(
            req.id.clone(),
            json!([state.header, "0x5eed", "0x0000ffff"]),
        ),
        "eth_getBlockByNumber" => JsonRpcResponse::success(
            req.id.clone(),
            json!({"number": state.number, "difficulty": state.difficulty}),
        ),
        _ => JsonRpcResponse::error(req.id.clone(), JsonRpcError::method_not_found()),
    }
}

fn config(nodes: &[(&str, &TestNode)], refresh: &str, check: &str) -> Config {
    let upstream: Vec<_> = nodes
        .iter()
        .map(|(name, node)| json!({"name": name, "url": node.url(), "timeout": "500ms"}))
        .collect();

    json!({
        "threads": 2,
        "blockRefreshInterval": refresh,
        "upstreamCheckInterval": check,
        "upstream": upstream,
    })
    .to_string()
    .parse()
    .unwrap()
}

/// Poll `condition` every 10ms until it holds or `limit` passes
async fn wait_for(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

#[tokio::test]
async fn test_template_available_after_construction() {
    let main = TestNode::new(NodeState::new("0xabc", "0x64", "0x3e8")).await;
    let cfg = config(&[("main", &main)], "1m", "1m");

    let job_maker = JobMaker::new(&cfg).await.unwrap();

    let template = job_maker.current_template().unwrap();
    assert_eq!(template.header, "0xabc");
    assert_eq!(template.seed, "0x5eed");
    assert_eq!(template.target, "0x0000ffff");
    assert_eq!(template.height, 100);
    assert_eq!(template.difficulty, U256::from(1000));
}

#[tokio::test]
async fn test_unreachable_primary_is_not_fatal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let cfg: Config = json!({
        "blockRefreshInterval": "1m",
        "upstreamCheckInterval": "1m",
        "upstream": [{"name": "main", "url": format!("http://{}", addr), "timeout": "200ms"}],
    })
    .to_string()
    .parse()
    .unwrap();

    let job_maker = JobMaker::new(&cfg).await.unwrap();
    assert!(job_maker.current_template().is_none());
    assert_eq!(job_maker.active_endpoint().name, "main");
}

#[tokio::test]
async fn test_invalid_upstream_url_rejected() {
    let result: Result<Config, _> = json!({
        "blockRefreshInterval": "1s",
        "upstreamCheckInterval": "1s",
        "upstream": [{"name": "main", "url": "127.0.0.1:8545", "timeout": "1s"}],
    })
    .to_string()
    .parse();

    assert!(matches!(result, Err(ConfigError::InvalidUpstream { .. })));
}

#[tokio::test]
async fn test_refresh_dedups_by_header() {
    let main = TestNode::new(NodeState::new("0xabc", "0x64", "0x3e8")).await;
    let cfg = config(&[("main", &main)], "20ms", "1m");

    let job_maker = JobMaker::new(&cfg).await.unwrap();
    let handle = job_maker.start().unwrap();

    assert!(wait_for(Duration::from_secs(2), || main.calls("eth_getWork") >= 5).await);
    // Only the construction-time refresh saw a new header
    assert_eq!(main.calls("eth_getBlockByNumber"), 1);

    main.serve("0xdef", "0x65", "0x3e9");
    assert!(
        wait_for(Duration::from_secs(2), || {
            job_maker.current_template().unwrap().header == "0xdef"
        })
        .await
    );
    let template = job_maker.current_template().unwrap();
    assert_eq!(template.height, 101);
    assert_eq!(template.difficulty, U256::from(1001));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_failover_and_recovery() {
    let a = TestNode::new(NodeState::new("0xaaa", "0x1", "0x1")).await;
    let b = TestNode::new(NodeState::new("0xbbb", "0x2", "0x2")).await;
    let c = TestNode::new(NodeState::new("0xccc", "0x3", "0x3")).await;
    a.set_healthy(false);

    let cfg = config(&[("a", &a), ("b", &b), ("c", &c)], "20ms", "50ms");
    let job_maker = JobMaker::new(&cfg).await.unwrap();
    // Startup always begins on the primary
    assert_eq!(job_maker.active_index(), 0);
    assert!(job_maker.current_template().is_none());

    let handle = job_maker.start().unwrap();

    assert!(wait_for(Duration::from_secs(2), || job_maker.active_index() == 1).await);
    assert!(
        wait_for(Duration::from_secs(2), || {
            job_maker
                .current_template()
                .is_some_and(|t| t.header == "0xbbb")
        })
        .await
    );
    assert_eq!(job_maker.active_endpoint().name, "b");

    // B fails too, C takes over
    b.set_healthy(false);
    assert!(wait_for(Duration::from_secs(2), || job_maker.active_index() == 2).await);

    // Primary recovers and takes over again
    a.set_healthy(true);
    assert!(wait_for(Duration::from_secs(2), || job_maker.active_index() == 0).await);
    assert!(
        wait_for(Duration::from_secs(2), || {
            job_maker
                .current_template()
                .is_some_and(|t| t.header == "0xaaa")
        })
        .await
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn test_all_unhealthy_falls_back_to_primary() {
    let a = TestNode::new(NodeState::new("0xaaa", "0x1", "0x1")).await;
    let b = TestNode::new(NodeState::new("0xbbb", "0x2", "0x2")).await;
    a.set_healthy(false);

    let cfg = config(&[("a", &a), ("b", &b)], "1m", "50ms");
    let job_maker = JobMaker::new(&cfg).await.unwrap();
    let handle = job_maker.start().unwrap();

    assert!(wait_for(Duration::from_secs(2), || job_maker.active_index() == 1).await);

    b.set_healthy(false);
    assert!(wait_for(Duration::from_secs(2), || job_maker.active_index() == 0).await);

    handle.shutdown().await;
}
