use async_trait::async_trait;

use crate::endpoint::NodeEndpoint;
use crate::error::Result;
use crate::types::{PendingBlock, Work};

/// A remote blockchain node the job maker can pull work from.
///
/// Implementations differ by transport; the job maker only ever talks to
/// nodes through this trait, usually as `Arc<dyn NodeClient>`.
///
/// Every call must respect [`NodeEndpoint::timeout`].
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Identity of the node behind this client.
    fn endpoint(&self) -> &NodeEndpoint;

    /// Shorthand for `endpoint().name`.
    fn name(&self) -> &str {
        &self.endpoint().name
    }

    /// Lightweight liveness probe.
    ///
    /// Never fails: any transport problem or timeout reports `false`.
    async fn check(&self) -> bool;

    /// Fetch the current work package.
    async fn get_work(&self) -> Result<Work>;

    /// Fetch the pending block's height and difficulty.
    async fn get_pending_block(&self) -> Result<PendingBlock>;
}
