//! Block templates and their publication.
//!
//! A [`BlockTemplate`] is built whole by the refresher and never modified
//! afterwards. [`PublishedTemplate`] holds the current one behind a single
//! atomically swapped pointer, so readers always see one complete template
//! or none at all.

use std::sync::Arc;

use alloy_primitives::U256;
use arc_swap::ArcSwapOption;

/// The job miners work on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    /// Header hash (without nonce), as sent by the node
    pub header: String,
    /// Seed hash, as sent by the node
    pub seed: String,
    /// Target boundary, as sent by the node
    pub target: String,
    /// Height of the pending block
    pub height: u64,
    /// Difficulty of the pending block
    pub difficulty: U256,
}

/// Single-writer, many-reader slot for the current template.
pub struct PublishedTemplate {
    current: ArcSwapOption<BlockTemplate>,
}

impl PublishedTemplate {
    /// Starts empty: no template until the first successful refresh.
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    /// Snapshot of the current template, or `None` before the first one.
    pub fn load(&self) -> Option<Arc<BlockTemplate>> {
        self.current.load_full()
    }

    /// Header of the current template, if any.
    pub fn header(&self) -> Option<String> {
        self.load().map(|t| t.header.clone())
    }

    /// Replace the current template in one swap.
    pub(crate) fn publish(&self, template: BlockTemplate) -> Arc<BlockTemplate> {
        let template = Arc::new(template);
        self.current.store(Some(template.clone()));
        template
    }
}

impl Default for PublishedTemplate {
    fn default() -> Self {
        Self::new()
    }
}
