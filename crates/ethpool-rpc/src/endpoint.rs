use std::time::Duration;

use crate::error::{Result, RpcError};

/// Identity of one upstream node.
///
/// Immutable once built. Its priority is not stored here: it is the
/// endpoint's position in the job maker's upstream list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    pub name: String,
    pub url: String,
    pub timeout: Duration,
}

impl NodeEndpoint {
    /// Creates an endpoint, validating that `url` starts with `http://`.
    ///
    /// Nodes are expected on a private network; there is no TLS connector.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("http://") {
            return Err(RpcError::InvalidEndpoint(format!(
                "'{}' must start with http://",
                url
            )));
        }

        Ok(Self {
            name: name.into(),
            url,
            timeout,
        })
    }

    /// Timeout in whole milliseconds, as reported in [`RpcError::Timeout`].
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
