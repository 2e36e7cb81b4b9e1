//! HTTP client construction

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("testbed/", env!("CARGO_PKG_VERSION"));

/// Networking errors
#[derive(Debug, Error)]
pub enum NetworkingError {
    #[error("Failed to build HTTP client: {source}")]
    ClientBuildFailed {
        #[from]
        source: reqwest::Error,
    },

    #[error("Invalid timeout: {seconds} (must be > 0)")]
    InvalidTimeout { seconds: u64 },
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct NetworkingConfig {
    /// Whole-request timeout in seconds; `None` lets large downloads run
    /// as long as they need
    pub timeout_seconds: Option<u64>,
    /// Value of the `User-Agent` header
    pub user_agent: String,
}

impl Default for NetworkingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Owns the HTTP client shared by the download and reactivation steps
pub struct NetworkingManager {
    client: Client,
}

impl NetworkingManager {
    pub fn new(config: NetworkingConfig) -> Result<Self, NetworkingError> {
        trace!(timeout = ?config.timeout_seconds, "initializing networking manager");

        let mut builder = Client::builder().user_agent(config.user_agent.clone());

        if let Some(seconds) = config.timeout_seconds {
            if seconds == 0 {
                return Err(NetworkingError::InvalidTimeout { seconds });
            }
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let client = builder.build()?;

        Ok(Self { client })
    }

    /// Get HTTP client for requests; clones share the connection pool
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
