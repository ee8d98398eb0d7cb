//! Shared HTTP client used by every download task.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::Client;

use crate::error::{Error, Result};

/// Default maximum number of simultaneous downloads.
pub const DEFAULT_POOL_LIMIT: usize = 10;

/// Browser-like user agent; some image hosts refuse unknown clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Connect timeout. Requests themselves have no overall timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Owned handle to the download HTTP client.
///
/// Created once at startup and closed once at shutdown. Closing again is a
/// no-op, and handing out the client after close is an error.
#[derive(Debug)]
pub struct NetworkClient {
    client: Mutex<Option<Client>>,
}

impl NetworkClient {
    /// Build the client with an idle pool sized to `pool_limit`.
    pub fn new(pool_limit: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(pool_limit)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::from_client(client))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self {
            client: Mutex::new(Some(client)),
        }
    }

    /// A cheap clone of the underlying client for one task.
    pub fn handle(&self) -> Result<Client> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::ClientClosed)
    }

    /// Release the client. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        let closed = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();

        if closed {
            tracing::debug!("Network client closed");
        }
        closed
    }

    pub fn is_closed(&self) -> bool {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Drop for NetworkClient {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_is_idempotent() {
        let client = NetworkClient::new(DEFAULT_POOL_LIMIT).unwrap();
        assert!(!client.is_closed());
        assert!(client.handle().is_ok());

        assert!(client.close());
        assert!(client.is_closed());
        assert!(!client.close());
        assert!(!client.close());
    }

    #[test]
    fn test_handle_after_close_fails() {
        let client = NetworkClient::new(4).unwrap();
        client.close();
        assert!(matches!(client.handle(), Err(Error::ClientClosed)));
    }
}
