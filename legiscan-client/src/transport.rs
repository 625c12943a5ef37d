//! HTTP transport seam
//!
//! The client talks to the network through a trait object so tests can swap
//! in canned responses. The real backend is a blocking `ureq` agent.

use std::time::Duration;

use crate::error::{LegiscanError, Result};

/// Raw outcome of a GET: status plus body bytes. Non-2xx statuses come back
/// as data; interpreting them is the API client's job.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Transport backend interface
pub trait Transport: Send + Sync {
    /// Backend name, for logging
    fn name(&self) -> &'static str;

    /// Perform a GET of `url`. Fails with [`LegiscanError::Transport`] only
    /// on network-level problems (timeout, refused connection, TLS).
    fn get(&self, url: &str) -> Result<TransportResponse>;
}

/// Blocking HTTP transport backed by `ureq`
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Build an agent with the given global timeout. Status codes are not
    /// mapped to errors by the agent so the caller sees every response.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Transport for UreqTransport {
    fn name(&self) -> &'static str {
        "ureq"
    }

    fn get(&self, url: &str) -> Result<TransportResponse> {
        let mut response = self.agent.get(url).call().map_err(|err| LegiscanError::Transport {
            status: None,
            message: err.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|err| LegiscanError::Transport {
                status: Some(status),
                message: format!("failed to read response body: {err}"),
            })?;

        Ok(TransportResponse { status, body })
    }
}
