// Shared transport configuration for building reqwest::Client instances.
//
// The lookup, device, and events clients each carry their own timeout,
// so every client is built from its own TransportConfig.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("espdrive/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request timeout (connect + send + receive body).
    pub timeout: Duration,
    /// Keep idle connections around between requests.
    ///
    /// Disabled for the device client: each command gets a fresh socket.
    pub pooled: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            pooled: true,
        }
    }
}

impl TransportConfig {
    /// Config with the given timeout and default pooling.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Disable connection reuse.
    pub fn unpooled(mut self) -> Self {
        self.pooled = false;
        self
    }

    /// Timeout in whole milliseconds, for error reporting.
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if !self.pooled {
            builder = builder.pool_max_idle_per_host(0);
        }

        builder
            .build()
            .map_err(|e| Error::Client(format!("failed to build HTTP client: {e}")))
    }
}

// ── Request execution ────────────────────────────────────────────────

/// Longest slice of an error body kept in `Error::HttpStatus`.
const BODY_PREVIEW_LEN: usize = 200;

/// Map a reqwest failure, promoting elapsed timeouts to `Error::Timeout`.
pub(crate) fn classify(err: reqwest::Error, timeout_ms: u64) -> Error {
    if err.is_timeout() {
        Error::Timeout { timeout_ms }
    } else {
        Error::Transport(err)
    }
}

/// Send a request and return the body text of a 2xx response.
///
/// Non-2xx responses become `Error::HttpStatus` carrying a body preview.
pub(crate) async fn execute(
    request: reqwest::RequestBuilder,
    timeout_ms: u64,
) -> Result<String, Error> {
    let resp = request
        .send()
        .await
        .map_err(|e| classify(e, timeout_ms))?;
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let preview: String = body.chars().take(BODY_PREVIEW_LEN).collect();
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body: preview,
        });
    }

    resp.text().await.map_err(|e| {
        if e.is_timeout() {
            Error::Timeout { timeout_ms }
        } else {
            Error::Body(e.to_string())
        }
    })
}
