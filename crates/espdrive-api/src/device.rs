// Device command endpoint client
//
// `POST http://<addr>/comando` with the command token as a text/plain body.
// The device answers with opaque text which is returned verbatim.

use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{self, TransportConfig};

/// Path of the command endpoint on the device.
pub const COMMAND_PATH: &str = "comando";

/// Client for the ESP32's command endpoint.
///
/// Holds no per-device state: the target URL is passed on every call.
pub struct DeviceClient {
    http: reqwest::Client,
    timeout_ms: u64,
}

impl DeviceClient {
    /// Create a device client. Connection pooling is always disabled so no
    /// socket outlives the command that opened it.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let transport = transport.clone().unpooled();
        Ok(Self {
            http: transport.build_client()?,
            timeout_ms: transport.timeout_ms(),
        })
    }

    /// Post a single command token. One call, one attempt.
    pub async fn post_command(&self, url: Url, token: &str) -> Result<String, Error> {
        debug!(token, "POST {url}");

        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(token.to_owned());

        transport::execute(request, self.timeout_ms).await
    }
}
