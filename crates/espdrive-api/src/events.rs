// Events service client
//
// `GET <events_url>` returning the command history. The body shape is not
// fixed, so this client hands back raw text or loosely-typed JSON; shape
// detection belongs to the consumer.

use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{self, TransportConfig};

/// Client for the historical events endpoint.
pub struct EventsClient {
    http: reqwest::Client,
    url: Url,
    timeout_ms: u64,
}

impl EventsClient {
    pub fn new(url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            url,
            timeout_ms: transport.timeout_ms(),
        })
    }

    /// Fetch the raw response body.
    pub async fn fetch_raw(&self) -> Result<String, Error> {
        debug!("GET {}", self.url);
        let request = self
            .http
            .get(self.url.clone())
            .header(ACCEPT, "application/json");
        transport::execute(request, self.timeout_ms).await
    }

    /// Fetch and parse the body as untyped JSON.
    pub async fn fetch_json(&self) -> Result<serde_json::Value, Error> {
        let body = self.fetch_raw().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })
    }
}
