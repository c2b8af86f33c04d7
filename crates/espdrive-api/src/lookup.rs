// Device lookup service client
//
// `GET <lookup_url>?dispositivo_id=<id>` -> `{ success, data: { ip_local } }`.
// The PHP backend is loose about types, so the success flag tolerates
// `1`/`"true"` as well as a JSON boolean.

use serde::{Deserialize, Deserializer};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{self, TransportConfig};

/// Query parameter carrying the device identifier.
const DEVICE_ID_PARAM: &str = "dispositivo_id";

// ── Response shape ───────────────────────────────────────────────────

/// Raw lookup response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupResponse {
    #[serde(default, deserialize_with = "truthy")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<LookupData>,
    /// Optional human-readable message some backend revisions include.
    #[serde(default, alias = "mensaje")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupData {
    #[serde(default)]
    pub ip_local: Option<String>,
}

impl LookupResponse {
    /// The reported local IP, if any.
    pub fn ip_local(&self) -> Option<&str> {
        self.data.as_ref()?.ip_local.as_deref()
    }
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_i64() == Some(1),
        serde_json::Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    })
}

// ── Client ───────────────────────────────────────────────────────────

/// Client for the backend that maps a device id to its current local IP.
pub struct LookupClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_ms: u64,
}

impl LookupClient {
    /// Create a lookup client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            timeout_ms: transport.timeout_ms(),
        })
    }

    /// The lookup service URL (without the device query).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Look up the current address of `device_id`.
    ///
    /// Exactly one request per call. Any query already present on the
    /// base URL is kept; `dispositivo_id` is appended.
    pub async fn lookup(&self, device_id: &str) -> Result<LookupResponse, Error> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(DEVICE_ID_PARAM, device_id);
        debug!(device_id, "GET {url}");

        let body = transport::execute(self.http.get(url), self.timeout_ms).await?;

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}
