// ── Runtime session configuration ──
//
// Describes *which* device to talk to and *where* the backend lives.
// Never touches disk: the CLI builds a `SessionConfig` (usually through
// espdrive-config) and hands it to `Session::new`.

use std::time::Duration;

use url::Url;

use crate::model::DeviceAddress;

pub const DEFAULT_DEVICE_ID: &str = "ESP32-ACT01";
pub const DEFAULT_LOOKUP_URL: &str = "https://pruebas.entramadosec.com/consultar_ip.php";
pub const DEFAULT_EVENTS_URL: &str = "https://pruebas.entramadosec.com/listar_eventos.php";

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_EVENTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for one control session against one device.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Identifier the lookup service knows the device by.
    pub device_id: String,
    /// Lookup service endpoint, without the `dispositivo_id` query.
    pub lookup_url: Url,
    /// Events service endpoint.
    pub events_url: Url,
    /// Fixed device address. When set, `connect()` skips the lookup.
    pub address_override: Option<DeviceAddress>,
    pub lookup_timeout: Duration,
    pub command_timeout: Duration,
    pub events_timeout: Duration,
}

impl SessionConfig {
    /// Build a config with default timeouts and no override.
    pub fn new(device_id: impl Into<String>, lookup_url: Url, events_url: Url) -> Self {
        Self {
            device_id: device_id.into(),
            lookup_url,
            events_url,
            address_override: None,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            events_timeout: DEFAULT_EVENTS_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_address_override(mut self, address: DeviceAddress) -> Self {
        self.address_override = Some(address);
        self
    }

    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_events_timeout(mut self, timeout: Duration) -> Self {
        self.events_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }
}
