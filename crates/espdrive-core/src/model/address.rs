// ── Device network address ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::error::CoreError;

/// A resolved network endpoint for the device: host plus optional port.
///
/// Validated on construction (no scheme, path, query or credentials), so
/// a `DeviceAddress` always yields a well-formed command URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    host: String,
    port: Option<u16>,
}

impl DeviceAddress {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// `http://{host[:port]}/`
    pub fn base_url(&self) -> Result<Url, CoreError> {
        Url::parse(&format!("http://{self}/")).map_err(|e| CoreError::InvalidAddress {
            input: self.to_string(),
            reason: e.to_string(),
        })
    }

    /// `http://{host[:port]}/comando`
    pub fn command_url(&self) -> Result<Url, CoreError> {
        let base = self.base_url()?;
        base.join(espdrive_api::device::COMMAND_PATH)
            .map_err(|e| CoreError::InvalidAddress {
                input: self.to_string(),
                reason: e.to_string(),
            })
    }
}

impl FromStr for DeviceAddress {
    type Err = CoreError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidAddress {
            input: input.to_owned(),
            reason: reason.to_owned(),
        };

        let raw = input.trim();
        if raw.is_empty() {
            return Err(invalid("address is empty"));
        }
        if raw.contains("://") {
            return Err(invalid("expected a bare host, not a URL"));
        }
        if raw.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@')) {
            return Err(invalid("address may only contain a host and optional port"));
        }

        let url = Url::parse(&format!("http://{raw}/")).map_err(|e| invalid(&e.to_string()))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?;

        Ok(Self {
            host: host.to_owned(),
            // An explicit :80 is the scheme default and comes back as None.
            port: url.port(),
        })
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{port}", self.host),
            None => f.write_str(&self.host),
        }
    }
}

impl Serialize for DeviceAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeviceAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> DeviceAddress {
        s.parse().unwrap_or_else(|e| panic!("{s}: {e}"))
    }

    #[test]
    fn parses_ipv4_with_and_without_port() {
        let a = addr("192.168.157.176");
        assert_eq!(a.host(), "192.168.157.176");
        assert_eq!(a.port(), None);

        let b = addr(" 10.0.0.2:8080 ");
        assert_eq!(b.port(), Some(8080));
        assert_eq!(b.to_string(), "10.0.0.2:8080");
    }

    #[test]
    fn builds_command_url() {
        let url = addr("192.168.1.50").command_url().map(|u| u.to_string()).ok();
        assert_eq!(url.as_deref(), Some("http://192.168.1.50/comando"));

        let url = addr("esp32.local:81").command_url().map(|u| u.to_string()).ok();
        assert_eq!(url.as_deref(), Some("http://esp32.local:81/comando"));
    }

    #[test]
    fn rejects_urls_paths_and_garbage() {
        for bad in ["", "   ", "http://1.2.3.4", "1.2.3.4/comando", "a b", "1.2.3.4:99999", "user@host"] {
            assert!(bad.parse::<DeviceAddress>().is_err(), "{bad:?} should be rejected");
        }
    }
}
