// ── Device address resolution ──

use espdrive_api::LookupClient;
use tracing::{debug, info, warn};

use crate::model::{DeviceAddress, LookupFailure};

/// Resolves a device id to its current [`DeviceAddress`] through the
/// lookup service.
///
/// One request per call, no retries. Every failure comes back as a
/// [`LookupFailure`]; nothing propagates as a panic or raw transport error.
pub struct ConnectivityResolver {
    client: LookupClient,
}

impl ConnectivityResolver {
    pub fn new(client: LookupClient) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, device_id: &str) -> Result<DeviceAddress, LookupFailure> {
        debug!(device_id, lookup_url = %self.client.base_url(), "resolving device address");

        let result = self.try_resolve(device_id).await;
        match &result {
            Ok(address) => info!(device_id, %address, "device address resolved"),
            Err(failure) => warn!(device_id, %failure, "device address lookup failed"),
        }
        result
    }

    async fn try_resolve(&self, device_id: &str) -> Result<DeviceAddress, LookupFailure> {
        let response = self.client.lookup(device_id).await?;

        if !response.success {
            return Err(LookupFailure::Rejected {
                message: response.message,
            });
        }

        let raw = response
            .ip_local()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .ok_or(LookupFailure::MissingAddress)?;

        raw.parse().map_err(|_| LookupFailure::InvalidAddress {
            raw: raw.to_owned(),
        })
    }
}
