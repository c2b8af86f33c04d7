// ── Session facade ──
//
// One session controls one device. It owns the three HTTP clients,
// resolves the device address on `connect()`, and publishes the
// connection status on a watch channel. Everything is caller-driven:
// no background tasks, no timers.

use std::sync::Arc;

use espdrive_api::{DeviceClient, EventsClient, LookupClient, TransportConfig};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::dispatcher::CommandDispatcher;
use crate::error::CoreError;
use crate::filter::EventFilter;
use crate::group;
use crate::model::{
    CommandKind, CommandOutcome, ConnectionStatus, DeviceAddress, EventGroup, EventRecord,
    FetchFailure, LookupFailure,
};
use crate::normalize;
use crate::resolver::ConnectivityResolver;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Does not touch the network
/// until [`connect()`](Self::connect) is called.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    resolver: ConnectivityResolver,
    dispatcher: CommandDispatcher,
    events: EventsClient,
    address: RwLock<Option<DeviceAddress>>,
    status: watch::Sender<ConnectionStatus>,
}

impl Session {
    /// Build the HTTP clients for `config`. Makes no request.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let lookup = LookupClient::new(
            config.lookup_url.clone(),
            &TransportConfig::with_timeout(config.lookup_timeout),
        )?;
        let device = DeviceClient::new(&TransportConfig::with_timeout(config.command_timeout))?;
        let events = EventsClient::new(
            config.events_url.clone(),
            &TransportConfig::with_timeout(config.events_timeout),
        )?;

        let (status, _) = watch::channel(ConnectionStatus::default());

        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                resolver: ConnectivityResolver::new(lookup),
                dispatcher: CommandDispatcher::new(device),
                events,
                address: RwLock::new(None),
                status,
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // ── Connectivity ─────────────────────────────────────────────────

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        *self.inner.status.borrow()
    }

    /// Subscribe to status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.subscribe()
    }

    /// The address in use, if the last `connect()` succeeded.
    pub async fn address(&self) -> Option<DeviceAddress> {
        self.inner.address.read().await.clone()
    }

    /// Resolve the device address and publish the new status.
    ///
    /// Publishes `Connecting` first. A configured override is used as-is
    /// and no lookup is made. On failure the stored address is cleared.
    pub async fn connect(&self) -> Result<DeviceAddress, LookupFailure> {
        self.inner.status.send_replace(ConnectionStatus::Connecting);

        let result = match &self.inner.config.address_override {
            Some(address) => {
                info!(%address, "using configured device address, skipping lookup");
                Ok(address.clone())
            }
            None => {
                self.inner
                    .resolver
                    .resolve(&self.inner.config.device_id)
                    .await
            }
        };

        *self.inner.address.write().await = result.as_ref().ok().cloned();
        let status = ConnectionStatus::from(&result);
        self.inner.status.send_replace(status);
        debug!(%status, "connection status updated");

        result
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send one command to the resolved address.
    ///
    /// Without a resolved address this is `Failed(Unknown)` with no
    /// request made.
    pub async fn send(&self, command: CommandKind) -> CommandOutcome {
        let address = self.address().await;
        self.inner.dispatcher.send(address.as_ref(), command).await
    }

    // ── Event history ────────────────────────────────────────────────

    /// Fetch and normalize the event history.
    ///
    /// Transport failures are errors; an unreadable or unexpected body is
    /// an empty history.
    pub async fn fetch_events(&self) -> Result<Vec<EventRecord>, CoreError> {
        let body = self.inner.events.fetch_raw().await.map_err(|e| {
            let reason = FetchFailure::from(&e);
            debug!(error = %e, %reason, "events fetch failed");
            CoreError::EventsUnavailable { reason }
        })?;
        Ok(normalize::normalize_str(&body))
    }

    /// Fetch, filter, then group by day.
    pub async fn history(&self, filter: &EventFilter) -> Result<Vec<EventGroup>, CoreError> {
        let records = self.fetch_events().await?;
        Ok(group::group(filter.apply(records)))
    }
}
