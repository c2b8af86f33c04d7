// espdrive-api: Async HTTP clients for the ESP32 remote-control backends.

pub mod device;
pub mod error;
pub mod events;
pub mod lookup;
pub mod transport;

pub use device::DeviceClient;
pub use error::Error;
pub use events::EventsClient;
pub use lookup::{LookupClient, LookupData, LookupResponse};
pub use transport::TransportConfig;
