// ── Domain model ──

pub mod address;
pub mod command;
pub mod event;
pub mod status;

pub use address::DeviceAddress;
pub use command::{CommandKind, parse_command};
pub use event::{EventGroup, EventRecord, GroupKey};
pub use status::{CommandOutcome, ConnectionStatus, DispatchFailure, FetchFailure, LookupFailure};
