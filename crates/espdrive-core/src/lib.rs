//! Command dispatch and connectivity core for the `espdrive` workspace.
//!
//! Sits between `espdrive-api` (raw HTTP clients) and the CLI:
//!
//! - **[`Session`]**: facade for one device. [`connect()`](Session::connect)
//!   resolves the device address and publishes a [`ConnectionStatus`] on a
//!   watch channel; [`send()`](Session::send) dispatches one command;
//!   [`history()`](Session::history) runs the event pipeline.
//!
//! - **[`ConnectivityResolver`]** and **[`CommandDispatcher`]**: one lookup,
//!   one POST. Both return typed outcomes rather than errors.
//!
//! - **Event pipeline**: [`normalize`] turns any known events payload into
//!   [`EventRecord`]s, [`filter`] applies command and date predicates, and
//!   [`group`] buckets the result by calendar day.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod group;
pub mod model;
pub mod normalize;
pub mod resolver;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SessionConfig;
pub use dispatcher::CommandDispatcher;
pub use error::CoreError;
pub use filter::{CommandFilter, DateRange, EventFilter};
pub use resolver::ConnectivityResolver;
pub use session::Session;

pub use model::{
    CommandKind, CommandOutcome, ConnectionStatus, DeviceAddress, DispatchFailure, EventGroup,
    EventRecord, FetchFailure, GroupKey, LookupFailure, parse_command,
};
