//! Feedlane driver library.
//!
//! The driver side of the feed-selection protocol: configuration,
//! worker subprocess transport, the driver's operation handlers, and
//! the select-flow orchestration. The protocol engine itself lives in
//! `feedlane-protocol`.

pub mod config;
pub mod driver;
pub mod handlers;
pub mod worker_link;

pub use config::{ConfigError, DriverConfig, KeyPolicy};
pub use driver::{Driver, DriverError, Selection};
pub use handlers::register_driver_handlers;
pub use worker_link::WorkerLink;
