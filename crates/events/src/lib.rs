//! Job lifecycle events.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`JobEvent`]: the lifecycle transitions the orchestrator publishes.
//! - [`EventLog`]: background service that appends every event to a
//!   writer as JSON lines.

pub mod bus;
pub mod log;

pub use bus::{EventBus, JobEvent, JobOutcome};
pub use log::{EventLog, EventLogError};
