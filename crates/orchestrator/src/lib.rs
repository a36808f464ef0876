//! Remote build-and-execute orchestration core.
//!
//! [`JobOrchestrator`] keeps at most one job pending per session, cancels
//! superseded jobs, bounds every backend call with a timeout, and publishes
//! lifecycle events. [`backoff`] adds retry with exponential backoff for
//! network and timeout failures.

pub mod backoff;
pub mod config;
pub mod handle;
pub mod orchestrator;

pub use backoff::{submit_with_retry, RetryPolicy};
pub use config::OrchestratorConfig;
pub use handle::JobHandle;
pub use orchestrator::JobOrchestrator;
