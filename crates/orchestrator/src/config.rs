use std::time::Duration;

use rustplay_core::config::{env_or, ConfigError};

/// Default window for one backend call, in seconds.
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 30;

/// Default broadcast capacity for job events.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// A job with no backend answer after this long fails with a timeout.
    pub request_timeout: Duration,
    /// Buffer size of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `PLAYGROUND_JOB_TIMEOUT_SECS` | `30`    |
    /// | `PLAYGROUND_EVENT_CAPACITY`   | `256`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = env_or("PLAYGROUND_JOB_TIMEOUT_SECS", DEFAULT_JOB_TIMEOUT_SECS)?;
        let event_capacity: usize = env_or("PLAYGROUND_EVENT_CAPACITY", DEFAULT_EVENT_CAPACITY)?;

        Ok(Self {
            request_timeout: Duration::from_secs(timeout_secs),
            // broadcast::channel panics on zero capacity.
            event_capacity: event_capacity.max(1),
        })
    }
}
