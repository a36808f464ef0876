//! Caller-side view of one submitted job.

use rustplay_core::{JobId, Target};
use rustplay_events::JobEvent;
use tokio::sync::oneshot;

/// Returned by [`JobOrchestrator::submit`](crate::JobOrchestrator::submit).
///
/// The orchestrator hands the job's terminal event to the handle on a
/// dedicated channel, so [`wait`](Self::wait) resolves even when a slow
/// event bus subscriber has lagged.
pub struct JobHandle {
    id: JobId,
    target: Target,
    settled: oneshot::Receiver<JobEvent>,
}

impl JobHandle {
    pub(crate) fn new(id: JobId, target: Target, settled: oneshot::Receiver<JobEvent>) -> Self {
        Self {
            id,
            target,
            settled,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Wait for this job's `JobFinished` or `JobCancelled` event.
    ///
    /// Returns `None` if the orchestrator is dropped before the job settles.
    pub async fn wait(self) -> Option<JobEvent> {
        match self.settled.await {
            Ok(event) => Some(event),
            Err(_) => {
                tracing::debug!(job_id = %self.id, "Orchestrator dropped before the job settled");
                None
            }
        }
    }
}

impl std::fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .field("target", &self.target)
            .finish()
    }
}
