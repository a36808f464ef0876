//! Single-session job orchestrator.
//!
//! [`JobOrchestrator`] tracks at most one job at a time. Submitting a new
//! request cancels the pending one, spawns a task that calls the
//! [`Backend`], and returns a [`JobHandle`] right away. Results are applied
//! only if their job id still matches the tracked job, so the last
//! submission always wins no matter in which order backend replies arrive.
//!
//! Every transition is published as a [`JobEvent`] on the session's
//! [`EventBus`]. Call [`JobOrchestrator::subscribe`] to receive them.

use std::sync::Arc;

use rustplay_core::{Backend, BackendResponse, Job, JobFailure, JobId, JobRequest, JobStatus};
use rustplay_events::{EventBus, JobEvent, JobOutcome};
use tokio::sync::{broadcast, oneshot, Mutex};
use tokio_util::sync::CancellationToken;

use crate::config::OrchestratorConfig;
use crate::handle::JobHandle;

/// Owns the lifecycle of the session's current job.
///
/// Cheap to clone; clones share the same session.
pub struct JobOrchestrator<B> {
    shared: Arc<Shared<B>>,
}

struct Shared<B> {
    backend: Arc<B>,
    config: OrchestratorConfig,
    bus: EventBus,
    tracked: Mutex<Tracked>,
    /// Master cancellation token, cancelled during shutdown.
    cancel: CancellationToken,
}

/// The tracked job, pending or the most recently settled one.
#[derive(Default)]
struct Tracked {
    job: Option<Job>,
    /// Token for the in-flight backend task (child of the master token).
    in_flight: Option<CancellationToken>,
    /// Completes the pending job's [`JobHandle`].
    settle: Option<oneshot::Sender<JobEvent>>,
}

impl<B> Clone for JobOrchestrator<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: Backend> JobOrchestrator<B> {
    /// Create an orchestrator with its own event bus.
    pub fn new(backend: B, config: OrchestratorConfig) -> Self {
        let bus = EventBus::new(config.event_capacity);
        Self::with_bus(backend, config, bus)
    }

    /// Create an orchestrator publishing to an existing bus.
    pub fn with_bus(backend: B, config: OrchestratorConfig, bus: EventBus) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend: Arc::new(backend),
                config,
                bus,
                tracked: Mutex::new(Tracked::default()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Subscribe to job lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.shared.bus.subscribe()
    }

    pub fn bus(&self) -> &EventBus {
        &self.shared.bus
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.shared.config
    }

    /// Snapshot of the tracked job, if any.
    pub async fn current(&self) -> Option<Job> {
        self.shared.tracked.lock().await.job.clone()
    }

    /// Submit a request, superseding any pending job.
    ///
    /// The pending job (if any) is cancelled first and its eventual reply
    /// discarded. The backend call runs on a spawned task; this returns as
    /// soon as the job is tracked and `JobStarted` is published.
    pub async fn submit(&self, request: JobRequest) -> JobHandle {
        let mut tracked = self.shared.tracked.lock().await;
        self.submit_locked(&mut tracked, request)
    }

    /// Body of [`submit`](Self::submit), run while `tracked` is locked.
    fn submit_locked(&self, tracked: &mut Tracked, request: JobRequest) -> JobHandle {
        if let Some(superseded) = cancel_pending(tracked, &self.shared.bus) {
            tracing::info!(job_id = %superseded, "Pending job superseded by a new submission");
        }

        let job = Job::new(request.clone());
        let id = job.id;
        let target = request.target();
        let token = self.shared.cancel.child_token();

        let (sender, settled) = oneshot::channel();
        tracked.job = Some(job);
        tracked.in_flight = Some(token.clone());
        tracked.settle = Some(sender);
        self.shared.bus.publish(JobEvent::started(id, target));
        tracing::info!(job_id = %id, target = %target, "Job submitted");

        if self.shared.cancel.is_cancelled() {
            tracing::warn!(job_id = %id, "Orchestrator is shut down, cancelling job");
            cancel_pending(tracked, &self.shared.bus);
        } else {
            let this = self.clone();
            tokio::spawn(async move { this.drive(id, request, token).await });
        }

        JobHandle::new(id, target, settled)
    }

    /// Apply a backend reply for `id`.
    ///
    /// Returns `false` (and changes nothing) if `id` is not the tracked
    /// job or the job has already settled.
    pub async fn on_backend_response(&self, id: JobId, response: BackendResponse) -> bool {
        let mut tracked = self.shared.tracked.lock().await;
        let Some(job) = tracked.job.as_mut().filter(|job| job.id == id) else {
            tracing::debug!(job_id = %id, "Discarding stale backend response");
            return false;
        };

        let status = match job.complete(response) {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(job_id = %id, error = %e, "Discarding response for settled job");
                return false;
            }
        };
        let output = job.result.clone().unwrap_or_default();
        tracked.in_flight = None;

        tracing::info!(job_id = %id, status = %status, "Job finished");
        settle(
            &mut tracked,
            &self.shared.bus,
            JobEvent::finished(id, status, JobOutcome::Output(output)),
        );
        true
    }

    /// Fail job `id` with a classified transport failure.
    ///
    /// Same staleness rules as [`on_backend_response`](Self::on_backend_response).
    pub async fn on_backend_error(&self, id: JobId, failure: JobFailure) -> bool {
        let mut tracked = self.shared.tracked.lock().await;
        let Some(job) = tracked.job.as_mut().filter(|job| job.id == id) else {
            tracing::debug!(job_id = %id, "Discarding stale backend error");
            return false;
        };

        if let Err(e) = job.fail(failure.clone()) {
            tracing::debug!(job_id = %id, error = %e, "Discarding error for settled job");
            return false;
        }
        tracked.in_flight = None;

        tracing::warn!(
            job_id = %id,
            error = %failure,
            retryable = failure.is_retryable(),
            "Job failed",
        );
        settle(
            &mut tracked,
            &self.shared.bus,
            JobEvent::finished(id, JobStatus::Failed, JobOutcome::Error(failure)),
        );
        true
    }

    /// Cancel the pending job, if there is one.
    ///
    /// Returns the cancelled job's id. With nothing pending this is a
    /// no-op and publishes nothing.
    pub async fn cancel(&self) -> Option<JobId> {
        let mut tracked = self.shared.tracked.lock().await;
        let cancelled = cancel_pending(&mut tracked, &self.shared.bus);
        if let Some(id) = cancelled {
            tracing::info!(job_id = %id, "Job cancelled");
        }
        cancelled
    }

    /// Resubmit the tracked job's request if it failed with a retryable
    /// failure (network or timeout).
    ///
    /// The check and the resubmission happen under one lock, so a
    /// concurrent [`submit`](Self::submit) is never superseded by an
    /// older request.
    pub async fn retry(&self) -> Option<JobHandle> {
        let mut tracked = self.shared.tracked.lock().await;
        let job = tracked.job.as_ref()?;
        let retryable = job.status == JobStatus::Failed
            && job.failure.as_ref().is_some_and(JobFailure::is_retryable);
        if !retryable {
            return None;
        }
        tracing::info!(job_id = %job.id, "Retrying failed job");
        let request = job.request.clone();
        Some(self.submit_locked(&mut tracked, request))
    }

    /// Cancel the pending job and stop accepting work.
    ///
    /// Jobs submitted afterwards are cancelled immediately. Idempotent.
    pub async fn shutdown(&self) {
        let mut tracked = self.shared.tracked.lock().await;
        if self.shared.cancel.is_cancelled() {
            return;
        }
        tracing::info!("Shutting down job orchestrator");
        cancel_pending(&mut tracked, &self.shared.bus);
        self.shared.cancel.cancel();
    }

    // ---- private helpers ----

    /// Call the backend for one job and route the result back.
    async fn drive(self, id: JobId, request: JobRequest, token: CancellationToken) {
        let timeout = self.shared.config.request_timeout;
        let backend = Arc::clone(&self.shared.backend);

        let result = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(job_id = %id, "Backend call abandoned after cancellation");
                return;
            }
            result = tokio::time::timeout(timeout, backend.dispatch(&request)) => result,
        };

        match result {
            Ok(Ok(response)) => {
                self.on_backend_response(id, response).await;
            }
            Ok(Err(failure)) => {
                self.on_backend_error(id, failure).await;
            }
            Err(_elapsed) => {
                self.on_backend_error(id, JobFailure::timeout(timeout)).await;
            }
        }
    }
}

/// Move the tracked job to `Cancelled` if it is still pending, stop its
/// backend task, and publish `JobCancelled`.
fn cancel_pending(tracked: &mut Tracked, bus: &EventBus) -> Option<JobId> {
    let job = tracked
        .job
        .as_mut()
        .filter(|job| job.status == JobStatus::Pending)?;
    job.cancel().ok()?;
    let id = job.id;

    if let Some(token) = tracked.in_flight.take() {
        token.cancel();
    }
    settle(tracked, bus, JobEvent::cancelled(id));
    Some(id)
}

/// Publish a terminal event and hand it to the job's handle.
fn settle(tracked: &mut Tracked, bus: &EventBus, event: JobEvent) {
    bus.publish(event.clone());
    if let Some(sender) = tracked.settle.take() {
        // The handle may have been dropped.
        let _ = sender.send(event);
    }
}
