//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`JobEvent`]s. The
//! orchestrator publishes every lifecycle transition here; the UI layer,
//! job handles, and the [`EventLog`](crate::log::EventLog) subscribe.

use chrono::Utc;
use rustplay_core::{JobFailure, JobId, JobStatus, Output, Target, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// JobEvent
// ---------------------------------------------------------------------------

/// What a finished job produced: output, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Output(Output),
    Error(JobFailure),
}

/// A lifecycle transition published by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// A job was created and its backend call issued.
    JobStarted {
        id: JobId,
        target: Target,
        at: Timestamp,
    },

    /// A job reached `Succeeded` or `Failed`.
    JobFinished {
        id: JobId,
        status: JobStatus,
        outcome: JobOutcome,
        at: Timestamp,
    },

    /// A pending job was cancelled, explicitly or by a newer submission.
    JobCancelled { id: JobId, at: Timestamp },
}

impl JobEvent {
    pub fn started(id: JobId, target: Target) -> Self {
        JobEvent::JobStarted {
            id,
            target,
            at: Utc::now(),
        }
    }

    pub fn finished(id: JobId, status: JobStatus, outcome: JobOutcome) -> Self {
        JobEvent::JobFinished {
            id,
            status,
            outcome,
            at: Utc::now(),
        }
    }

    pub fn cancelled(id: JobId) -> Self {
        JobEvent::JobCancelled { id, at: Utc::now() }
    }

    /// Id of the job this event is about.
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::JobStarted { id, .. }
            | JobEvent::JobFinished { id, .. }
            | JobEvent::JobCancelled { id, .. } => *id,
        }
    }

    /// Dot-separated event name, e.g. `"job.finished"`.
    pub fn name(&self) -> &'static str {
        match self {
            JobEvent::JobStarted { .. } => "job.started",
            JobEvent::JobFinished { .. } => "job.finished",
            JobEvent::JobCancelled { .. } => "job.cancelled",
        }
    }

    /// True once nothing further will be published for this job.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEvent::JobStarted { .. })
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`JobEvent`].
///
/// # Usage
///
/// ```rust
/// use rustplay_core::{JobId, Target};
/// use rustplay_events::bus::{EventBus, JobEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(JobEvent::started(JobId::new(), Target::Run));
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<JobEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`. A capacity of
    /// zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: JobEvent) {
        tracing::trace!(event = event.name(), job_id = %event.job_id(), "Publishing job event");
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rustplay_core::FailureKind;

    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let id = JobId::new();

        bus.publish(JobEvent::started(id, Target::Asm));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.job_id(), id);
        assert_eq!(received.name(), "job.started");
        assert!(!received.is_terminal());
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        let id = JobId::new();

        bus.publish(JobEvent::cancelled(id));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.job_id(), id);
        assert_eq!(e2.job_id(), id);
        assert!(e1.is_terminal());
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers: this must not panic.
        bus.publish(JobEvent::cancelled(JobId::new()));
    }

    #[tokio::test]
    async fn zero_capacity_is_raised_to_one() {
        let bus = EventBus::new(0);
        let mut rx = bus.subscribe();
        let id = JobId::new();

        bus.publish(JobEvent::cancelled(id));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.job_id(), id);
    }

    #[test]
    fn finished_event_serializes_with_tags() {
        let event = JobEvent::finished(
            JobId::new(),
            JobStatus::Failed,
            JobOutcome::Error(JobFailure::new(FailureKind::Timeout, "too slow")),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "job_finished");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["outcome"]["outcome"], "error");
        assert_eq!(json["outcome"]["kind"], "timeout");
    }
}
