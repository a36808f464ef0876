//! JSON-lines event log.
//!
//! [`EventLog`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and appends every received [`JobEvent`] to a writer,
//! one JSON object per line. It runs as a background task and finishes
//! when the bus is dropped.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

use crate::bus::JobEvent;

/// Errors from writing a single event.
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write event: {0}")]
    Io(#[from] std::io::Error),
}

/// Background service that records job events.
pub struct EventLog;

impl EventLog {
    /// Run the logging loop.
    ///
    /// Writes every event from `receiver` to `writer` until the channel is
    /// closed, then flushes and hands the writer back. Write failures are
    /// logged and the loop keeps going.
    pub async fn run<W>(mut writer: W, mut receiver: broadcast::Receiver<JobEvent>) -> W
    where
        W: AsyncWrite + Unpin,
    {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::append(&mut writer, &event).await {
                        tracing::error!(
                            error = %e,
                            event = event.name(),
                            job_id = %event.job_id(),
                            "Failed to record event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event log lagged, some events were not recorded");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Event bus closed, event log shutting down");
                    break;
                }
            }
        }

        if let Err(e) = writer.flush().await {
            tracing::error!(error = %e, "Failed to flush event log");
        }
        writer
    }

    /// Write one event as a single JSON line.
    async fn append<W>(writer: &mut W, event: &JobEvent) -> Result<(), EventLogError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        Ok(())
    }
}
