//! Classified transport failures.
//!
//! A [`JobFailure`] means the backend never produced an [`Output`](crate::job::Output)
//! for the job. Compiler diagnostics are not failures in this sense; they
//! travel as normal output on a job whose status is `Failed`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Why a backend call did not produce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// The backend could not be reached.
    Network,
    /// The backend answered with a non-success HTTP status.
    Backend { status: u16 },
    /// The backend answered 2xx but the body could not be decoded.
    MalformedResponse,
    /// No answer within the configured window.
    Timeout,
}

/// A classified failure plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    #[serde(flatten)]
    pub kind: FailureKind,
    pub message: String,
}

impl JobFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Network, message)
    }

    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Backend { status }, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::MalformedResponse, message)
    }

    /// Failure for a job that exceeded `limit`.
    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            FailureKind::Timeout,
            format!("No response from the backend within {} ms", limit.as_millis()),
        )
    }

    /// Network and timeout failures may succeed if tried again.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, FailureKind::Network | FailureKind::Timeout)
    }
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FailureKind::Network => write!(f, "network error: {}", self.message),
            FailureKind::Backend { status } => {
                write!(f, "backend error ({status}): {}", self.message)
            }
            FailureKind::MalformedResponse => write!(f, "malformed response: {}", self.message),
            FailureKind::Timeout => write!(f, "timeout: {}", self.message),
        }
    }
}

impl std::error::Error for JobFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_and_timeout_are_retryable() {
        assert!(JobFailure::network("refused").is_retryable());
        assert!(JobFailure::timeout(Duration::from_secs(1)).is_retryable());
        assert!(!JobFailure::backend(503, "busy").is_retryable());
        assert!(!JobFailure::malformed("eof").is_retryable());
    }

    #[test]
    fn timeout_message_mentions_limit() {
        let failure = JobFailure::timeout(Duration::from_millis(250));
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert!(failure.message.contains("250 ms"));
    }

    #[test]
    fn serializes_kind_inline() {
        let json = serde_json::to_value(JobFailure::backend(502, "bad gateway")).unwrap();
        assert_eq!(json["kind"], "backend");
        assert_eq!(json["status"], 502);
        assert_eq!(json["message"], "bad gateway");
    }
}
