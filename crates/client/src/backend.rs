//! [`Backend`] implementation over HTTP and error classification.

use async_trait::async_trait;
use rustplay_core::{Backend, BackendResponse, FailureKind, JobFailure, JobRequest};

use crate::api::{ApiError, PlaygroundApi};
use crate::wire::{CompileResponse, ErrorBody, ExecuteResponse, WireRequest};

/// Longest body excerpt kept in a failure message.
const MAX_BODY_EXCERPT: usize = 512;

#[async_trait]
impl Backend for PlaygroundApi {
    async fn dispatch(&self, request: &JobRequest) -> Result<BackendResponse, JobFailure> {
        let wire = WireRequest::from_job(request);
        let path = wire.path();
        let result = match wire {
            WireRequest::Execute(body) => self
                .post::<_, ExecuteResponse>(path, &body)
                .await
                .map(|reply| reply.into_backend_response()),
            WireRequest::Compile { body, artifact } => self
                .post::<_, CompileResponse>(path, &body)
                .await
                .map(|reply| reply.into_backend_response(artifact)),
        };

        result.map_err(|e| {
            let failure = classify(e);
            tracing::debug!(
                target_kind = %request.target(),
                failure = %failure,
                "Playground request failed",
            );
            failure
        })
    }
}

/// Map an [`ApiError`] onto the failure kinds the orchestrator reports.
pub fn classify(error: ApiError) -> JobFailure {
    match error {
        ApiError::Request(e) if e.is_timeout() => {
            JobFailure::new(FailureKind::Timeout, format!("HTTP request timed out: {e}"))
        }
        ApiError::Request(e) if e.is_decode() => JobFailure::malformed(e.to_string()),
        ApiError::Request(e) => match e.status() {
            Some(status) => JobFailure::backend(status.as_u16(), e.to_string()),
            None => JobFailure::network(e.to_string()),
        },
        ApiError::Status { status, body } => JobFailure::backend(status, error_message(&body)),
        ApiError::Decode(e) => JobFailure::malformed(e.to_string()),
    }
}

/// Pull the `error` field out of a JSON error body, or fall back to a
/// trimmed excerpt of the raw text.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    match trimmed.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
