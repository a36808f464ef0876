//! Jobs and their lifecycle.
//!
//! A [`Job`] wraps one immutable [`JobRequest`] and moves exactly once
//! from `Pending` to one of the terminal statuses. Once terminal, the
//! status and result never change again.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::failure::JobFailure;
use crate::flags::{rewrite_options, Flags};
use crate::options::Options;
use crate::target::Target;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// JobRequest
// ---------------------------------------------------------------------------

/// What to build, from which source, with which options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    target: Target,
    source_code: String,
    options: Options,
}

impl JobRequest {
    /// Build a request as-is, without consulting any flags.
    pub fn new(target: Target, source_code: impl Into<String>, options: Options) -> Self {
        Self {
            target,
            source_code: source_code.into(),
            options,
        }
    }

    /// Build a request after applying [`rewrite_options`] for `flags`.
    pub fn prepare(
        target: Target,
        source_code: impl Into<String>,
        options: &Options,
        flags: Flags,
    ) -> Self {
        Self::new(target, source_code, rewrite_options(target, options, flags))
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Which intermediate form an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Assembly,
    LlvmIr,
    Mir,
    Hir,
    Wasm,
}

impl ArtifactKind {
    /// Artifact kind produced by a target, if it produces one.
    pub fn for_target(target: Target) -> Option<Self> {
        match target {
            Target::Asm => Some(ArtifactKind::Assembly),
            Target::LlvmIr => Some(ArtifactKind::LlvmIr),
            Target::Mir => Some(ArtifactKind::Mir),
            Target::Hir => Some(ArtifactKind::Hir),
            Target::Wasm => Some(ArtifactKind::Wasm),
            Target::Run | Target::Build | Target::Test => None,
        }
    }
}

/// Emitted compiler output. Wasm modules arrive in `.wat` text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub body: String,
}

/// Everything the backend printed for a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
    pub artifact: Option<Artifact>,
}

/// A decoded backend reply.
///
/// `success == false` means the backend ran but the build or program
/// failed; diagnostics are in `output.stderr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub success: bool,
    pub output: Output,
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One submitted request and what became of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub request: JobRequest,
    pub status: JobStatus,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub result: Option<Output>,
    pub failure: Option<JobFailure>,
}

impl Job {
    /// A fresh pending job with a new id.
    pub fn new(request: JobRequest) -> Self {
        Self {
            id: JobId::new(),
            request,
            status: JobStatus::Pending,
            started_at: Utc::now(),
            finished_at: None,
            result: None,
            failure: None,
        }
    }

    /// Apply a backend reply: `Succeeded` or `Failed` depending on
    /// `response.success`, keeping the output either way.
    pub fn complete(&mut self, response: BackendResponse) -> Result<JobStatus, CoreError> {
        let status = if response.success {
            JobStatus::Succeeded
        } else {
            JobStatus::Failed
        };
        self.transition(status)?;
        self.result = Some(response.output);
        Ok(status)
    }

    /// Mark the job failed with a transport failure.
    pub fn fail(&mut self, failure: JobFailure) -> Result<(), CoreError> {
        self.transition(JobStatus::Failed)?;
        self.failure = Some(failure);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), CoreError> {
        self.transition(JobStatus::Cancelled)
    }

    fn transition(&mut self, to: JobStatus) -> Result<(), CoreError> {
        if self.status.is_terminal() || !to.is_terminal() {
            return Err(CoreError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.finished_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn run_job() -> Job {
        Job::new(JobRequest::new(Target::Run, "fn main() {}", Options::default()))
    }

    fn response(success: bool, stdout: &str) -> BackendResponse {
        BackendResponse {
            success,
            output: Output {
                stdout: stdout.into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn new_job_is_pending() {
        let job = run_job();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.finished_at.is_none());
        assert!(job.result.is_none());
    }

    #[test]
    fn successful_reply_succeeds() {
        let mut job = run_job();
        assert_eq!(job.complete(response(true, "Hello")).unwrap(), JobStatus::Succeeded);
        assert_eq!(job.result.as_ref().unwrap().stdout, "Hello");
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn unsuccessful_reply_fails_but_keeps_output() {
        let mut job = run_job();
        assert_eq!(job.complete(response(false, "")).unwrap(), JobStatus::Failed);
        assert!(job.result.is_some());
        assert!(job.failure.is_none());
    }

    #[test]
    fn terminal_status_is_immutable() {
        let mut job = run_job();
        job.cancel().unwrap();

        assert_matches!(
            job.complete(response(true, "late")),
            Err(CoreError::InvalidTransition {
                from: JobStatus::Cancelled,
                to: JobStatus::Succeeded,
                ..
            })
        );
        assert_matches!(job.fail(JobFailure::network("x")), Err(_));
        assert_matches!(job.cancel(), Err(_));
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.result.is_none());
        assert!(job.failure.is_none());
    }

    #[test]
    fn prepare_applies_rewrite() {
        let flags = Flags {
            hir_available: false,
            wasm_likely_to_work: true,
        };
        let request = JobRequest::prepare(Target::Hir, "fn main() {}", &Options::default(), flags);
        assert_eq!(request.options().channel, crate::options::Channel::Nightly);
    }

    #[test]
    fn artifact_kind_matches_emitting_targets() {
        for target in Target::ALL {
            assert_eq!(
                ArtifactKind::for_target(target).is_some(),
                target.emits_artifact()
            );
        }
    }
}
