//! Domain types for the playground job orchestrator.
//!
//! No network I/O lives here: targets and options, the feature flags and the
//! option rewriting they gate, jobs and their lifecycle, classified
//! failures, env config helpers, and the [`Backend`] trait that
//! transports implement.

pub mod backend;
pub mod config;
pub mod error;
pub mod failure;
pub mod flags;
pub mod job;
pub mod options;
pub mod target;
pub mod types;

pub use backend::Backend;
pub use config::ConfigError;
pub use error::CoreError;
pub use failure::{FailureKind, JobFailure};
pub use flags::{rewrite_options, Flags};
pub use job::{Artifact, ArtifactKind, BackendResponse, Job, JobRequest, JobStatus, Output};
pub use options::{AssemblyFlavor, Channel, CrateType, Edition, Mode, Options, ProcessAssembly};
pub use target::Target;
pub use types::{JobId, Timestamp};
