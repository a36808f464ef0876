//! Transport seam between the orchestrator and a compiler service.

use async_trait::async_trait;

use crate::failure::JobFailure;
use crate::job::{BackendResponse, JobRequest};

/// A service that can build, run, or emit output for a [`JobRequest`].
///
/// Implementations classify their own transport errors into a
/// [`JobFailure`]. Compiler errors are not transport errors: they come
/// back as a [`BackendResponse`] with `success == false`.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn dispatch(&self, request: &JobRequest) -> Result<BackendResponse, JobFailure>;
}
