//! JSON bodies exchanged with the playground backend.
//!
//! Run, Build and Test go to `POST /execute`; the emitting targets go to
//! `POST /compile`. Keys are camelCase on the wire. Replies are decoded
//! into [`ExecuteResponse`] / [`CompileResponse`] and then folded into a
//! transport-neutral [`BackendResponse`].

use rustplay_core::{
    Artifact, ArtifactKind, AssemblyFlavor, BackendResponse, Channel, CrateType, Edition,
    JobRequest, Mode, Output, ProcessAssembly, Target,
};
use serde::{Deserialize, Serialize};

/// Endpoint for Run, Build and Test, relative to the base URL.
pub const EXECUTE_PATH: &str = "/execute";
/// Endpoint for the emitting targets, relative to the base URL.
pub const COMPILE_PATH: &str = "/compile";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Which cargo-like action `/execute` performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecuteAction {
    Run,
    Build,
    Test,
}

/// Body for `POST /execute`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest<'a> {
    pub channel: Channel,
    pub mode: Mode,
    pub edition: Edition,
    pub crate_type: CrateType,
    pub tests: bool,
    pub backtrace: bool,
    pub code: &'a str,
    pub action: ExecuteAction,
}

/// Intermediate form requested from `/compile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompileTarget {
    Asm,
    LlvmIr,
    Mir,
    Hir,
    Wasm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DemangleAssembly {
    Demangle,
    Mangle,
}

/// Body for `POST /compile`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest<'a> {
    pub target: CompileTarget,
    pub assembly_flavor: AssemblyFlavor,
    pub demangle_assembly: DemangleAssembly,
    pub process_assembly: ProcessAssembly,
    pub channel: Channel,
    pub mode: Mode,
    pub edition: Edition,
    pub crate_type: CrateType,
    pub tests: bool,
    pub backtrace: bool,
    pub code: &'a str,
}

/// A job translated into the request the backend expects.
#[derive(Debug)]
pub enum WireRequest<'a> {
    Execute(ExecuteRequest<'a>),
    Compile {
        body: CompileRequest<'a>,
        artifact: ArtifactKind,
    },
}

impl<'a> WireRequest<'a> {
    /// Translate a job request. An unset crate type is inferred from the
    /// source here, so the backend always receives an explicit one.
    pub fn from_job(request: &'a JobRequest) -> Self {
        match request.target() {
            Target::Run => Self::execute(request, ExecuteAction::Run),
            Target::Build => Self::execute(request, ExecuteAction::Build),
            Target::Test => Self::execute(request, ExecuteAction::Test),
            Target::Asm => Self::compile(request, CompileTarget::Asm, ArtifactKind::Assembly),
            Target::LlvmIr => Self::compile(request, CompileTarget::LlvmIr, ArtifactKind::LlvmIr),
            Target::Mir => Self::compile(request, CompileTarget::Mir, ArtifactKind::Mir),
            Target::Hir => Self::compile(request, CompileTarget::Hir, ArtifactKind::Hir),
            Target::Wasm => Self::compile(request, CompileTarget::Wasm, ArtifactKind::Wasm),
        }
    }

    fn execute(request: &'a JobRequest, action: ExecuteAction) -> Self {
        let options = request.options();
        let code = request.source_code();
        WireRequest::Execute(ExecuteRequest {
            channel: options.channel,
            mode: options.mode,
            edition: options.edition,
            crate_type: options.effective_crate_type(code),
            tests: action == ExecuteAction::Test,
            backtrace: options.backtrace,
            code,
            action,
        })
    }

    fn compile(request: &'a JobRequest, target: CompileTarget, artifact: ArtifactKind) -> Self {
        let options = request.options();
        let code = request.source_code();
        WireRequest::Compile {
            body: CompileRequest {
                target,
                assembly_flavor: options.assembly_flavor,
                demangle_assembly: if options.demangle_assembly {
                    DemangleAssembly::Demangle
                } else {
                    DemangleAssembly::Mangle
                },
                process_assembly: options.process_assembly,
                channel: options.channel,
                mode: options.mode,
                edition: options.edition,
                crate_type: options.effective_crate_type(code),
                tests: false,
                backtrace: options.backtrace,
                code,
            },
            artifact,
        }
    }

    /// Endpoint path, relative to the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            WireRequest::Execute(_) => EXECUTE_PATH,
            WireRequest::Compile { .. } => COMPILE_PATH,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Reply from `/execute`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub success: bool,
    /// Short exit summary, e.g. "Exited with status 101".
    #[serde(default)]
    pub exit_detail: Option<String>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

/// Reply from `/compile`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileResponse {
    pub success: bool,
    /// The emitted artifact text.
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

/// Error body some non-2xx replies carry.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ExecuteResponse {
    /// The exit detail, when present, is appended to stderr.
    pub fn into_backend_response(self) -> BackendResponse {
        let mut stderr = self.stderr;
        if let Some(detail) = self.exit_detail.filter(|d| !d.is_empty()) {
            if !stderr.is_empty() && !stderr.ends_with('\n') {
                stderr.push('\n');
            }
            stderr.push_str(&detail);
        }
        BackendResponse {
            success: self.success,
            output: Output {
                stdout: self.stdout,
                stderr,
                artifact: None,
            },
        }
    }
}

impl CompileResponse {
    /// An empty `code` (typical for failed builds) yields no artifact.
    pub fn into_backend_response(self, kind: ArtifactKind) -> BackendResponse {
        let artifact = (!self.code.is_empty()).then(|| Artifact {
            kind,
            body: self.code,
        });
        BackendResponse {
            success: self.success,
            output: Output {
                stdout: self.stdout,
                stderr: self.stderr,
                artifact,
            },
        }
    }
}
