//! Build menu targets.
//!
//! A [`Target`] is the kind of work requested from the backend: build and
//! run, build only, run tests, or emit one of the intermediate forms
//! (assembly, LLVM IR, MIR, HIR, WebAssembly). The menu text shown for each
//! target lives here too so every front end renders the same catalogue.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::flags::Flags;

/// The requested compiler/runtime output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    Run,
    Build,
    Test,
    Asm,
    LlvmIr,
    Mir,
    Hir,
    Wasm,
}

/// Note shown under HIR when the session is not on the Nightly channel.
pub const HIR_NOTE: &str = "HIR currently requires using the Nightly channel, \
                            selecting this option will switch to Nightly.";

/// Note shown under Wasm when the source does not ask for a `cdylib`.
pub const WASM_NOTE: &str = "WebAssembly works best when using the cdylib crate type, \
                             but the source code does not specify an explicit crate type. \
                             Selecting this option will change the crate type to cdylib.";

impl Target {
    /// Every target, in menu order.
    pub const ALL: [Target; 8] = [
        Target::Run,
        Target::Build,
        Target::Test,
        Target::Asm,
        Target::LlvmIr,
        Target::Mir,
        Target::Hir,
        Target::Wasm,
    ];

    /// Short menu label.
    pub fn label(self) -> &'static str {
        match self {
            Target::Run => "Run",
            Target::Build => "Build",
            Target::Test => "Test",
            Target::Asm => "ASM",
            Target::LlvmIr => "LLVM IR",
            Target::Mir => "MIR",
            Target::Hir => "HIR",
            Target::Wasm => "Wasm",
        }
    }

    /// Machine name, used on the command line and on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Target::Run => "run",
            Target::Build => "build",
            Target::Test => "test",
            Target::Asm => "asm",
            Target::LlvmIr => "llvm-ir",
            Target::Mir => "mir",
            Target::Hir => "hir",
            Target::Wasm => "wasm",
        }
    }

    /// One-line menu description.
    pub fn description(self) -> &'static str {
        match self {
            Target::Run => {
                "Build and run the code, showing the output. Equivalent to `cargo run`."
            }
            Target::Build => "Build the code without running it. Equivalent to `cargo build`.",
            Target::Test => "Build the code and run all the tests. Equivalent to `cargo test`.",
            Target::Asm => "Build and show the resulting assembly code.",
            Target::LlvmIr => {
                "Build and show the resulting LLVM IR, LLVM's intermediate representation."
            }
            Target::Mir => {
                "Build and show the resulting MIR, Rust's control-flow-based intermediate representation."
            }
            Target::Hir => {
                "Build and show the resulting HIR, Rust's syntax-based intermediate representation."
            }
            Target::Wasm => {
                "Build a WebAssembly module for web browsers, in the .WAT textual representation."
            }
        }
    }

    /// Extra note to show next to the menu item, if the current flags
    /// mean selecting it will rewrite the session options.
    pub fn note(self, flags: Flags) -> Option<&'static str> {
        match self {
            Target::Hir if !flags.hir_available => Some(HIR_NOTE),
            Target::Wasm if !flags.wasm_likely_to_work => Some(WASM_NOTE),
            _ => None,
        }
    }

    /// True for targets that produce an artifact instead of running code.
    pub fn emits_artifact(self) -> bool {
        matches!(
            self,
            Target::Asm | Target::LlvmIr | Target::Mir | Target::Hir | Target::Wasm
        )
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownName {
                kind: "target",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_every_cli_name() {
        for target in Target::ALL {
            assert_eq!(target.name().parse::<Target>().unwrap(), target);
        }
        assert_eq!("LLVM-IR".parse::<Target>().unwrap(), Target::LlvmIr);
    }

    #[test]
    fn unknown_target_is_rejected() {
        assert_matches!(
            "mri".parse::<Target>(),
            Err(CoreError::UnknownName { kind: "target", .. })
        );
    }

    #[test]
    fn notes_follow_flags() {
        let all_off = Flags {
            hir_available: false,
            wasm_likely_to_work: false,
        };
        let all_on = Flags {
            hir_available: true,
            wasm_likely_to_work: true,
        };

        assert_eq!(Target::Hir.note(all_off), Some(HIR_NOTE));
        assert_eq!(Target::Wasm.note(all_off), Some(WASM_NOTE));
        assert_eq!(Target::Run.note(all_off), None);
        assert_eq!(Target::Hir.note(all_on), None);
        assert_eq!(Target::Wasm.note(all_on), None);
    }

    #[test]
    fn menu_order_starts_with_run_and_ends_with_wasm() {
        assert_eq!(Target::ALL.first(), Some(&Target::Run));
        assert_eq!(Target::ALL.last(), Some(&Target::Wasm));
        assert!(!Target::Test.emits_artifact());
        assert!(Target::Wasm.emits_artifact());
    }
}
