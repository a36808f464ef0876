//! Read-only feature flags and the option rewriting they gate.
//!
//! The flags are derived from session state by the caller and passed in
//! explicitly. [`rewrite_options`] is a pure function of target, options
//! and flags; it runs before a request is handed to the orchestrator.

use serde::{Deserialize, Serialize};

use crate::options::{Channel, CrateType, Options};
use crate::target::Target;

/// Feature flags read from session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    /// HIR output is only produced by the Nightly toolchain.
    pub hir_available: bool,
    /// The source will be compiled as a `cdylib`.
    pub wasm_likely_to_work: bool,
}

impl Flags {
    /// Derive both flags from the current options and source code.
    pub fn derive(options: &Options, code: &str) -> Self {
        Self {
            hir_available: options.channel == Channel::Nightly,
            wasm_likely_to_work: options.effective_crate_type(code) == CrateType::Cdylib,
        }
    }
}

/// Adjust options so the requested target can work.
///
/// * HIR without Nightly switches the channel to Nightly.
/// * Wasm without a `cdylib` crate type sets the crate type to `cdylib`.
///
/// Every other combination returns the options unchanged.
pub fn rewrite_options(target: Target, options: &Options, flags: Flags) -> Options {
    let mut options = options.clone();
    match target {
        Target::Hir if !flags.hir_available => options.channel = Channel::Nightly,
        Target::Wasm if !flags.wasm_likely_to_work => options.crate_type = Some(CrateType::Cdylib),
        _ => {}
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = "fn main() {}";

    #[test]
    fn derive_reads_channel_and_crate_type() {
        let flags = Flags::derive(&Options::default(), MAIN);
        assert!(!flags.hir_available);
        assert!(!flags.wasm_likely_to_work);

        let nightly = Options {
            channel: Channel::Nightly,
            ..Default::default()
        };
        assert!(Flags::derive(&nightly, MAIN).hir_available);

        let cdylib_source = "#![crate_type = \"cdylib\"]\npub fn f() {}";
        assert!(Flags::derive(&Options::default(), cdylib_source).wasm_likely_to_work);
    }

    #[test]
    fn hir_without_nightly_switches_channel() {
        let options = Options::default();
        let flags = Flags::derive(&options, MAIN);
        let rewritten = rewrite_options(Target::Hir, &options, flags);
        assert_eq!(rewritten.channel, Channel::Nightly);
        assert_eq!(rewritten.crate_type, None);
    }

    #[test]
    fn hir_on_nightly_is_untouched() {
        let options = Options {
            channel: Channel::Nightly,
            ..Default::default()
        };
        let flags = Flags::derive(&options, MAIN);
        assert_eq!(rewrite_options(Target::Hir, &options, flags), options);
    }

    #[test]
    fn wasm_without_cdylib_sets_crate_type() {
        let options = Options::default();
        let flags = Flags::derive(&options, MAIN);
        let rewritten = rewrite_options(Target::Wasm, &options, flags);
        assert_eq!(rewritten.crate_type, Some(CrateType::Cdylib));
        assert_eq!(rewritten.channel, Channel::Stable);
    }

    #[test]
    fn other_targets_never_rewrite() {
        let options = Options::default();
        let flags = Flags {
            hir_available: false,
            wasm_likely_to_work: false,
        };
        for target in [Target::Run, Target::Build, Target::Test, Target::Asm, Target::Mir] {
            assert_eq!(rewrite_options(target, &options, flags), options);
        }
    }
}
