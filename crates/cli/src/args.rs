use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rustplay_core::{
    AssemblyFlavor, Channel, CrateType, Edition, Mode, Options, ProcessAssembly, Target,
};

/// Build, run, test, or inspect Rust snippets on a remote playground.
#[derive(Debug, Parser)]
#[command(name = "rustplay", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the available targets, with notes for the current options.
    Targets {
        /// Source file used to evaluate the Wasm note.
        file: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Submit a source file for one target and print the result.
    Submit {
        /// run, build, test, asm, llvm-ir, mir, hir, or wasm.
        target: Target,

        /// Source file; reads stdin when omitted or `-`.
        file: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,

        /// Backend base URL (overrides PLAYGROUND_URL).
        #[arg(long)]
        url: Option<String>,

        /// Seconds before a job without answer fails (overrides
        /// PLAYGROUND_JOB_TIMEOUT_SECS).
        #[arg(long)]
        timeout: Option<u64>,

        /// Extra attempts for network and timeout failures.
        #[arg(long, default_value_t = 0)]
        retries: u32,

        /// Append every job event to this file as JSON lines.
        #[arg(long)]
        event_log: Option<PathBuf>,
    },
}

/// Session options shared by every subcommand.
#[derive(Debug, Args)]
pub struct OptionArgs {
    #[arg(long, default_value = "stable")]
    pub channel: Channel,

    #[arg(long, default_value = "debug")]
    pub mode: Mode,

    #[arg(long, default_value = "2021")]
    pub edition: Edition,

    /// Inferred from the source when omitted.
    #[arg(long)]
    pub crate_type: Option<CrateType>,

    #[arg(long, default_value = "att")]
    pub assembly_flavor: AssemblyFlavor,

    /// Keep mangled symbol names in assembly output.
    #[arg(long)]
    pub no_demangle: bool,

    #[arg(long, default_value = "filter")]
    pub process_assembly: ProcessAssembly,

    #[arg(long)]
    pub backtrace: bool,
}

impl OptionArgs {
    pub fn to_options(&self) -> Options {
        Options {
            channel: self.channel,
            mode: self.mode,
            edition: self.edition,
            crate_type: self.crate_type,
            assembly_flavor: self.assembly_flavor,
            demangle_assembly: !self.no_demangle,
            process_assembly: self.process_assembly,
            backtrace: self.backtrace,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn submit_parses_target_and_options() {
        let cli = Cli::try_parse_from([
            "rustplay",
            "submit",
            "llvm-ir",
            "main.rs",
            "--channel",
            "nightly",
            "--crate-type",
            "cdylib",
            "--no-demangle",
            "--retries",
            "2",
        ])
        .unwrap();

        let Command::Submit {
            target,
            file,
            options,
            retries,
            ..
        } = cli.command
        else {
            panic!("Expected the submit subcommand");
        };
        assert_eq!(target, Target::LlvmIr);
        assert_eq!(file, Some(PathBuf::from("main.rs")));
        assert_eq!(retries, 2);

        let options = options.to_options();
        assert_eq!(options.channel, Channel::Nightly);
        assert_eq!(options.crate_type, Some(CrateType::Cdylib));
        assert!(!options.demangle_assembly);
    }

    #[test]
    fn defaults_match_session_defaults() {
        let cli = Cli::try_parse_from(["rustplay", "targets"]).unwrap();
        let Command::Targets { options, file } = cli.command else {
            panic!("Expected the targets subcommand");
        };
        assert!(file.is_none());
        assert_eq!(options.to_options(), Options::default());
    }

    #[test]
    fn unknown_target_is_rejected() {
        assert_matches!(Cli::try_parse_from(["rustplay", "submit", "mri"]), Err(_));
    }
}
