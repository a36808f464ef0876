//! Terminal rendering for the menu and for job outcomes.

use std::io::Write;
use std::process::ExitCode;

use rustplay_core::{Flags, JobStatus, Target};
use rustplay_events::{JobEvent, JobOutcome};

/// Print the target catalogue, with notes for the given flags.
pub fn print_targets(out: &mut impl Write, flags: Flags) -> std::io::Result<()> {
    writeln!(out, "What do you want to do?")?;
    for target in Target::ALL {
        writeln!(out, "  {:<8} {:<8} {}", target.name(), target.label(), target.description())?;
        if let Some(note) = target.note(flags) {
            writeln!(out, "{:>19}Note: {note}", "")?;
        }
    }
    Ok(())
}

/// Write a terminal event to the terminal and pick the exit code.
///
/// | Outcome                       | Exit code |
/// |-------------------------------|-----------|
/// | Succeeded                     | 0         |
/// | Failed with compiler output   | 1         |
/// | Failed with transport failure | 2         |
/// | Cancelled                     | 130       |
pub fn print_outcome(
    stdout: &mut impl Write,
    stderr: &mut impl Write,
    event: &JobEvent,
) -> std::io::Result<u8> {
    match event {
        JobEvent::JobFinished {
            status,
            outcome: JobOutcome::Output(output),
            ..
        } => {
            if !output.stderr.is_empty() {
                write!(stderr, "{}", output.stderr)?;
                if !output.stderr.ends_with('\n') {
                    writeln!(stderr)?;
                }
            }
            write!(stdout, "{}", output.stdout)?;
            if let Some(artifact) = &output.artifact {
                if !output.stdout.is_empty() && !output.stdout.ends_with('\n') {
                    writeln!(stdout)?;
                }
                writeln!(stdout, "{}", artifact.body)?;
            }
            Ok(if *status == JobStatus::Succeeded { 0 } else { 1 })
        }
        JobEvent::JobFinished {
            outcome: JobOutcome::Error(failure),
            ..
        } => {
            writeln!(stderr, "error: {failure}")?;
            if failure.is_retryable() {
                writeln!(stderr, "hint: this failure is retryable, try --retries")?;
            }
            Ok(2)
        }
        JobEvent::JobCancelled { .. } => {
            writeln!(stderr, "cancelled")?;
            Ok(130)
        }
        JobEvent::JobStarted { .. } => Ok(0),
    }
}

pub fn exit_code(code: u8) -> ExitCode {
    ExitCode::from(code)
}
