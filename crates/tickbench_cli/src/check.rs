//! `tickbench check`: verify a trace's one-sample-per-tick contract.

use std::path::Path;

use tickbench_sim::{read_trace_file, TraceCheckError};

use crate::{CheckArgs, GlobalArgs};

/// Runs the `tickbench check` command.
///
/// Returns exit code 0 for a valid trace and 1 for a contract violation,
/// including a trace left behind by a run that stopped early.
/// Unreadable or malformed files are errors.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let path = Path::new(&args.trace);
    let report = read_trace_file(path)?;

    match report.verify(args.ticks) {
        Ok(()) => {
            if !global.quiet {
                let timescale = report
                    .timescale
                    .map_or_else(|| "unspecified".to_string(), |t| t.to_string());
                eprintln!(
                    "   {}: {} samples, {} signals, timescale {timescale}",
                    path.display(),
                    report.sample_count(),
                    report.signals.len()
                );
            }
            Ok(0)
        }
        Err(
            e @ (TraceCheckError::NonContiguous { .. }
            | TraceCheckError::SampleCount { .. }
            | TraceCheckError::Aborted { .. }
            | TraceCheckError::Unterminated),
        ) => {
            if !global.quiet {
                eprintln!("   FAILED: {}: {e}", path.display());
            }
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
