//! `tickbench run`: simulate a built-in model and record its waveform.

use std::path::{Path, PathBuf};

use tickbench_config::{find_config, load_config, HarnessConfig};
use tickbench_sim::{simulate_builtin, RuntimeArgs};

use crate::{GlobalArgs, RunArgs};

/// Runs the `tickbench run` command. Returns the process exit code.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = load_harness_config(global, &std::env::current_dir()?)?;
    apply_overrides(&mut config, args);
    config.validate()?;

    if !global.quiet {
        eprintln!(
            "   Simulating {} ({} ticks, reset released at tick {})",
            config.model.name, config.run.total_ticks, config.run.reset_release_tick
        );
    }

    let forwarded = RuntimeArgs::new(args.model_args.iter().cloned());
    let summary = simulate_builtin(&config, &forwarded)?;

    if !global.quiet {
        eprintln!(
            "   Finished {} ticks ({} samples)",
            summary.ticks, summary.samples
        );
        if let Some(ref path) = summary.trace_path {
            eprintln!("   Waveform: {}", path.display());
        }
    }
    Ok(0)
}

/// Loads `--config`, else `./tickbench.toml`, else the built-in defaults.
fn load_harness_config(
    global: &GlobalArgs,
    cwd: &Path,
) -> Result<HarnessConfig, Box<dyn std::error::Error>> {
    let path = match global.config {
        Some(ref explicit) => Some(PathBuf::from(explicit)),
        None => find_config(cwd),
    };
    match path {
        Some(path) => {
            log::debug!("loading configuration from {}", path.display());
            Ok(load_config(&path)?)
        }
        None => Ok(HarnessConfig::default()),
    }
}

/// Applies command-line overrides on top of the file configuration.
fn apply_overrides(config: &mut HarnessConfig, args: &RunArgs) {
    if let Some(ticks) = args.ticks {
        config.run.total_ticks = ticks;
    }
    if let Some(release) = args.reset_release {
        config.run.reset_release_tick = release;
    }
    if let Some(ref model) = args.model {
        config.model.name = model.clone();
    }
    if let Some(ref output) = args.output {
        config.trace.path = PathBuf::from(output);
    }
    if args.no_trace {
        config.trace.enabled = false;
    }
}
