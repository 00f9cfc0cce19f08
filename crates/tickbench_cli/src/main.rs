//! tickbench CLI: drives a circuit model through a clock/reset schedule and
//! writes a VCD waveform.
//!
//! `tickbench run` simulates a model for the configured number of ticks;
//! `tickbench check` reads a trace back and verifies it holds exactly one
//! sample per tick.

#![warn(missing_docs)]

mod check;
mod run;

use std::process;

use clap::{Parser, Subcommand};

/// tickbench: cycle-driven stimulus and waveform capture.
#[derive(Parser, Debug)]
#[command(name = "tickbench", version, about = "Clock/reset harness for circuit models")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `tickbench.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate a model and record its waveform.
    Run(RunArgs),
    /// Verify that a VCD trace has one sample per tick.
    Check(CheckArgs),
}

/// Arguments for `tickbench run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Number of ticks to simulate (overrides `run.total_ticks`).
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Tick at which reset is released (overrides `run.reset_release_tick`).
    #[arg(long)]
    pub reset_release: Option<u64>,

    /// Built-in model to simulate (overrides `model.name`).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output path for the waveform file (overrides `trace.path`).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Disable waveform recording.
    #[arg(long)]
    pub no_trace: bool,

    /// Arguments after `--`, passed unchanged to the model runtime.
    #[arg(last = true)]
    pub model_args: Vec<String>,
}

/// Arguments for `tickbench check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// The VCD file to check.
    pub trace: String,

    /// Expected number of samples.
    #[arg(long)]
    pub ticks: Option<u64>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr logger. `RUST_LOG` wins over the flag-derived default.
fn init_logging(global: &GlobalArgs) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_level(global)),
    )
    .format_timestamp(None)
    .init();
}

fn default_log_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}
