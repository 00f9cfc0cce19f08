//! Error types for the simulation harness.
//!
//! Every variant is fatal for the run: nothing in the harness retries.

use std::io;
use std::path::PathBuf;

use tickbench_config::ConfigError;

/// Errors that can occur while setting up or running a harness.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The model instance could not be constructed.
    #[error("failed to construct model '{model}': {reason}")]
    ModelConstruction {
        /// Name of the model being constructed.
        model: String,
        /// Why construction failed.
        reason: String,
    },

    /// No built-in model is registered under the requested name.
    #[error("unknown model '{name}' (available: {available})")]
    UnknownModel {
        /// The requested name.
        name: String,
        /// Comma-separated list of known models.
        available: String,
    },

    /// The trace destination could not be opened.
    #[error("failed to open trace '{}': {source}", path.display())]
    TraceOpen {
        /// Path of the trace file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),

    /// A sample was recorded out of order.
    #[error("non-monotonic trace timestamp: expected tick {expected}, got {got}")]
    NonMonotonicTimestamp {
        /// The tick the session expected next.
        expected: u64,
        /// The tick that was supplied.
        got: u64,
    },

    /// A value change referenced a signal the recorder never registered.
    #[error("unregistered trace signal {0}")]
    UnknownSignal(u32),

    /// The sequencer was stepped past the end of its schedule.
    #[error("tick schedule exhausted after {total_ticks} ticks")]
    ScheduleExhausted {
        /// Length of the schedule.
        total_ticks: u64,
    },

    /// A model snapshot did not match the ports declared to the trace.
    #[error("snapshot has {got} outputs but {expected} ports were declared")]
    InvalidSnapshot {
        /// Declared port count.
        expected: usize,
        /// Outputs present in the snapshot.
        got: usize,
    },

    /// The harness configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
