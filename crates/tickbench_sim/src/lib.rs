//! Cycle-driven stimulus and waveform capture for synchronous circuit models.
//!
//! A run advances a tick counter from 0 to `total_ticks - 1`. On every tick
//! the [`ClockSequencer`] drives `clk` and `reset` onto the model held by a
//! [`ModelHandle`], the model evaluates, and the [`TraceSession`] records the
//! settled state with a timestamp equal to the tick index. When the loop
//! ends the model is finalized and the trace closed.
//!
//! # Usage
//!
//! ```ignore
//! use tickbench_config::HarnessConfig;
//! use tickbench_sim::{simulate, CounterModel, RuntimeArgs};
//!
//! let config = HarnessConfig::default();
//! let summary = simulate::<CounterModel>(&config, &RuntimeArgs::default())?;
//! println!("{} samples written", summary.samples);
//! ```
//!
//! # Modules
//!
//! - `model` — the [`SimModel`] boundary and its owner
//! - `sequencer` — clock toggling and reset schedule
//! - `waveform` — trace writers (VCD)
//! - `trace` — the per-run trace session
//! - `harness` — the tick loop
//! - `models` — built-in reference models
//! - `check` — reading a trace back and checking it

#![warn(missing_docs)]

pub mod args;
pub mod check;
pub mod error;
pub mod harness;
pub mod model;
pub mod models;
pub mod sequencer;
pub mod trace;
pub mod waveform;

pub use args::RuntimeArgs;
pub use check::{
    read_trace, read_trace_file, TraceCheckError, TraceReport, TraceSignalDef, TraceStatus,
};
pub use error::SimError;
pub use harness::{simulate, Harness, RunSummary};
pub use model::{ModelHandle, ModelSnapshot, PinLevels, PortDecl, SimModel};
pub use models::{simulate_builtin, BlinkyModel, CounterModel, BUILTIN_MODELS};
pub use sequencer::{ClockSequencer, SequencerState};
pub use trace::{TraceSession, VcdFileRecorder, VcdFileSession};
pub use waveform::{TraceSignalId, VcdRecorder, WaveformRecorder};
