//! The tick loop tying model, sequencer and trace together.

use std::path::{Path, PathBuf};

use tickbench_config::{HarnessConfig, TickSchedule};

use crate::args::RuntimeArgs;
use crate::error::SimError;
use crate::model::{ModelHandle, SimModel};
use crate::sequencer::ClockSequencer;
use crate::trace::{TraceSession, VcdFileRecorder, VcdFileSession};
use crate::waveform::WaveformRecorder;

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Name of the model that was simulated.
    pub model: String,
    /// Ticks applied.
    pub ticks: u64,
    /// Tick at which reset was released.
    pub reset_release_tick: u64,
    /// Trace samples written (0 when tracing is disabled).
    pub samples: u64,
    /// Trace file, if one was written.
    pub trace_path: Option<PathBuf>,
}

/// Runs a model through a fixed [`TickSchedule`].
#[derive(Clone, Copy, Debug)]
pub struct Harness {
    schedule: TickSchedule,
}

impl Harness {
    /// Creates a harness for the given schedule.
    pub fn new(schedule: TickSchedule) -> Self {
        Self { schedule }
    }

    /// Applies every tick, sampling after each evaluation, then finalizes
    /// the model and closes the trace, in that order.
    ///
    /// On error both resources are still released by their `Drop` impls,
    /// model first, and the trace is marked aborted.
    pub fn run<M: SimModel, R: WaveformRecorder>(
        &self,
        model: ModelHandle<M>,
        trace: Option<TraceSession<R>>,
    ) -> Result<RunSummary, SimError> {
        // Locals drop in reverse order: model finalizes before trace closes.
        let mut trace = trace;
        let mut model = model;
        let mut sequencer = ClockSequencer::new(self.schedule);

        log::debug!("running '{}': {}", model.name(), self.schedule);
        while !sequencer.is_done() {
            let tick = sequencer.step(&mut model)?;
            if let Some(session) = trace.as_mut() {
                session.record(tick, &model.snapshot())?;
            }
        }

        let name = model.name().to_string();
        let ticks = sequencer.next_tick();
        model.finalize();
        let (samples, trace_path) = match trace {
            Some(session) => {
                let path = session.path().map(Path::to_path_buf);
                (session.close()?, path)
            }
            None => (0, None),
        };

        Ok(RunSummary {
            model: name,
            ticks,
            reset_release_tick: self.schedule.reset_release_tick(),
            samples,
            trace_path,
        })
    }
}

/// Constructs `M`, opens the configured VCD trace, and runs the schedule.
///
/// The model sees `config.model.args` followed by `forwarded`. Model
/// construction happens before the trace file is created, so a model that
/// fails to build leaves no trace behind.
pub fn simulate<M: SimModel>(
    config: &HarnessConfig,
    forwarded: &RuntimeArgs,
) -> Result<RunSummary, SimError> {
    config.validate()?;
    let harness = Harness::new(config.run.schedule()?);

    let mut args = RuntimeArgs::new(config.model.args.iter().cloned());
    args.extend(forwarded.as_slice().iter().cloned());
    let model = ModelHandle::<M>::create(&args)?;

    if !config.trace.enabled {
        return harness.run::<M, VcdFileRecorder>(model, None);
    }

    let trace = VcdFileSession::create(
        &config.trace.path,
        config.trace.timescale,
        model.name(),
        model.ports(),
        config.trace.depth,
    )?;
    harness.run(model, Some(trace))
}
