//! Scoped ownership of the trace destination.
//!
//! A [`TraceSession`] is opened once, receives exactly one sample per tick
//! with timestamps `0, 1, 2, ...`, and is closed once. [`TraceSession::close`]
//! marks the trace complete; a session dropped without it is closed by `Drop`
//! and marked aborted, so a cut-short run never leaves a trace that reads
//! back as valid.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tickbench_common::LogicVec;
use tickbench_config::Timescale;

use crate::error::SimError;
use crate::model::{ModelSnapshot, PortDecl};
use crate::waveform::{TraceSignalId, VcdRecorder, WaveformRecorder};

/// VCD recorder over a buffered file.
pub type VcdFileRecorder = VcdRecorder<BufWriter<File>>;

/// A session writing VCD to a buffered file.
pub type VcdFileSession = TraceSession<VcdFileRecorder>;

/// Per-signal bookkeeping for change detection.
struct Traced {
    id: TraceSignalId,
    last: Option<LogicVec>,
}

/// Ordered, change-compressed capture of model state across ticks.
pub struct TraceSession<R: WaveformRecorder> {
    recorder: R,
    clk: Traced,
    reset: Traced,
    /// One entry per declared port; `None` for ports deeper than the trace depth.
    outputs: Vec<Option<Traced>>,
    destination: Option<PathBuf>,
    next_tick: u64,
    closed: bool,
}

impl VcdFileSession {
    /// Creates the VCD file at `path` and declares the model's signals.
    ///
    /// Failing to create the file is [`SimError::TraceOpen`].
    pub fn create(
        path: &Path,
        timescale: Timescale,
        top: &str,
        ports: &[PortDecl],
        depth: u32,
    ) -> Result<Self, SimError> {
        let file = File::create(path).map_err(|source| SimError::TraceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("opened trace {}", path.display());
        let recorder = VcdRecorder::new(BufWriter::new(file), timescale);
        let mut session = Self::open(recorder, top, ports, depth)?;
        session.destination = Some(path.to_path_buf());
        Ok(session)
    }
}

impl<R: WaveformRecorder> TraceSession<R> {
    /// Declares `clk`, `reset` and every port within `depth` scope levels.
    pub fn open(
        mut recorder: R,
        top: &str,
        ports: &[PortDecl],
        depth: u32,
    ) -> Result<Self, SimError> {
        recorder.begin_scope(top)?;
        let clk = Traced::new(recorder.register_signal("clk", 1)?);
        let reset = Traced::new(recorder.register_signal("reset", 1)?);

        // Group ports by scope path so each scope is opened once; stable
        // sort keeps declaration order within a scope.
        let mut order: Vec<usize> = (0..ports.len())
            .filter(|&i| ports[i].depth() <= depth)
            .collect();
        order.sort_by(|&a, &b| ports[a].scope_path().cmp(&ports[b].scope_path()));

        let mut outputs: Vec<Option<Traced>> = ports.iter().map(|_| None).collect();
        let mut open_scopes: Vec<&str> = Vec::new();
        for idx in order {
            let port = &ports[idx];
            let path = port.scope_path();
            let common = open_scopes
                .iter()
                .zip(&path)
                .take_while(|(a, b)| a == b)
                .count();
            while open_scopes.len() > common {
                recorder.end_scope()?;
                open_scopes.pop();
            }
            for &scope in &path[common..] {
                recorder.begin_scope(scope)?;
                open_scopes.push(scope);
            }
            let id = recorder.register_signal(port.leaf_name(), port.width)?;
            outputs[idx] = Some(Traced::new(id));
        }
        for _ in open_scopes {
            recorder.end_scope()?;
        }
        recorder.end_scope()?;

        let skipped = outputs.iter().filter(|o| o.is_none()).count();
        if skipped > 0 {
            log::debug!("trace depth {depth} excludes {skipped} port(s)");
        }

        Ok(Self {
            recorder,
            clk,
            reset,
            outputs,
            destination: None,
            next_tick: 0,
            closed: false,
        })
    }

    /// Appends the sample for `tick`.
    ///
    /// `tick` must equal the number of samples recorded so far; anything
    /// else is [`SimError::NonMonotonicTimestamp`].
    pub fn record(&mut self, tick: u64, snapshot: &ModelSnapshot) -> Result<(), SimError> {
        if tick != self.next_tick {
            return Err(SimError::NonMonotonicTimestamp {
                expected: self.next_tick,
                got: tick,
            });
        }
        if snapshot.outputs.len() != self.outputs.len() {
            return Err(SimError::InvalidSnapshot {
                expected: self.outputs.len(),
                got: snapshot.outputs.len(),
            });
        }

        self.recorder.begin_sample(tick)?;
        self.clk
            .update(&mut self.recorder, LogicVec::filled(1, snapshot.clk))?;
        self.reset
            .update(&mut self.recorder, LogicVec::filled(1, snapshot.reset))?;
        for (slot, value) in self.outputs.iter_mut().zip(&snapshot.outputs) {
            if let Some(traced) = slot {
                traced.update(&mut self.recorder, value.clone())?;
            }
        }

        self.next_tick += 1;
        Ok(())
    }

    /// Number of samples recorded so far.
    pub fn samples(&self) -> u64 {
        self.next_tick
    }

    /// File the session writes to, if it was created from a path.
    pub fn path(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Marks the trace complete, finalizes the recorder and returns the
    /// number of samples written.
    pub fn close(mut self) -> Result<u64, SimError> {
        self.closed = true;
        log::debug!("closing trace after {} sample(s)", self.next_tick);
        self.recorder.finalize()?;
        Ok(self.next_tick)
    }
}

impl<R: WaveformRecorder> Drop for TraceSession<R> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        log::warn!("trace aborted after {} sample(s)", self.next_tick);
        if let Err(e) = self.recorder.abort() {
            log::warn!("failed to close trace: {e}");
        }
    }
}

impl Traced {
    fn new(id: TraceSignalId) -> Self {
        Self { id, last: None }
    }

    /// Writes `value` if it differs from the last written value.
    fn update<R: WaveformRecorder>(
        &mut self,
        recorder: &mut R,
        value: LogicVec,
    ) -> Result<(), SimError> {
        if self.last.as_ref() == Some(&value) {
            return Ok(());
        }
        recorder.record_change(self.id, &value)?;
        self.last = Some(value);
        Ok(())
    }
}
