//! Waveform writers.
//!
//! The [`WaveformRecorder`] trait is the trace-writer boundary: it knows how
//! to declare scopes and signals and how to encode one sample's value
//! changes. [`VcdRecorder`] implements the IEEE 1364 Value Change Dump
//! format, readable by GTKWave, Surfer and other viewers.

use std::io::Write;

use tickbench_common::LogicVec;
use tickbench_config::Timescale;

use crate::error::SimError;

/// Recorder-assigned handle for a registered signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceSignalId(u32);

impl TraceSignalId {
    /// Creates an ID from its raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// Trait for writing waveform samples in some on-disk format.
pub trait WaveformRecorder {
    /// Opens a new scope (hierarchy level).
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError>;

    /// Closes the innermost open scope.
    fn end_scope(&mut self) -> Result<(), SimError>;

    /// Declares a signal in the current scope.
    fn register_signal(&mut self, name: &str, width: u32) -> Result<TraceSignalId, SimError>;

    /// Starts the sample at `time`. Every change until the next call
    /// belongs to this sample.
    fn begin_sample(&mut self, time: u64) -> Result<(), SimError>;

    /// Records a new value for a signal in the current sample.
    fn record_change(&mut self, id: TraceSignalId, value: &LogicVec) -> Result<(), SimError>;

    /// Writes the trailer of a completed trace and flushes.
    ///
    /// Called once per session, and only when every tick was recorded.
    fn finalize(&mut self) -> Result<(), SimError>;

    /// Marks the trace as cut short and flushes. Called instead of
    /// [`finalize`](Self::finalize) when a run ends early.
    fn abort(&mut self) -> Result<(), SimError>;
}

impl<R: WaveformRecorder + ?Sized> WaveformRecorder for Box<R> {
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError> {
        (**self).begin_scope(name)
    }

    fn end_scope(&mut self) -> Result<(), SimError> {
        (**self).end_scope()
    }

    fn register_signal(&mut self, name: &str, width: u32) -> Result<TraceSignalId, SimError> {
        (**self).register_signal(name, width)
    }

    fn begin_sample(&mut self, time: u64) -> Result<(), SimError> {
        (**self).begin_sample(time)
    }

    fn record_change(&mut self, id: TraceSignalId, value: &LogicVec) -> Result<(), SimError> {
        (**self).record_change(id, value)
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        (**self).finalize()
    }

    fn abort(&mut self) -> Result<(), SimError> {
        (**self).abort()
    }
}

/// Where the VCD writer is in the file layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VcdPhase {
    /// Header and `$scope`/`$var` declarations.
    Definitions,
    /// Inside the initial `$dumpvars` block of the first sample.
    DumpVars,
    /// Ordinary `#time` + change lines.
    Changes,
}

/// VCD (Value Change Dump) recorder following IEEE 1364.
///
/// Signal identifiers use printable ASCII starting from `!` (0x21). The
/// first sample's values are wrapped in `$dumpvars ... $end`. The file ends
/// with a `$comment` trailer naming the sample count and whether the trace
/// completed (`tickbench: complete N samples`) or was cut short
/// (`tickbench: aborted after N samples`).
pub struct VcdRecorder<W: Write> {
    writer: W,
    timescale: Timescale,
    signals: Vec<(String, u32)>, // (id_code, width), indexed by TraceSignalId
    header_written: bool,
    phase: VcdPhase,
    current_time: Option<u64>,
    samples: u64,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a recorder writing to `writer` with the given timescale.
    pub fn new(writer: W, timescale: Timescale) -> Self {
        Self {
            writer,
            timescale,
            signals: Vec::new(),
            header_written: false,
            phase: VcdPhase::Definitions,
            current_time: None,
            samples: 0,
        }
    }

    /// Consumes the recorder and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_header(&mut self) -> Result<(), SimError> {
        if self.header_written {
            return Ok(());
        }
        self.header_written = true;
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  tickbench {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  {}", self.timescale)?;
        writeln!(self.writer, "$end")?;
        Ok(())
    }

    /// Closes whatever section is open, writes the trailer and flushes.
    fn write_trailer(&mut self, trailer: &str) -> Result<(), SimError> {
        self.ensure_header()?;
        match self.phase {
            VcdPhase::Definitions => writeln!(self.writer, "$enddefinitions $end")?,
            VcdPhase::DumpVars => writeln!(self.writer, "$end")?,
            VcdPhase::Changes => {}
        }
        self.phase = VcdPhase::Changes;
        writeln!(self.writer, "$comment tickbench: {trailer} $end")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Multi-character codes are generated for indices >= 94.
    fn make_id_code(index: u32) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            let c = (b'!' + (idx % 94) as u8) as char;
            result.push(c);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    /// Formats a value as a VCD scalar (`1`) or vector (`b1010`) string.
    fn format_value(value: &LogicVec, width: u32) -> String {
        if width == 1 {
            value.get(0).vcd_char().to_string()
        } else {
            let mut s = String::with_capacity(width as usize + 1);
            s.push('b');
            s.extend(value.iter_msb_first().map(|v| v.vcd_char()));
            s
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError> {
        self.ensure_header()?;
        writeln!(self.writer, "$scope module {name} $end")?;
        Ok(())
    }

    fn end_scope(&mut self) -> Result<(), SimError> {
        writeln!(self.writer, "$upscope $end")?;
        Ok(())
    }

    fn register_signal(&mut self, name: &str, width: u32) -> Result<TraceSignalId, SimError> {
        self.ensure_header()?;
        let id = TraceSignalId::from_raw(self.signals.len() as u32);
        let id_code = Self::make_id_code(id.as_raw());
        if width == 1 {
            writeln!(self.writer, "$var wire 1 {id_code} {name} $end")?;
        } else {
            writeln!(
                self.writer,
                "$var wire {width} {id_code} {name} [{}:0] $end",
                width - 1
            )?;
        }
        self.signals.push((id_code, width));
        Ok(id)
    }

    fn begin_sample(&mut self, time: u64) -> Result<(), SimError> {
        if let Some(prev) = self.current_time {
            if time <= prev {
                return Err(SimError::NonMonotonicTimestamp {
                    expected: prev + 1,
                    got: time,
                });
            }
        }
        self.ensure_header()?;
        match self.phase {
            VcdPhase::Definitions => {
                writeln!(self.writer, "$enddefinitions $end")?;
                writeln!(self.writer, "#{time}")?;
                writeln!(self.writer, "$dumpvars")?;
                self.phase = VcdPhase::DumpVars;
            }
            VcdPhase::DumpVars => {
                writeln!(self.writer, "$end")?;
                writeln!(self.writer, "#{time}")?;
                self.phase = VcdPhase::Changes;
            }
            VcdPhase::Changes => {
                writeln!(self.writer, "#{time}")?;
            }
        }
        self.current_time = Some(time);
        self.samples += 1;
        Ok(())
    }

    fn record_change(&mut self, id: TraceSignalId, value: &LogicVec) -> Result<(), SimError> {
        if self.current_time.is_none() {
            self.begin_sample(0)?;
        }
        let (id_code, width) = self
            .signals
            .get(id.as_raw() as usize)
            .ok_or(SimError::UnknownSignal(id.as_raw()))?;

        let val_str = Self::format_value(value, *width);
        if *width == 1 {
            writeln!(self.writer, "{val_str}{id_code}")?;
        } else {
            writeln!(self.writer, "{val_str} {id_code}")?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        self.write_trailer(&format!("complete {} samples", self.samples))
    }

    fn abort(&mut self) -> Result<(), SimError> {
        self.write_trailer(&format!("aborted after {} samples", self.samples))
    }
}
