//! Full runs against real VCD files on disk.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use tickbench_common::LogicVec;
use tickbench_config::{load_config_from_str, HarnessConfig};
use tickbench_sim::{
    read_trace_file, simulate, BlinkyModel, CounterModel, PortDecl, RuntimeArgs, SimError,
    SimModel, TraceCheckError, TraceStatus,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config_with_trace(path: &Path, extra: &str) -> HarnessConfig {
    let toml = format!(
        "[trace]\npath = {:?}\n{extra}",
        path.to_str().expect("utf-8 temp path")
    );
    load_config_from_str(&toml).unwrap()
}

fn bits(values: &[LogicVec]) -> Vec<u64> {
    values.iter().map(|v| v.to_u64().unwrap()).collect()
}

/// One-output model that stops reporting outputs after `FAULT_AFTER`
/// evaluations, so the run fails partway through.
struct Faulty {
    ports: Vec<PortDecl>,
    clk: bool,
    evaluations: u64,
}

const FAULT_AFTER: u64 = 50;

impl SimModel for Faulty {
    fn create(_args: &RuntimeArgs) -> Result<Self, SimError> {
        Ok(Self {
            ports: vec![PortDecl::new("q", 1)],
            clk: false,
            evaluations: 0,
        })
    }

    fn name(&self) -> &str {
        "faulty"
    }

    fn ports(&self) -> &[PortDecl] {
        &self.ports
    }

    fn drive_clock(&mut self, level: bool) {
        self.clk = level;
    }

    fn drive_reset(&mut self, _level: bool) {}

    fn evaluate(&mut self) {
        self.evaluations += 1;
    }

    fn read_outputs(&self) -> Vec<LogicVec> {
        if self.evaluations > FAULT_AFTER {
            Vec::new()
        } else {
            vec![LogicVec::from_bool(self.clk)]
        }
    }

    fn finalize(&mut self) {}
}

/// Counts `finalize` calls across every instance.
static RECORDED_FINALIZES: AtomicUsize = AtomicUsize::new(0);

struct Recording {
    ports: Vec<PortDecl>,
}

impl SimModel for Recording {
    fn create(_args: &RuntimeArgs) -> Result<Self, SimError> {
        Ok(Self {
            ports: vec![PortDecl::new("q", 1)],
        })
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn ports(&self) -> &[PortDecl] {
        &self.ports
    }

    fn drive_clock(&mut self, _level: bool) {}

    fn drive_reset(&mut self, _level: bool) {}

    fn evaluate(&mut self) {}

    fn read_outputs(&self) -> Vec<LogicVec> {
        vec![LogicVec::from_bool(false)]
    }

    fn finalize(&mut self) {
        RECORDED_FINALIZES.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn reference_run_200_ticks_release_at_10() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("waveform.vcd");
    let config = config_with_trace(&path, "");

    let summary = simulate::<CounterModel>(&config, &RuntimeArgs::default()).unwrap();
    assert_eq!(summary.ticks, 200);
    assert_eq!(summary.samples, 200);
    assert_eq!(summary.reset_release_tick, 10);
    assert_eq!(summary.trace_path.as_deref(), Some(path.as_path()));

    let report = read_trace_file(&path).unwrap();
    report.verify(Some(200)).unwrap();
    assert_eq!(report.timestamps, (0..200).collect::<Vec<u64>>());

    let reset = bits(&report.sampled("counter.reset").unwrap());
    for (tick, level) in reset.iter().enumerate() {
        assert_eq!(*level, u64::from(tick < 10), "reset at tick {tick}");
    }

    let clk = bits(&report.sampled("counter.clk").unwrap());
    for (tick, level) in clk.iter().enumerate() {
        assert_eq!(*level, (tick % 2) as u64, "clk at tick {tick}");
    }

    let count = report.sampled("counter.count").unwrap();
    assert_eq!(count[0], LogicVec::unknown(8));
    assert_eq!(count[1].to_u64(), Some(0));
    assert_eq!(count[199].to_u64(), Some(95));
}

#[test]
fn trace_depth_one_hides_nested_ports() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blinky.vcd");
    let config = config_with_trace(&path, "depth = 1\n");

    simulate::<BlinkyModel>(&config, &RuntimeArgs::default()).unwrap();
    let report = read_trace_file(&path).unwrap();
    assert!(report.signal("blinky.led").is_some());
    assert!(report.signal("blinky.div.count").is_none());

    let config = config_with_trace(&path, "depth = 2\n");
    simulate::<BlinkyModel>(&config, &RuntimeArgs::default()).unwrap();
    let report = read_trace_file(&path).unwrap();
    assert!(report.signal("blinky.div.count").is_some());
}

#[test]
fn configured_and_forwarded_args_reach_the_model() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeded.vcd");
    let toml = format!(
        "[run]\ntotal_ticks = 4\nreset_release_tick = 0\n\n[model]\nargs = [\"+seed=1\"]\n\n[trace]\npath = {:?}\n",
        path.to_str().unwrap()
    );
    let config = load_config_from_str(&toml).unwrap();

    // The forwarded +seed comes last and wins.
    simulate::<CounterModel>(&config, &RuntimeArgs::new(["+seed=40"])).unwrap();
    let report = read_trace_file(&path).unwrap();
    let count = bits(&report.sampled("counter.count").unwrap());
    assert_eq!(count, [40, 41, 41, 42]);
}

#[test]
fn construction_failure_leaves_no_trace() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.vcd");
    let config = config_with_trace(&path, "");

    let err = simulate::<CounterModel>(&config, &RuntimeArgs::new(["+seed=nope"])).unwrap_err();
    assert!(matches!(err, SimError::ModelConstruction { .. }));
    assert!(!path.exists());
}

#[test]
fn unwritable_trace_path_is_fatal() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("waveform.vcd");
    let config = config_with_trace(&path, "");

    let err = simulate::<Recording>(&config, &RuntimeArgs::default()).unwrap_err();
    assert!(matches!(err, SimError::TraceOpen { .. }));
    // The model was built before the trace failed to open and is released
    // by the time the error reaches the caller.
    assert_eq!(RECORDED_FINALIZES.load(Ordering::SeqCst), 1);
}

#[test]
fn run_failing_partway_leaves_aborted_trace() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.vcd");
    let config = config_with_trace(&path, "");

    let err = simulate::<Faulty>(&config, &RuntimeArgs::default()).unwrap_err();
    assert!(matches!(err, SimError::InvalidSnapshot { expected: 1, got: 0 }));

    // The file is closed and parseable, but never passes the check.
    let report = read_trace_file(&path).unwrap();
    assert_eq!(report.sample_count(), FAULT_AFTER);
    assert_eq!(report.status, TraceStatus::Aborted { samples: FAULT_AFTER });
    assert!(matches!(
        report.verify(None),
        Err(TraceCheckError::Aborted { samples: FAULT_AFTER })
    ));
    assert!(report.verify(Some(200)).is_err());
}

#[test]
fn completed_run_carries_completion_marker() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("complete.vcd");
    let toml = format!(
        "[run]\ntotal_ticks = 8\nreset_release_tick = 2\n\n[trace]\npath = {:?}\n",
        path.to_str().unwrap()
    );
    let config = load_config_from_str(&toml).unwrap();

    simulate::<CounterModel>(&config, &RuntimeArgs::default()).unwrap();
    let report = read_trace_file(&path).unwrap();
    assert_eq!(report.status, TraceStatus::Complete { samples: 8 });
}

#[test]
fn reset_held_for_whole_run() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("held.vcd");
    let toml = format!(
        "[run]\ntotal_ticks = 12\nreset_release_tick = 12\n\n[trace]\npath = {:?}\n",
        path.to_str().unwrap()
    );
    let config = load_config_from_str(&toml).unwrap();

    simulate::<CounterModel>(&config, &RuntimeArgs::default()).unwrap();
    let report = read_trace_file(&path).unwrap();
    report.verify(Some(12)).unwrap();
    let reset = bits(&report.sampled("counter.reset").unwrap());
    assert!(reset.iter().all(|&r| r == 1));
}
