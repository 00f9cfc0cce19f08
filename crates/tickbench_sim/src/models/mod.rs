//! Built-in reference models.
//!
//! Small synchronous designs implementing [`SimModel`] by hand, selectable
//! by name from the configuration. Both latch on the rising clock edge and
//! reset synchronously; their registers read `X` until the first edge seen
//! with reset asserted.

mod blinky;
mod counter;

pub use blinky::BlinkyModel;
pub use counter::CounterModel;

use tickbench_config::HarnessConfig;

use crate::args::RuntimeArgs;
use crate::error::SimError;
use crate::harness::{simulate, RunSummary};
use crate::model::SimModel;

/// Names accepted in `model.name`.
pub const BUILTIN_MODELS: &[&str] = &[CounterModel::NAME, BlinkyModel::NAME];

/// Runs the built-in model named by `config.model.name`.
pub fn simulate_builtin(
    config: &HarnessConfig,
    forwarded: &RuntimeArgs,
) -> Result<RunSummary, SimError> {
    match config.model.name.as_str() {
        CounterModel::NAME => simulate::<CounterModel>(config, forwarded),
        BlinkyModel::NAME => simulate::<BlinkyModel>(config, forwarded),
        other => Err(SimError::UnknownModel {
            name: other.to_string(),
            available: BUILTIN_MODELS.join(", "),
        }),
    }
}

/// Parses an optional `+name=value` plus-arg, reporting bad values as a
/// construction failure of `model`.
fn parse_plusarg<T: std::str::FromStr>(
    args: &RuntimeArgs,
    model: &str,
    name: &str,
) -> Result<Option<T>, SimError> {
    match args.plusarg(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| SimError::ModelConstruction {
                model: model.to_string(),
                reason: format!("invalid +{name} value '{raw}'"),
            }),
    }
}

/// Rising-edge detector shared by the reference models.
#[derive(Debug, Default)]
struct EdgeDetector {
    prev: bool,
}

impl EdgeDetector {
    /// Returns true if `clk` rose since the previous call.
    fn rose(&mut self, clk: bool) -> bool {
        let rose = clk && !self.prev;
        self.prev = clk;
        rose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model_lists_builtins() {
        let mut config = HarnessConfig::default();
        config.model.name = "riscv".into();
        config.trace.enabled = false;
        let err = simulate_builtin(&config, &RuntimeArgs::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown model 'riscv' (available: counter, blinky)"
        );
    }

    #[test]
    fn builtin_runs_without_trace() {
        let mut config = HarnessConfig::default();
        config.model.name = "blinky".into();
        config.trace.enabled = false;
        let summary = simulate_builtin(&config, &RuntimeArgs::default()).unwrap();
        assert_eq!(summary.model, "blinky");
        assert_eq!(summary.ticks, 200);
        assert_eq!(summary.samples, 0);
        assert!(summary.trace_path.is_none());
    }

    #[test]
    fn bad_plusarg_is_construction_error() {
        let args = RuntimeArgs::new(["+seed=lots"]);
        let err = parse_plusarg::<u8>(&args, "counter", "seed").unwrap_err();
        assert!(matches!(err, SimError::ModelConstruction { .. }));
        let absent = parse_plusarg::<u8>(&RuntimeArgs::default(), "counter", "seed").unwrap();
        assert_eq!(absent, None);
    }

    #[test]
    fn edge_detector_fires_on_rise_only() {
        let mut edge = EdgeDetector::default();
        assert!(!edge.rose(false));
        assert!(edge.rose(true));
        assert!(!edge.rose(true));
        assert!(!edge.rose(false));
        assert!(edge.rose(true));
    }
}
