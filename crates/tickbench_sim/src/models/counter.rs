//! Free-running 8-bit counter.

use tickbench_common::LogicVec;

use super::{parse_plusarg, EdgeDetector};
use crate::args::RuntimeArgs;
use crate::error::SimError;
use crate::model::{PortDecl, SimModel};

/// Counts rising clock edges after reset; `wrapped` pulses on overflow.
///
/// `+seed=N` preloads the count so it is defined before the first reset.
pub struct CounterModel {
    ports: Vec<PortDecl>,
    clk: bool,
    reset: bool,
    edge: EdgeDetector,
    count: Option<u8>,
    wrapped: Option<bool>,
    rising_edges: u64,
}

impl CounterModel {
    /// Name used in configuration and as the trace top scope.
    pub const NAME: &'static str = "counter";

    /// Current count, `None` while undefined.
    pub fn count(&self) -> Option<u8> {
        self.count
    }
}

impl SimModel for CounterModel {
    fn create(args: &RuntimeArgs) -> Result<Self, SimError> {
        let seed: Option<u8> = parse_plusarg(args, Self::NAME, "seed")?;
        Ok(Self {
            ports: vec![PortDecl::new("count", 8), PortDecl::new("wrapped", 1)],
            clk: false,
            reset: false,
            edge: EdgeDetector::default(),
            count: seed,
            wrapped: seed.map(|_| false),
            rising_edges: 0,
        })
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn ports(&self) -> &[PortDecl] {
        &self.ports
    }

    fn drive_clock(&mut self, level: bool) {
        self.clk = level;
    }

    fn drive_reset(&mut self, level: bool) {
        self.reset = level;
    }

    fn evaluate(&mut self) {
        if !self.edge.rose(self.clk) {
            return;
        }
        self.rising_edges += 1;
        if self.reset {
            self.count = Some(0);
            self.wrapped = Some(false);
        } else if let Some(count) = self.count {
            let (next, overflow) = count.overflowing_add(1);
            self.count = Some(next);
            self.wrapped = Some(overflow);
        }
    }

    fn read_outputs(&self) -> Vec<LogicVec> {
        vec![
            self.count
                .map_or_else(|| LogicVec::unknown(8), |c| LogicVec::from_u64(u64::from(c), 8)),
            self.wrapped
                .map_or_else(|| LogicVec::unknown(1), LogicVec::from_bool),
        ]
    }

    fn finalize(&mut self) {
        log::debug!(
            "counter: {} rising edge(s), final count {:?}",
            self.rising_edges,
            self.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelHandle;
    use crate::sequencer::ClockSequencer;
    use tickbench_config::TickSchedule;

    fn run(total: u64, release: u64, args: &[&str]) -> ModelHandle<CounterModel> {
        let mut model = ModelHandle::<CounterModel>::create(&RuntimeArgs::new(args.iter().copied()))
            .unwrap();
        let mut seq = ClockSequencer::new(TickSchedule::new(total, release).unwrap());
        while !seq.is_done() {
            seq.step(&mut model).unwrap();
        }
        model
    }

    #[test]
    fn undefined_until_reset_edge() {
        let model = ModelHandle::<CounterModel>::create(&RuntimeArgs::default()).unwrap();
        assert_eq!(model.read_outputs()[0], LogicVec::unknown(8));
        assert_eq!(model.read_outputs()[1], LogicVec::unknown(1));

        let model = run(2, 2, &[]);
        assert_eq!(model.model().count(), Some(0));
    }

    #[test]
    fn counts_rising_edges_after_release() {
        // Rising edges on odd ticks; 11..=199 are outside reset.
        let model = run(200, 10, &[]);
        assert_eq!(model.model().count(), Some(95));
        assert_eq!(model.read_outputs()[0], LogicVec::from_u64(95, 8));
    }

    #[test]
    fn never_reset_stays_unknown() {
        let model = run(20, 0, &[]);
        assert_eq!(model.model().count(), None);
    }

    #[test]
    fn seed_preloads_count() {
        let model = run(4, 0, &["+seed=250"]);
        // Edges at ticks 1 and 3.
        assert_eq!(model.model().count(), Some(252));
    }

    #[test]
    fn wraps_and_flags_overflow() {
        let model = run(2, 0, &["+seed=255"]);
        assert_eq!(model.model().count(), Some(0));
        assert_eq!(model.read_outputs()[1], LogicVec::from_bool(true));
    }

    #[test]
    fn invalid_seed_fails_construction() {
        let err = ModelHandle::<CounterModel>::create(&RuntimeArgs::new(["+seed=300"]))
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "failed to construct model 'counter': invalid +seed value '300'"
        );
    }
}
