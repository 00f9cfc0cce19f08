//! Tick-to-pin mapping: clock toggling and the reset schedule.

use std::fmt;

use tickbench_config::TickSchedule;

use crate::error::SimError;
use crate::model::{ModelHandle, PinLevels, SimModel};

/// Phase of the reset schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerState {
    /// Reset asserted. Initial state.
    Reset,
    /// Reset released. Terminal for the run.
    Run,
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerState::Reset => write!(f, "RESET"),
            SequencerState::Run => write!(f, "RUN"),
        }
    }
}

/// Drives `clk` and `reset` for each tick of a [`TickSchedule`].
///
/// The clock is the negation of the previous tick's level, starting from
/// the power-on level 0 at tick 0, so it reads 1 exactly on odd ticks.
/// Reset reads 1 before `reset_release_tick` and 0 from it onward.
#[derive(Debug)]
pub struct ClockSequencer {
    schedule: TickSchedule,
    state: SequencerState,
    clock: Option<bool>,
    next_tick: u64,
}

impl ClockSequencer {
    /// Creates a sequencer positioned before tick 0.
    pub fn new(schedule: TickSchedule) -> Self {
        Self {
            schedule,
            state: SequencerState::Reset,
            clock: None,
            next_tick: 0,
        }
    }

    /// Current reset phase.
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Index of the tick the next [`step`](Self::step) will apply.
    pub fn next_tick(&self) -> u64 {
        self.next_tick
    }

    /// True once every tick of the schedule has been applied.
    pub fn is_done(&self) -> bool {
        self.next_tick >= self.schedule.total_ticks()
    }

    /// Advances one tick and returns its index and levels.
    ///
    /// Fails with [`SimError::ScheduleExhausted`] once `total_ticks` ticks
    /// have been produced.
    pub fn advance(&mut self) -> Result<(u64, PinLevels), SimError> {
        if self.is_done() {
            return Err(SimError::ScheduleExhausted {
                total_ticks: self.schedule.total_ticks(),
            });
        }
        let tick = self.next_tick;

        let clk = match self.clock {
            None => false,
            Some(prev) => !prev,
        };
        self.clock = Some(clk);

        if self.state == SequencerState::Reset && tick == self.schedule.reset_release_tick() {
            self.state = SequencerState::Run;
            log::debug!("tick {tick}: reset released, {}", self.state);
        }
        let reset = self.state == SequencerState::Reset;

        self.next_tick += 1;
        Ok((tick, PinLevels { clk, reset }))
    }

    /// Advances one tick, drives both pins onto the model and evaluates.
    ///
    /// Returns the index of the tick that was applied.
    pub fn step<M: SimModel>(&mut self, model: &mut ModelHandle<M>) -> Result<u64, SimError> {
        let (tick, levels) = self.advance()?;
        model.drive_clock(levels.clk);
        model.drive_reset(levels.reset);
        model.evaluate();
        log::trace!(
            "tick {tick}: clk={} reset={}",
            levels.clk as u8,
            levels.reset as u8
        );
        Ok(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_all(total: u64, release: u64) -> Vec<(u64, PinLevels)> {
        let mut seq = ClockSequencer::new(TickSchedule::new(total, release).unwrap());
        let mut out = Vec::new();
        while !seq.is_done() {
            out.push(seq.advance().unwrap());
        }
        out
    }

    #[test]
    fn clock_is_high_on_odd_ticks() {
        for (tick, levels) in run_all(16, 4) {
            assert_eq!(levels.clk, tick % 2 == 1, "tick {tick}");
        }
    }

    #[test]
    fn reset_released_at_configured_tick() {
        for (tick, levels) in run_all(30, 10) {
            assert_eq!(levels.reset, tick < 10, "tick {tick}");
        }
    }

    #[test]
    fn ticks_are_contiguous_from_zero() {
        let ticks: Vec<u64> = run_all(7, 3).into_iter().map(|(t, _)| t).collect();
        assert_eq!(ticks, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn release_at_zero_never_asserts_reset() {
        let mut seq = ClockSequencer::new(TickSchedule::new(4, 0).unwrap());
        let (_, levels) = seq.advance().unwrap();
        assert!(!levels.reset);
        assert_eq!(seq.state(), SequencerState::Run);
    }

    #[test]
    fn release_at_end_holds_reset_all_run() {
        let all = run_all(6, 6);
        assert!(all.iter().all(|(_, l)| l.reset));
    }

    #[test]
    fn state_transitions_once() {
        let mut seq = ClockSequencer::new(TickSchedule::new(5, 2).unwrap());
        assert_eq!(seq.state(), SequencerState::Reset);
        seq.advance().unwrap();
        seq.advance().unwrap();
        assert_eq!(seq.state(), SequencerState::Reset);
        seq.advance().unwrap();
        assert_eq!(seq.state(), SequencerState::Run);
        seq.advance().unwrap();
        assert_eq!(seq.state(), SequencerState::Run);
    }

    #[test]
    fn exhausted_schedule_errors() {
        let mut seq = ClockSequencer::new(TickSchedule::new(1, 0).unwrap());
        seq.advance().unwrap();
        assert!(matches!(
            seq.advance(),
            Err(SimError::ScheduleExhausted { total_ticks: 1 })
        ));
    }

    #[test]
    fn state_display() {
        assert_eq!(SequencerState::Reset.to_string(), "RESET");
        assert_eq!(SequencerState::Run.to_string(), "RUN");
    }
}
