//! The validated tick schedule driving the clock sequencer.

use std::fmt;

use crate::error::ConfigError;

/// Run length and reset-release point, checked once at construction.
///
/// Invariant: `reset_release_tick <= total_ticks`. A release tick equal to
/// `total_ticks` holds reset for the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickSchedule {
    total_ticks: u64,
    reset_release_tick: u64,
}

impl TickSchedule {
    /// Creates a schedule, rejecting a release tick past the end of the run.
    pub fn new(total_ticks: u64, reset_release_tick: u64) -> Result<Self, ConfigError> {
        if reset_release_tick > total_ticks {
            return Err(ConfigError::ReleaseAfterEnd {
                total_ticks,
                reset_release_tick,
            });
        }
        Ok(Self {
            total_ticks,
            reset_release_tick,
        })
    }

    /// Number of ticks in the run; ticks are `0..total_ticks`.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// First tick at which reset is deasserted.
    pub fn reset_release_tick(&self) -> u64 {
        self.reset_release_tick
    }
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self {
            total_ticks: 200,
            reset_release_tick: 10,
        }
    }
}

impl fmt::Display for TickSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks, reset released at tick {}",
            self.total_ticks, self.reset_release_tick
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert!(TickSchedule::new(0, 0).is_ok());
        assert!(TickSchedule::new(200, 0).is_ok());
        assert!(TickSchedule::new(200, 200).is_ok());
    }

    #[test]
    fn rejects_release_after_end() {
        let err = TickSchedule::new(10, 11).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ReleaseAfterEnd {
                total_ticks: 10,
                reset_release_tick: 11
            }
        ));
    }

    #[test]
    fn default_matches_reference_run() {
        let s = TickSchedule::default();
        assert_eq!(s.total_ticks(), 200);
        assert_eq!(s.reset_release_tick(), 10);
        assert_eq!(s.to_string(), "200 ticks, reset released at tick 10");
    }
}
