//! LED toggled by a clock divider.

use tickbench_common::LogicVec;

use super::{parse_plusarg, EdgeDetector};
use crate::args::RuntimeArgs;
use crate::error::SimError;
use crate::model::{PortDecl, SimModel};

const DEFAULT_PERIOD: u8 = 4;

/// Toggles `led` every `+period=N` rising edges (default 4).
///
/// The divider lives in a `div` sub-scope, so tracing at depth 1 shows only
/// `led`.
pub struct BlinkyModel {
    ports: Vec<PortDecl>,
    period: u8,
    clk: bool,
    reset: bool,
    edge: EdgeDetector,
    divider: Option<u8>,
    led: Option<bool>,
}

impl BlinkyModel {
    /// Name used in configuration and as the trace top scope.
    pub const NAME: &'static str = "blinky";

    /// Current LED level, `None` while undefined.
    pub fn led(&self) -> Option<bool> {
        self.led
    }
}

impl SimModel for BlinkyModel {
    fn create(args: &RuntimeArgs) -> Result<Self, SimError> {
        let period = parse_plusarg(args, Self::NAME, "period")?.unwrap_or(DEFAULT_PERIOD);
        if period == 0 {
            return Err(SimError::ModelConstruction {
                model: Self::NAME.to_string(),
                reason: "+period must be at least 1".to_string(),
            });
        }
        Ok(Self {
            ports: vec![PortDecl::new("led", 1), PortDecl::new("div.count", 8)],
            period,
            clk: false,
            reset: false,
            edge: EdgeDetector::default(),
            divider: None,
            led: None,
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
        if self.reset {
            self.divider = Some(0);
            self.led = Some(false);
            return;
        }
        if let (Some(div), Some(led)) = (self.divider, self.led) {
            let next = div + 1;
            if next >= self.period {
                self.divider = Some(0);
                self.led = Some(!led);
            } else {
                self.divider = Some(next);
            }
        }
    }

    fn read_outputs(&self) -> Vec<LogicVec> {
        vec![
            self.led.map_or_else(|| LogicVec::unknown(1), LogicVec::from_bool),
            self.divider
                .map_or_else(|| LogicVec::unknown(8), |d| LogicVec::from_u64(u64::from(d), 8)),
        ]
    }

    fn finalize(&mut self) {
        log::debug!("blinky: final led {:?}", self.led);
    }
}
