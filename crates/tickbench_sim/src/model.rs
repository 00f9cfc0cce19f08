//! The model boundary and its scoped owner.
//!
//! [`SimModel`] is the capability set a circuit model exposes to the harness:
//! drive `clk`, drive `reset`, evaluate, read the outputs, finalize. A
//! generated model, a hand-written reference model and a test double all
//! plug in through the same trait. [`ModelHandle`] owns the instance for the
//! whole run and guarantees `finalize` runs exactly once.

use tickbench_common::{Logic, LogicVec};

use crate::args::RuntimeArgs;
use crate::error::SimError;

/// A read-only output pin declared by a model.
///
/// Dotted names (`div.count`) place the pin in nested scopes; each dot adds
/// one level of hierarchy in the trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortDecl {
    /// Hierarchical pin name relative to the model's top scope.
    pub name: String,
    /// Bit width, at least 1.
    pub width: u32,
}

impl PortDecl {
    /// Creates a port declaration.
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }

    /// Scope segments above the leaf name (`div.count` → `["div"]`).
    pub fn scope_path(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = self.name.split('.').collect();
        parts.pop();
        parts
    }

    /// The leaf signal name (`div.count` → `count`).
    pub fn leaf_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Trace depth at which this port lives; top-level pins are depth 1.
    pub fn depth(&self) -> u32 {
        self.name.matches('.').count() as u32 + 1
    }
}

/// Levels applied to the two driven pins at one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PinLevels {
    /// Clock level.
    pub clk: bool,
    /// Reset level (active high).
    pub reset: bool,
}

/// Observable state after an evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSnapshot {
    /// Clock level that was evaluated.
    pub clk: Logic,
    /// Reset level that was evaluated.
    pub reset: Logic,
    /// Output values, parallel to [`SimModel::ports`].
    pub outputs: Vec<LogicVec>,
}

/// Capability set of a synchronous circuit model.
pub trait SimModel {
    /// Constructs a fresh instance from the forwarded runtime arguments.
    fn create(args: &RuntimeArgs) -> Result<Self, SimError>
    where
        Self: Sized;

    /// Top-level scope name used in the trace.
    fn name(&self) -> &str;

    /// Declared output pins. Must not change over the model's lifetime.
    fn ports(&self) -> &[PortDecl];

    /// Sets the clock input. Takes effect at the next [`evaluate`](Self::evaluate).
    fn drive_clock(&mut self, level: bool);

    /// Sets the active-high reset input. Takes effect at the next evaluate.
    fn drive_reset(&mut self, level: bool);

    /// Settles combinational logic and latches state whose clock edge
    /// condition is met. Deterministic; fully settled on return.
    fn evaluate(&mut self);

    /// Current values of every declared output, in [`ports`](Self::ports) order.
    fn read_outputs(&self) -> Vec<LogicVec>;

    /// Model-specific cleanup, called once after the last evaluate.
    fn finalize(&mut self);
}

/// Exclusive owner of a model instance.
///
/// Dropping an unfinalized handle finalizes the model, so cleanup runs on
/// every exit path. [`finalize`](Self::finalize) consumes the handle, which
/// makes a second call impossible.
pub struct ModelHandle<M: SimModel> {
    model: M,
    levels: PinLevels,
    evaluations: u64,
    finalized: bool,
}

impl<M: SimModel> ModelHandle<M> {
    /// Constructs the model through [`SimModel::create`].
    pub fn create(args: &RuntimeArgs) -> Result<Self, SimError> {
        let model = M::create(args)?;
        log::debug!(
            "constructed model '{}' with {} output port(s)",
            model.name(),
            model.ports().len()
        );
        Ok(Self::new(model))
    }

    /// Takes ownership of an already constructed model.
    pub fn new(model: M) -> Self {
        Self {
            model,
            levels: PinLevels::default(),
            evaluations: 0,
            finalized: false,
        }
    }

    /// Sets the clock pin without evaluating.
    pub fn drive_clock(&mut self, level: bool) {
        self.levels.clk = level;
        self.model.drive_clock(level);
    }

    /// Sets the reset pin without evaluating.
    pub fn drive_reset(&mut self, level: bool) {
        self.levels.reset = level;
        self.model.drive_reset(level);
    }

    /// Runs one deterministic evaluation step.
    pub fn evaluate(&mut self) {
        self.model.evaluate();
        self.evaluations += 1;
    }

    /// Current output values.
    pub fn read_outputs(&self) -> Vec<LogicVec> {
        self.model.read_outputs()
    }

    /// Driven levels plus outputs, the unit a trace sample is built from.
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            clk: Logic::from_bool(self.levels.clk),
            reset: Logic::from_bool(self.levels.reset),
            outputs: self.read_outputs(),
        }
    }

    /// The model's top scope name.
    pub fn name(&self) -> &str {
        self.model.name()
    }

    /// The model's declared output ports.
    pub fn ports(&self) -> &[PortDecl] {
        self.model.ports()
    }

    /// Borrows the model itself.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Finalizes the model and releases it.
    pub fn finalize(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        self.model.finalize();
        log::debug!(
            "finalized model '{}' after {} evaluation(s)",
            self.model.name(),
            self.evaluations
        );
    }
}

impl<M: SimModel> Drop for ModelHandle<M> {
    fn drop(&mut self) {
        self.finish();
    }
}
