//! Shared signal-value types for the tickbench harness.
//!
//! Pins on the model boundary carry 4-state values: a register that has not
//! yet seen a reset edge reads as `X`, so outputs are [`LogicVec`]s rather
//! than plain integers.

#![warn(missing_docs)]

pub mod logic;
pub mod logic_vec;

pub use logic::Logic;
pub use logic_vec::LogicVec;
