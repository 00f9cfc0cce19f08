//! Parsing and validation of `tickbench.toml` harness configuration.
//!
//! The configuration fixes the run length, the reset-release tick, which
//! model to instantiate, and where the waveform trace goes. Every field has a
//! default, so an empty file (or no file at all) yields a usable
//! [`HarnessConfig`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod schedule;
pub mod timescale;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use schedule::TickSchedule;
pub use timescale::{TimeUnit, Timescale};
pub use types::*;
