//! Configuration types deserialized from `tickbench.toml`.

use std::fmt;
use std::path::PathBuf;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::schedule::TickSchedule;
use crate::timescale::Timescale;

/// The top-level harness configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarnessConfig {
    /// Run length and reset schedule.
    #[serde(default)]
    pub run: RunConfig,
    /// Which model to instantiate and its runtime arguments.
    #[serde(default)]
    pub model: ModelConfig,
    /// Waveform trace destination and scope.
    #[serde(default)]
    pub trace: TraceConfig,
}

impl HarnessConfig {
    /// Checks cross-field invariants. Run again after applying CLI overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run.schedule()?;
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model.name must not be empty".to_string(),
            ));
        }
        if self.trace.enabled {
            if self.trace.path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "trace.path must not be empty".to_string(),
                ));
            }
            if self.trace.depth == 0 {
                return Err(ConfigError::ValidationError(
                    "trace.depth must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// The `[run]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of ticks to simulate.
    pub total_ticks: u64,
    /// Tick index at which reset is released.
    pub reset_release_tick: u64,
}

impl RunConfig {
    /// Builds the validated [`TickSchedule`] for this run.
    pub fn schedule(&self) -> Result<TickSchedule, ConfigError> {
        TickSchedule::new(self.total_ticks, self.reset_release_tick)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        let schedule = TickSchedule::default();
        Self {
            total_ticks: schedule.total_ticks(),
            reset_release_tick: schedule.reset_release_tick(),
        }
    }
}

/// The `[model]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Name of a built-in model (e.g. "counter").
    pub name: String,
    /// Arguments passed to the model runtime ahead of any command-line ones.
    /// Accepts a single string or a list of strings.
    #[serde(deserialize_with = "string_or_vec")]
    pub args: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "counter".to_string(),
            args: Vec::new(),
        }
    }
}

/// The `[trace]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Whether a trace file is written at all.
    pub enabled: bool,
    /// Output path of the VCD file.
    pub path: PathBuf,
    /// Number of scope levels traced; 1 traces the top scope only.
    pub depth: u32,
    /// Time unit of one tick in the trace header.
    pub timescale: Timescale,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("waveform.vcd"),
            depth: 99,
            timescale: Timescale::default(),
        }
    }
}

/// Deserializes either a single string or a list of strings into `Vec<String>`.
fn string_or_vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.split_whitespace().map(str::to_string).collect())
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
