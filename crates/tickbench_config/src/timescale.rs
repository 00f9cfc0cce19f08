//! VCD timescale values (`1ns`, `10ps`, ...).
//!
//! One tick is one timescale unit in the written trace, so the timestamp of
//! tick `i` is always `#i` regardless of the unit chosen here.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// SI time unit accepted in a VCD `$timescale` declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    Ns,
    /// Picoseconds.
    Ps,
    /// Femtoseconds.
    Fs,
}

impl TimeUnit {
    fn suffix(self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        }
    }
}

/// A VCD timescale: magnitude 1, 10 or 100 times a [`TimeUnit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timescale {
    magnitude: u32,
    unit: TimeUnit,
}

impl Timescale {
    /// Creates a timescale, rejecting magnitudes other than 1, 10 and 100.
    pub fn new(magnitude: u32, unit: TimeUnit) -> Result<Self, ConfigError> {
        if !matches!(magnitude, 1 | 10 | 100) {
            return Err(ConfigError::InvalidTimescale(format!(
                "{magnitude}{}",
                unit.suffix()
            )));
        }
        Ok(Self { magnitude, unit })
    }

    /// The numeric part (1, 10 or 100).
    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }

    /// The unit part.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }
}

impl Default for Timescale {
    fn default() -> Self {
        Self {
            magnitude: 1,
            unit: TimeUnit::Ns,
        }
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

impl FromStr for Timescale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ConfigError::InvalidTimescale(s.to_string());

        let digit_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (num_str, unit_str) = trimmed.split_at(digit_end);

        let magnitude = if num_str.is_empty() {
            1
        } else {
            num_str.parse::<u32>().map_err(|_| invalid())?
        };
        let unit = match unit_str.trim().to_ascii_lowercase().as_str() {
            "s" => TimeUnit::S,
            "ms" => TimeUnit::Ms,
            "us" => TimeUnit::Us,
            "ns" => TimeUnit::Ns,
            "ps" => TimeUnit::Ps,
            "fs" => TimeUnit::Fs,
            _ => return Err(invalid()),
        };
        Timescale::new(magnitude, unit).map_err(|_| invalid())
    }
}

impl<'de> Deserialize<'de> for Timescale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimescaleVisitor;

        impl<'de> Visitor<'de> for TimescaleVisitor {
            type Value = Timescale;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a timescale such as \"1ns\" or \"10ps\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimescaleVisitor)
    }
}
