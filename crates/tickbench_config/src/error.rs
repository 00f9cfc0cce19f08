//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `tickbench.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The reset-release tick lies beyond the end of the run.
    #[error("reset release tick {reset_release_tick} exceeds total ticks {total_ticks}")]
    ReleaseAfterEnd {
        /// Configured run length.
        total_ticks: u64,
        /// Configured release tick.
        reset_release_tick: u64,
    },

    /// A timescale string was not of the form `<1|10|100><unit>`.
    #[error("invalid timescale '{0}' (expected e.g. 1ns, 10ps, 100us)")]
    InvalidTimescale(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
