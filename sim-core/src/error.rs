//! Error types for tree construction.

use thiserror::Error;

/// Reasons a tree cannot be built from a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A distance or length parameter is zero, negative or not finite.
    #[error("{name} must be a positive finite number, got {value}")]
    NonPositive {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// No attraction points were requested.
    #[error("attraction point count must be at least 1")]
    ZeroPointCount,

    /// The consume distance is not below the influence distance.
    #[error("min distance ({min}) must be less than max distance ({max})")]
    DistanceOrder {
        /// Configured min distance.
        min: f64,
        /// Configured max distance.
        max: f64,
    },

    /// A sampling range is empty, has a non-finite bound, or is too wide
    /// to sample.
    #[error("invalid range for {name} ({min}..={max}): {reason}")]
    InvalidRange {
        /// Parameter name.
        name: &'static str,
        /// Lower bound as written.
        min: String,
        /// Upper bound as written.
        max: String,
        /// Why the sampler rejected it.
        reason: String,
    },

    /// A thickening constant is negative, which would break monotone sizes.
    #[error("{name} must not be negative, got {value}")]
    NegativeThickness {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`crate::config::TreeConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
