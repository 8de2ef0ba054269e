//! Error type shared by sequence construction and generation.

use thiserror::Error;

/// Errors raised before any sampling happens.
///
/// Degenerate *statistical* input is not an error: the test battery reports
/// it as an undefined result instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The declared range `N` must lie in `1..=MAX_RANGE`.
    #[error("invalid range: N must be in 1..={max}, got {0}", max = crate::sequence::MAX_RANGE)]
    InvalidRange(u32),

    /// A distribution parameter override is negative or not finite.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name as it appears in the distribution spec
        name: &'static str,
        /// Rejected value
        value: f64,
    },

    /// The Mixed weight vector cannot be normalized.
    #[error("invalid mixture weights: {reason}")]
    InvalidWeights {
        /// Human-readable reason
        reason: String,
    },

    /// An externally supplied value lies outside `[0, N)`.
    #[error("value {value} at index {index} is outside [0, {range})")]
    ValueOutOfRange {
        /// Position of the offending value
        index: usize,
        /// The offending value
        value: u64,
        /// Declared range
        range: u32,
    },

    /// A sampler constructor rejected the resolved parameters.
    #[error("distribution error: {0}")]
    Distribution(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
