//! # randcheck-core
//!
//! Bounded-integer sequence generation for randomness testing.
//!
//! A [`DistributionSpec`] selects one of seven families (SimpleModulo,
//! Uniform, Normal, Exponential, Poisson, ChiSquare, Mixed) with optional
//! parameter overrides; [`generate`] resolves the parameters against the
//! declared range `N` and draws an immutable [`Sequence`] of values in
//! `[0, N)`.
//!
//! ## Quick Start
//!
//! ```
//! use randcheck_core::{DistributionKind, DistributionSpec, generate_seeded};
//!
//! let spec = DistributionSpec::default_for(DistributionKind::Normal);
//! let seq = generate_seeded(&spec, 100, 10_000, 42).unwrap();
//! assert_eq!(seq.len(), 10_000);
//! assert!(seq.iter().all(|v| v < 100));
//! ```
//!
//! The [`analysis`] module provides the descriptive side: summary
//! statistics, a per-value frequency table and a per-value gap table.

pub mod analysis;
pub mod distribution;
pub mod error;
pub mod generator;
pub mod sequence;

pub use analysis::{
    FrequencyRow, FrequencyTable, GapTable, SummaryStats, frequency_table, gap_table,
    longest_run, summary_stats,
};
pub use distribution::{
    ChiSquareParams, DistributionKind, DistributionSpec, ExponentialParams, MIXED_COMPONENTS,
    MixedParams, NormalParams, PoissonParams, ResolvedDistribution, normalize_weights,
};
pub use error::{Error, Result};
pub use generator::{clamp_to_range, generate, generate_entropy, generate_seeded, split_counts};
pub use sequence::{MAX_RANGE, Sequence};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
