//! Distribution specifications and their parameter resolution.
//!
//! A [`DistributionSpec`] names one of seven distribution families and carries
//! optional parameter overrides. [`DistributionSpec::resolve`] turns it into a
//! [`ResolvedDistribution`] with concrete parameters, filling any missing
//! value from the declared range `N`:
//!
//! | family      | default                  |
//! |-------------|--------------------------|
//! | Normal      | mean = N/2, std = N/6    |
//! | Exponential | scale = N/4              |
//! | Poisson     | rate = N/2               |
//! | ChiSquare   | df = floor(N/2)          |
//! | Mixed       | weights = [0.2; 5]       |
//!
//! Resolution happens once per generation call and is never cached.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sequence::check_range;

/// The seven distribution families, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    SimpleModulo,
    Uniform,
    Normal,
    Exponential,
    Poisson,
    ChiSquare,
    Mixed,
}

impl DistributionKind {
    /// Every family, in reporting order.
    pub const ALL: [DistributionKind; 7] = [
        Self::SimpleModulo,
        Self::Uniform,
        Self::Normal,
        Self::Exponential,
        Self::Poisson,
        Self::ChiSquare,
        Self::Mixed,
    ];

    /// Short machine name used on the command line and in file names.
    pub fn name(self) -> &'static str {
        match self {
            Self::SimpleModulo => "simple",
            Self::Uniform => "uniform",
            Self::Normal => "normal",
            Self::Exponential => "exponential",
            Self::Poisson => "poisson",
            Self::ChiSquare => "chi_square",
            Self::Mixed => "mixed",
        }
    }

    /// Display title.
    pub fn title(self) -> &'static str {
        match self {
            Self::SimpleModulo => "Simple Modulo",
            Self::Uniform => "Uniform",
            Self::Normal => "Normal",
            Self::Exponential => "Exponential",
            Self::Poisson => "Poisson",
            Self::ChiSquare => "Chi-Square",
            Self::Mixed => "Mixed",
        }
    }

    /// Parse a machine name. Accepts a few common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "simple" | "simple_modulo" | "modulo" => Some(Self::SimpleModulo),
            "uniform" => Some(Self::Uniform),
            "normal" | "gaussian" => Some(Self::Normal),
            "exponential" | "exp" => Some(Self::Exponential),
            "poisson" => Some(Self::Poisson),
            "chi_square" | "chisquare" | "chi2" => Some(Self::ChiSquare),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Components of the Mixed distribution, in weight order.
pub const MIXED_COMPONENTS: [DistributionKind; 5] = [
    DistributionKind::Uniform,
    DistributionKind::Normal,
    DistributionKind::Exponential,
    DistributionKind::Poisson,
    DistributionKind::ChiSquare,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExponentialParams {
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoissonParams {
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareParams {
    pub degrees_of_freedom: Option<f64>,
}

/// Relative weights of [`MIXED_COMPONENTS`]. Normalized during resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MixedParams {
    pub weights: Option<[f64; 5]>,
}

/// A distribution family plus optional parameter overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionSpec {
    SimpleModulo,
    Uniform,
    Normal(NormalParams),
    Exponential(ExponentialParams),
    Poisson(PoissonParams),
    ChiSquare(ChiSquareParams),
    Mixed(MixedParams),
}

/// Concrete parameters after defaults have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedDistribution {
    SimpleModulo,
    Uniform,
    Normal { mean: f64, std_dev: f64 },
    Exponential { scale: f64 },
    Poisson { rate: f64 },
    ChiSquare { degrees_of_freedom: f64 },
    /// Weights sum to 1.
    Mixed { weights: [f64; 5] },
}

impl DistributionSpec {
    /// Spec for `kind` with every parameter left to its N-derived default.
    pub fn default_for(kind: DistributionKind) -> Self {
        match kind {
            DistributionKind::SimpleModulo => Self::SimpleModulo,
            DistributionKind::Uniform => Self::Uniform,
            DistributionKind::Normal => Self::Normal(NormalParams::default()),
            DistributionKind::Exponential => Self::Exponential(ExponentialParams::default()),
            DistributionKind::Poisson => Self::Poisson(PoissonParams::default()),
            DistributionKind::ChiSquare => Self::ChiSquare(ChiSquareParams::default()),
            DistributionKind::Mixed => Self::Mixed(MixedParams::default()),
        }
    }

    /// Parse a family name into its default spec.
    pub fn from_name(name: &str) -> Option<Self> {
        DistributionKind::from_name(name).map(Self::default_for)
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            Self::SimpleModulo => DistributionKind::SimpleModulo,
            Self::Uniform => DistributionKind::Uniform,
            Self::Normal(_) => DistributionKind::Normal,
            Self::Exponential(_) => DistributionKind::Exponential,
            Self::Poisson(_) => DistributionKind::Poisson,
            Self::ChiSquare(_) => DistributionKind::ChiSquare,
            Self::Mixed(_) => DistributionKind::Mixed,
        }
    }

    /// Apply N-derived defaults and validate overrides.
    pub fn resolve(&self, range: u32) -> Result<ResolvedDistribution> {
        check_range(range)?;
        let n = range as f64;
        let resolved = match *self {
            Self::SimpleModulo => ResolvedDistribution::SimpleModulo,
            Self::Uniform => ResolvedDistribution::Uniform,
            Self::Normal(p) => ResolvedDistribution::Normal {
                // The mean may be any finite value; it is clamped afterwards.
                mean: finite("mean", p.mean.unwrap_or(n / 2.0))?,
                std_dev: non_negative("std_dev", p.std_dev.unwrap_or(n / 6.0))?,
            },
            Self::Exponential(p) => ResolvedDistribution::Exponential {
                scale: non_negative("scale", p.scale.unwrap_or(n / 4.0))?,
            },
            Self::Poisson(p) => ResolvedDistribution::Poisson {
                rate: non_negative("rate", p.rate.unwrap_or(n / 2.0))?,
            },
            Self::ChiSquare(p) => ResolvedDistribution::ChiSquare {
                degrees_of_freedom: non_negative(
                    "degrees_of_freedom",
                    p.degrees_of_freedom.unwrap_or((range / 2) as f64),
                )?,
            },
            Self::Mixed(p) => ResolvedDistribution::Mixed {
                weights: normalize_weights(&p.weights.unwrap_or([0.2; 5]))?,
            },
        };
        Ok(resolved)
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

/// Scale weights to sum to 1.
pub fn normalize_weights(weights: &[f64; 5]) -> Result<[f64; 5]> {
    if let Some(&w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(Error::InvalidWeights {
            reason: format!("weight {w} is negative or not finite"),
        });
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(Error::InvalidWeights {
            reason: format!("weights sum to {total}, expected a positive sum"),
        });
    }
    Ok(weights.map(|w| w / total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::MAX_RANGE;

    #[test]
    fn test_defaults_from_range() {
        let r = DistributionSpec::default_for(DistributionKind::Normal)
            .resolve(60)
            .unwrap();
        assert_eq!(
            r,
            ResolvedDistribution::Normal {
                mean: 30.0,
                std_dev: 10.0
            }
        );
        let r = DistributionSpec::default_for(DistributionKind::Exponential)
            .resolve(100)
            .unwrap();
        assert_eq!(r, ResolvedDistribution::Exponential { scale: 25.0 });
        let r = DistributionSpec::default_for(DistributionKind::Poisson)
            .resolve(100)
            .unwrap();
        assert_eq!(r, ResolvedDistribution::Poisson { rate: 50.0 });
    }

    #[test]
    fn test_chi_square_default_rounds_down() {
        let r = DistributionSpec::default_for(DistributionKind::ChiSquare)
            .resolve(7)
            .unwrap();
        assert_eq!(
            r,
            ResolvedDistribution::ChiSquare {
                degrees_of_freedom: 3.0
            }
        );
    }

    #[test]
    fn test_overrides_win() {
        let spec = DistributionSpec::Normal(NormalParams {
            mean: Some(5.0),
            std_dev: None,
        });
        assert_eq!(
            spec.resolve(12).unwrap(),
            ResolvedDistribution::Normal {
                mean: 5.0,
                std_dev: 2.0
            }
        );
    }

    #[test]
    fn test_zero_range_rejected() {
        for kind in DistributionKind::ALL {
            assert_eq!(
                DistributionSpec::default_for(kind).resolve(0),
                Err(Error::InvalidRange(0))
            );
        }
    }

    #[test]
    fn test_oversized_range_rejected() {
        for kind in DistributionKind::ALL {
            assert_eq!(
                DistributionSpec::default_for(kind).resolve(MAX_RANGE + 1),
                Err(Error::InvalidRange(MAX_RANGE + 1))
            );
            assert!(DistributionSpec::default_for(kind).resolve(MAX_RANGE).is_ok());
        }
    }

    #[test]
    fn test_negative_parameter_rejected() {
        let spec = DistributionSpec::Exponential(ExponentialParams { scale: Some(-2.0) });
        assert!(matches!(
            spec.resolve(10),
            Err(Error::InvalidParameter { name: "scale", .. })
        ));
        let spec = DistributionSpec::Poisson(PoissonParams {
            rate: Some(f64::NAN),
        });
        assert!(spec.resolve(10).is_err());
    }

    #[test]
    fn test_weights_normalized() {
        let w = normalize_weights(&[1.0, 1.0, 2.0, 0.0, 0.0]).unwrap();
        assert_eq!(w, [0.25, 0.25, 0.5, 0.0, 0.0]);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_weights_rejected() {
        assert!(matches!(
            normalize_weights(&[0.0; 5]),
            Err(Error::InvalidWeights { .. })
        ));
        assert!(normalize_weights(&[1.0, -1.0, 1.0, 1.0, 1.0]).is_err());
        assert!(normalize_weights(&[1.0, f64::INFINITY, 1.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_name_round_trip() {
        for kind in DistributionKind::ALL {
            assert_eq!(DistributionKind::from_name(kind.name()), Some(kind));
            assert_eq!(DistributionSpec::from_name(kind.name()).unwrap().kind(), kind);
        }
        assert_eq!(DistributionKind::from_name("nope"), None);
        assert_eq!(
            DistributionKind::from_name(" Chi2 "),
            Some(DistributionKind::ChiSquare)
        );
    }
}
