//! Sequence generation.
//!
//! Every continuous or unbounded sample is clamped into `[0, N-1]` and then
//! truncated toward zero, so clamped mass piles up in the boundary bins.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, ChiSquared, Distribution, Exp, Normal, Poisson};

use crate::distribution::{DistributionSpec, MIXED_COMPONENTS, ResolvedDistribution};
use crate::error::{Error, Result};
use crate::sequence::Sequence;

/// Generate `count` values in `[0, range)` drawn from `spec`.
///
/// Fails only on invalid configuration, before any sampling.
pub fn generate<R: Rng + ?Sized>(
    spec: &DistributionSpec,
    range: u32,
    count: usize,
    rng: &mut R,
) -> Result<Sequence> {
    let resolved = spec.resolve(range)?;
    log::debug!(
        "generating {count} values in [0, {range}) from {} with {resolved:?}",
        spec.kind()
    );
    let values = sample_resolved(&resolved, range, count, rng)?;
    Ok(Sequence::from_clamped(values, range))
}

/// [`generate`] with a reproducible `StdRng` seeded from `seed`.
pub fn generate_seeded(
    spec: &DistributionSpec,
    range: u32,
    count: usize,
    seed: u64,
) -> Result<Sequence> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(spec, range, count, &mut rng)
}

/// [`generate`] using the thread-local RNG.
pub fn generate_entropy(spec: &DistributionSpec, range: u32, count: usize) -> Result<Sequence> {
    generate(spec, range, count, &mut rand::rng())
}

/// Clamp a raw sample into `[0, range-1]` and truncate toward zero.
pub fn clamp_to_range(sample: f64, range: u32) -> u32 {
    let upper = range.saturating_sub(1) as f64;
    // NaN casts to 0.
    sample.clamp(0.0, upper) as u32
}

fn sample_resolved<R: Rng + ?Sized>(
    resolved: &ResolvedDistribution,
    range: u32,
    count: usize,
    rng: &mut R,
) -> Result<Vec<u32>> {
    let values = match *resolved {
        ResolvedDistribution::SimpleModulo => (0..count)
            .map(|_| (rng.next_u64() % range as u64) as u32)
            .collect(),
        ResolvedDistribution::Uniform => (0..count).map(|_| rng.random_range(0..range)).collect(),
        ResolvedDistribution::Normal { mean, std_dev } => {
            if std_dev == 0.0 {
                vec![clamp_to_range(mean, range); count]
            } else {
                let dist = Normal::new(mean, std_dev).map_err(distribution_error)?;
                sample_clamped(&dist, range, count, rng)
            }
        }
        ResolvedDistribution::Exponential { scale } => {
            if scale == 0.0 {
                vec![0; count]
            } else {
                let dist = Exp::new(1.0 / scale).map_err(distribution_error)?;
                sample_clamped(&dist, range, count, rng)
            }
        }
        ResolvedDistribution::Poisson { rate } => {
            if rate == 0.0 {
                vec![0; count]
            } else {
                let dist = Poisson::new(rate).map_err(distribution_error)?;
                sample_clamped(&dist, range, count, rng)
            }
        }
        ResolvedDistribution::ChiSquare { degrees_of_freedom } => {
            if degrees_of_freedom == 0.0 {
                vec![0; count]
            } else {
                let dist = ChiSquared::new(degrees_of_freedom).map_err(distribution_error)?;
                sample_clamped(&dist, range, count, rng)
            }
        }
        ResolvedDistribution::Mixed { weights } => sample_mixed(&weights, range, count, rng)?,
    };
    Ok(values)
}

fn sample_clamped<D, R>(dist: &D, range: u32, count: usize, rng: &mut R) -> Vec<u32>
where
    D: Distribution<f64>,
    R: Rng + ?Sized,
{
    (0..count)
        .map(|_| clamp_to_range(dist.sample(rng), range))
        .collect()
}

fn sample_mixed<R: Rng + ?Sized>(
    weights: &[f64; 5],
    range: u32,
    count: usize,
    rng: &mut R,
) -> Result<Vec<u32>> {
    let counts = split_counts(count, weights, rng)?;
    log::debug!("mixed partition {counts:?}");
    let mut values = Vec::with_capacity(count);
    for (kind, &part) in MIXED_COMPONENTS.iter().zip(counts.iter()) {
        let resolved = DistributionSpec::default_for(*kind).resolve(range)?;
        values.extend(sample_resolved(&resolved, range, part, rng)?);
    }
    values.shuffle(rng);
    Ok(values)
}

/// Multinomial split of `count` over normalized `weights`.
///
/// Drawn as a chain of conditional binomials, so the parts always sum to
/// exactly `count`.
pub fn split_counts<R: Rng + ?Sized>(
    count: usize,
    weights: &[f64; 5],
    rng: &mut R,
) -> Result<[usize; 5]> {
    let mut counts = [0usize; 5];
    let mut remaining = count;
    for i in 0..weights.len() - 1 {
        if remaining == 0 {
            break;
        }
        let tail: f64 = weights[i..].iter().sum();
        let p = if tail > 0.0 {
            (weights[i] / tail).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let binomial = Binomial::new(remaining as u64, p).map_err(distribution_error)?;
        let drawn = binomial.sample(rng) as usize;
        counts[i] = drawn;
        remaining -= drawn;
    }
    counts[weights.len() - 1] = remaining;
    Ok(counts)
}

fn distribution_error(err: impl std::fmt::Display) -> Error {
    Error::Distribution(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{
        ChiSquareParams, DistributionKind, ExponentialParams, MixedParams, NormalParams,
        PoissonParams,
    };

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0xdeadbeef)
    }

    #[test]
    fn test_clamp_to_range() {
        assert_eq!(clamp_to_range(-3.5, 10), 0);
        assert_eq!(clamp_to_range(4.99, 10), 4);
        assert_eq!(clamp_to_range(9.0, 10), 9);
        assert_eq!(clamp_to_range(1e9, 10), 9);
        assert_eq!(clamp_to_range(f64::NAN, 10), 0);
        assert_eq!(clamp_to_range(5.0, 1), 0);
    }

    #[test]
    fn test_every_kind_respects_length_and_range() {
        let mut rng = rng();
        for kind in DistributionKind::ALL {
            for &(range, count) in &[(1u32, 50usize), (2, 0), (10, 1000), (257, 333)] {
                let spec = DistributionSpec::default_for(kind);
                let seq = generate(&spec, range, count, &mut rng).unwrap();
                assert_eq!(seq.len(), count, "{kind} length");
                assert!(seq.iter().all(|v| v < range), "{kind} out of range");
            }
        }
    }

    #[test]
    fn test_zero_range_fails_before_sampling() {
        let spec = DistributionSpec::Uniform;
        assert_eq!(
            generate(&spec, 0, 10, &mut rng()),
            Err(Error::InvalidRange(0))
        );
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let spec = DistributionSpec::default_for(DistributionKind::Mixed);
        let a = generate_seeded(&spec, 100, 500, 7).unwrap();
        let b = generate_seeded(&spec, 100, 500, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normal_clamps_to_boundaries() {
        // Far outside the range on both sides.
        let spec = DistributionSpec::Normal(NormalParams {
            mean: Some(-100.0),
            std_dev: Some(1.0),
        });
        let seq = generate(&spec, 10, 200, &mut rng()).unwrap();
        assert!(seq.iter().all(|v| v == 0));
        let spec = DistributionSpec::Normal(NormalParams {
            mean: Some(1000.0),
            std_dev: Some(1.0),
        });
        let seq = generate(&spec, 10, 200, &mut rng()).unwrap();
        assert!(seq.iter().all(|v| v == 9));
    }

    #[test]
    fn test_poisson_large_rate_collapses_to_top() {
        let spec = DistributionSpec::Poisson(PoissonParams { rate: Some(500.0) });
        let seq = generate(&spec, 10, 100, &mut rng()).unwrap();
        assert!(seq.iter().all(|v| v == 9));
    }

    #[test]
    fn test_degenerate_parameters_are_point_masses() {
        let spec = DistributionSpec::Normal(NormalParams {
            mean: Some(4.7),
            std_dev: Some(0.0),
        });
        let seq = generate(&spec, 10, 20, &mut rng()).unwrap();
        assert!(seq.iter().all(|v| v == 4));

        let spec = DistributionSpec::Exponential(ExponentialParams { scale: Some(0.0) });
        assert!(generate(&spec, 10, 20, &mut rng()).unwrap().iter().all(|v| v == 0));

        // df = floor(1/2) = 0 by default when N = 1.
        let spec = DistributionSpec::ChiSquare(ChiSquareParams::default());
        assert!(generate(&spec, 1, 20, &mut rng()).unwrap().iter().all(|v| v == 0));
    }

    #[test]
    fn test_exponential_mean_tracks_scale() {
        let spec = DistributionSpec::Exponential(ExponentialParams { scale: Some(20.0) });
        let seq = generate(&spec, 10_000, 50_000, &mut rng()).unwrap();
        let mean = seq.iter().map(|v| v as f64).sum::<f64>() / seq.len() as f64;
        // Truncation shifts the mean down by roughly one half.
        assert!((mean - 19.5).abs() < 0.5, "mean = {mean}");
    }

    #[test]
    fn test_uniform_covers_all_values() {
        let seq = generate(&DistributionSpec::Uniform, 10, 10_000, &mut rng()).unwrap();
        let mut seen = [false; 10];
        for v in seq.iter() {
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_split_counts_sums_to_count() {
        let mut rng = rng();
        let weights = [0.1, 0.2, 0.3, 0.15, 0.25];
        for count in [0usize, 1, 7, 1000, 12_345] {
            let parts = split_counts(count, &weights, &mut rng).unwrap();
            assert_eq!(parts.iter().sum::<usize>(), count);
        }
    }

    #[test]
    fn test_split_counts_respects_zero_weights() {
        let mut rng = rng();
        let parts = split_counts(10_000, &[0.0, 0.0, 0.0, 1.0, 0.0], &mut rng).unwrap();
        assert_eq!(parts, [0, 0, 0, 10_000, 0]);
        let parts = split_counts(500, &[0.5, 0.5, 0.0, 0.0, 0.0], &mut rng).unwrap();
        assert_eq!(parts[2] + parts[3] + parts[4], 0);
        assert_eq!(parts[0] + parts[1], 500);
    }

    #[test]
    fn test_mixed_with_skewed_weights_keeps_length() {
        let spec = DistributionSpec::Mixed(MixedParams {
            weights: Some([1000.0, 0.0, 0.0, 0.0, 1e-9]),
        });
        let seq = generate(&spec, 50, 4321, &mut rng()).unwrap();
        assert_eq!(seq.len(), 4321);
    }

    #[test]
    fn test_mixed_rejects_bad_weights() {
        let spec = DistributionSpec::Mixed(MixedParams {
            weights: Some([0.0; 5]),
        });
        assert!(matches!(
            generate(&spec, 10, 10, &mut rng()),
            Err(Error::InvalidWeights { .. })
        ));
    }

    #[test]
    fn test_simple_modulo_single_value_range() {
        let seq = generate(&DistributionSpec::SimpleModulo, 1, 100, &mut rng()).unwrap();
        assert!(seq.iter().all(|v| v == 0));
    }
}
