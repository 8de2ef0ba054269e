use randcheck_core::{DistributionKind, DistributionSpec, ResolvedDistribution};

pub fn run(range: u32) {
    println!("Distribution families (defaults shown for N = {range}):\n");
    for kind in DistributionKind::ALL {
        let defaults = match DistributionSpec::default_for(kind).resolve(range) {
            Ok(resolved) => describe(&resolved),
            Err(e) => super::exit_with_error(e),
        };
        println!("  {:<12} {:<14} {}", kind.name(), kind.title(), defaults);
    }
}

/// One-line parameter summary.
pub fn describe(resolved: &ResolvedDistribution) -> String {
    match *resolved {
        ResolvedDistribution::SimpleModulo => "raw 64-bit draw mod N".to_string(),
        ResolvedDistribution::Uniform => "uniform integers in [0, N)".to_string(),
        ResolvedDistribution::Normal { mean, std_dev } => {
            format!("mean={mean:.2}, std_dev={std_dev:.2}")
        }
        ResolvedDistribution::Exponential { scale } => format!("scale={scale:.2}"),
        ResolvedDistribution::Poisson { rate } => format!("rate={rate:.2}"),
        ResolvedDistribution::ChiSquare { degrees_of_freedom } => {
            format!("df={degrees_of_freedom}")
        }
        ResolvedDistribution::Mixed { weights } => format!(
            "weights uniform={:.2} normal={:.2} exponential={:.2} poisson={:.2} chi_square={:.2}",
            weights[0], weights[1], weights[2], weights[3], weights[4]
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_defaults() {
        let resolved = DistributionSpec::default_for(DistributionKind::Normal)
            .resolve(60)
            .unwrap();
        assert_eq!(describe(&resolved), "mean=30.00, std_dev=10.00");
        let resolved = DistributionSpec::default_for(DistributionKind::ChiSquare)
            .resolve(101)
            .unwrap();
        assert_eq!(describe(&resolved), "df=50");
    }
}
