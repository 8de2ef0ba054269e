pub mod distributions;
pub mod generate;
pub mod report;

use std::fmt::Display;

use randcheck_core::{
    ChiSquareParams, DistributionKind, DistributionSpec, ExponentialParams, MixedParams,
    NormalParams, PoissonParams, Sequence,
};
use randcheck_tests::TestResult;

/// Parameter overrides collected from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamOverrides<'a> {
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub scale: Option<f64>,
    pub rate: Option<f64>,
    pub degrees_of_freedom: Option<f64>,
    pub weights: Option<&'a str>,
}

impl ParamOverrides<'_> {
    /// Families that read at least one of the supplied overrides.
    fn targets(&self) -> Vec<DistributionKind> {
        let mut kinds = Vec::new();
        if self.mean.is_some() || self.std_dev.is_some() {
            kinds.push(DistributionKind::Normal);
        }
        if self.scale.is_some() {
            kinds.push(DistributionKind::Exponential);
        }
        if self.rate.is_some() {
            kinds.push(DistributionKind::Poisson);
        }
        if self.degrees_of_freedom.is_some() {
            kinds.push(DistributionKind::ChiSquare);
        }
        if self.weights.is_some() {
            kinds.push(DistributionKind::Mixed);
        }
        kinds
    }
}

/// Parse five comma-separated mixture weights.
pub fn parse_weights(s: &str) -> Result<[f64; 5], String> {
    let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
    if parts.len() != 5 {
        return Err(format!(
            "expected 5 comma-separated weights, got {}",
            parts.len()
        ));
    }
    let mut weights = [0.0; 5];
    for (slot, part) in weights.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|e| format!("invalid weight '{part}': {e}"))?;
    }
    Ok(weights)
}

/// Build the spec for `kind`, applying whichever overrides the family reads.
pub fn build_spec(
    kind: DistributionKind,
    o: &ParamOverrides<'_>,
) -> Result<DistributionSpec, String> {
    let spec = match kind {
        DistributionKind::SimpleModulo => DistributionSpec::SimpleModulo,
        DistributionKind::Uniform => DistributionSpec::Uniform,
        DistributionKind::Normal => DistributionSpec::Normal(NormalParams {
            mean: o.mean,
            std_dev: o.std_dev,
        }),
        DistributionKind::Exponential => {
            DistributionSpec::Exponential(ExponentialParams { scale: o.scale })
        }
        DistributionKind::Poisson => DistributionSpec::Poisson(PoissonParams { rate: o.rate }),
        DistributionKind::ChiSquare => DistributionSpec::ChiSquare(ChiSquareParams {
            degrees_of_freedom: o.degrees_of_freedom,
        }),
        DistributionKind::Mixed => DistributionSpec::Mixed(MixedParams {
            weights: o.weights.map(parse_weights).transpose()?,
        }),
    };
    Ok(spec)
}

/// Resolve a `--distribution` value: a single family name or "all".
pub fn select_kinds(filter: &str) -> Result<Vec<DistributionKind>, String> {
    if filter.trim().eq_ignore_ascii_case("all") {
        return Ok(DistributionKind::ALL.to_vec());
    }
    DistributionKind::from_name(filter)
        .map(|kind| vec![kind])
        .ok_or_else(|| format!("unknown distribution '{filter}'"))
}

/// Build specs for every selected family, warning about overrides none of them use.
pub fn select_specs(
    filter: &str,
    overrides: &ParamOverrides<'_>,
) -> Result<Vec<DistributionSpec>, String> {
    let kinds = select_kinds(filter)?;
    for target in overrides.targets() {
        if !kinds.contains(&target) {
            log::warn!("parameter overrides for {target} ignored: distribution not selected");
        }
    }
    kinds.into_iter().map(|k| build_spec(k, overrides)).collect()
}

/// Generate with a fixed seed when given, otherwise from fresh entropy.
pub fn generate_sequence(
    spec: &DistributionSpec,
    range: u32,
    count: usize,
    seed: Option<u64>,
) -> randcheck_core::Result<Sequence> {
    match seed {
        Some(seed) => randcheck_core::generate_seeded(spec, range, count, seed),
        None => randcheck_core::generate_entropy(spec, range, count),
    }
}

/// Parse integers separated by whitespace and/or commas.
pub fn parse_sequence_text(text: &str, range: u32) -> Result<Sequence, String> {
    let values = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<u64>()
                .map_err(|e| format!("invalid value '{t}': {e}"))
        })
        .collect::<Result<Vec<u64>, String>>()?;
    Sequence::from_u64s(&values, range).map_err(|e| e.to_string())
}

/// Load a sequence from `path` in the given format ("text" or "raw").
pub fn read_sequence(path: &str, range: u32, format: &str) -> Result<Sequence, String> {
    match format {
        "raw" => {
            let bytes = std::fs::read(path).map_err(|e| format!("failed to read {path}: {e}"))?;
            Sequence::from_bytes(&bytes, range).map_err(|e| e.to_string())
        }
        _ => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {path}: {e}"))?;
            parse_sequence_text(&text, range)
        }
    }
}

pub fn format_p(p: Option<f64>) -> String {
    p.map(|p| format!("{p:.6}"))
        .unwrap_or_else(|| "—".to_string())
}

/// Print one line per test result.
pub fn print_results(results: &[TestResult]) {
    println!(
        "  {:<18} {:<10} {:>10} {:>12} {:>5}  Conclusion",
        "Test", "Verdict", "p-value", "Statistic", "Grade"
    );
    println!("  {}", "-".repeat(72));
    for r in results {
        let verdict = match r.verdict {
            randcheck_tests::Verdict::Pass => "✓ pass",
            randcheck_tests::Verdict::Fail => "✗ fail",
            randcheck_tests::Verdict::Undefined => "? n/a",
        };
        println!(
            "  {:<18} {:<10} {:>10} {:>12.4} {:>5}  {}",
            r.name,
            verdict,
            format_p(r.p_value),
            r.statistic,
            r.grade,
            r.conclusion()
        );
    }
}

/// Print an error to stderr and exit with status 1.
pub fn exit_with_error(msg: impl Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}
