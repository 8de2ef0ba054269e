use std::io::Write;

use randcheck_core::{DistributionSpec, Sequence};
use serde::Serialize;

pub struct GenerateCommandConfig<'a> {
    pub distribution: &'a str,
    pub range: u32,
    pub count: usize,
    pub seed: Option<u64>,
    pub overrides: super::ParamOverrides<'a>,
    pub format: &'a str,
    pub output_path: Option<&'a str>,
}

#[derive(Serialize)]
struct GeneratedSequence<'a> {
    distribution: &'a DistributionSpec,
    seed: Option<u64>,
    range: u32,
    count: usize,
    values: &'a [u32],
}

pub fn run(cfg: GenerateCommandConfig<'_>) {
    let spec = match super::select_specs(cfg.distribution, &cfg.overrides) {
        Ok(specs) if specs.len() == 1 => specs[0],
        Ok(_) => super::exit_with_error("generate takes a single distribution, not 'all'"),
        Err(e) => super::exit_with_error(e),
    };

    let seq = super::generate_sequence(&spec, cfg.range, cfg.count, cfg.seed)
        .unwrap_or_else(|e| super::exit_with_error(e));
    let bytes =
        render(&seq, &spec, cfg.seed, cfg.format).unwrap_or_else(|e| super::exit_with_error(e));

    match cfg.output_path {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &bytes) {
                super::exit_with_error(format!("failed to write {path}: {e}"));
            }
            eprintln!(
                "Wrote {} {} values to {path}",
                seq.len(),
                spec.kind()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(&bytes).and_then(|_| stdout.flush()) {
                super::exit_with_error(format!("failed to write to stdout: {e}"));
            }
        }
    }
}

/// Encode a sequence: "text" (one value per line), "raw" (one byte per
/// value, requires N <= 256) or "json".
pub fn render(
    seq: &Sequence,
    spec: &DistributionSpec,
    seed: Option<u64>,
    format: &str,
) -> Result<Vec<u8>, String> {
    match format {
        "raw" => seq.to_bytes().ok_or_else(|| {
            format!(
                "raw format stores one byte per value and needs range <= 256 (got {})",
                seq.range()
            )
        }),
        "json" => {
            let doc = GeneratedSequence {
                distribution: spec,
                seed,
                range: seq.range(),
                count: seq.len(),
                values: seq.values(),
            };
            serde_json::to_vec_pretty(&doc).map_err(|e| e.to_string())
        }
        _ => {
            let mut out = String::with_capacity(seq.len() * 4);
            for v in seq.iter() {
                out.push_str(&v.to_string());
                out.push('\n');
            }
            Ok(out.into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sequence {
        Sequence::new(vec![3, 0, 255], 256).unwrap()
    }

    #[test]
    fn test_render_text() {
        let out = render(&sample(), &DistributionSpec::Uniform, None, "text").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3\n0\n255\n");
    }

    #[test]
    fn test_render_raw() {
        let out = render(&sample(), &DistributionSpec::Uniform, None, "raw").unwrap();
        assert_eq!(out, vec![3u8, 0, 255]);
    }

    #[test]
    fn test_render_raw_rejects_wide_range() {
        let seq = Sequence::new(vec![300], 1000).unwrap();
        let err = render(&seq, &DistributionSpec::Uniform, None, "raw").unwrap_err();
        assert!(err.contains("256"));
    }

    #[test]
    fn test_render_json() {
        let out = render(&sample(), &DistributionSpec::Uniform, Some(9), "json").unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["distribution"]["kind"], "uniform");
        assert_eq!(json["seed"], 9);
        assert_eq!(json["count"], 3);
        assert_eq!(json["values"], serde_json::json!([3, 0, 255]));
    }
}
