use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use randcheck_core::{
    DistributionSpec, FrequencyTable, GapTable, Sequence, SummaryStats, frequency_table,
    gap_table, longest_run, summary_stats,
};
use randcheck_tests::BatteryReport;
use serde::Serialize;

pub struct ReportCommandConfig<'a> {
    pub distribution: &'a str,
    pub range: u32,
    pub count: usize,
    pub seed: Option<u64>,
    pub overrides: super::ParamOverrides<'a>,
    pub output_dir: &'a str,
    pub json: bool,
}

/// Everything reported for one distribution.
#[derive(Serialize)]
pub struct DistributionReport {
    pub distribution: DistributionSpec,
    pub seed: Option<u64>,
    pub generation_secs: f64,
    pub testing_secs: f64,
    pub summary: SummaryStats,
    pub longest_run: usize,
    pub battery: BatteryReport,
}

impl DistributionReport {
    fn build(
        spec: DistributionSpec,
        seq: &Sequence,
        seed: Option<u64>,
        generation_secs: f64,
    ) -> Self {
        let t0 = Instant::now();
        let battery = BatteryReport::new(seq);
        let testing_secs = t0.elapsed().as_secs_f64();
        DistributionReport {
            distribution: spec,
            seed,
            generation_secs,
            testing_secs,
            summary: summary_stats(seq),
            longest_run: longest_run(seq),
            battery,
        }
    }
}

pub fn run(cfg: ReportCommandConfig<'_>) {
    let specs = super::select_specs(cfg.distribution, &cfg.overrides)
        .unwrap_or_else(|e| super::exit_with_error(e));
    let out_dir = Path::new(cfg.output_dir);
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        super::exit_with_error(format!("failed to create {}: {e}", out_dir.display()));
    }

    println!(
        "Running test battery on {} distribution(s), N = {}, {} values each...\n",
        specs.len(),
        cfg.range,
        cfg.count
    );

    let mut reports = Vec::with_capacity(specs.len());
    for spec in specs {
        let kind = spec.kind();
        println!("── {} ──", kind.title());

        let t0 = Instant::now();
        let seq = super::generate_sequence(&spec, cfg.range, cfg.count, cfg.seed)
            .unwrap_or_else(|e| super::exit_with_error(format!("{kind}: {e}")));
        let generation_secs = t0.elapsed().as_secs_f64();
        println!("  Generation: {generation_secs:.4}s");

        let report = DistributionReport::build(spec, &seq, cfg.seed, generation_secs);
        println!("  Testing:    {:.4}s\n", report.testing_secs);
        super::print_results(&report.battery.results);
        println!();

        if let Err(e) = write_outputs(out_dir, &seq, &report, cfg.json) {
            super::exit_with_error(format!("{kind}: failed to write outputs: {e}"));
        }
        reports.push(report);
    }

    println!("Outputs written to {}", out_dir.display());

    // Summary table
    println!("\n{}", "=".repeat(60));
    println!(
        "{:<16} {:>6} {:>8} {:>10} {:>10}",
        "Distribution", "Score", "Pass", "Gen (s)", "Test (s)"
    );
    println!("{}", "-".repeat(60));
    for r in &reports {
        println!(
            "{:<16} {:>6.1} {:>6}/{} {:>10.4} {:>10.4}",
            r.distribution.kind().name(),
            r.battery.score,
            r.battery.passed,
            r.battery.results.len(),
            r.generation_secs,
            r.testing_secs
        );
    }
}

/// Write the results file and both tables for one distribution.
pub fn write_outputs(
    dir: &Path,
    seq: &Sequence,
    report: &DistributionReport,
    json: bool,
) -> std::io::Result<()> {
    let name = report.distribution.kind().name();
    if json {
        let doc = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
        std::fs::write(dir.join(format!("{name}_test_results.json")), doc)?;
    } else {
        std::fs::write(
            dir.join(format!("{name}_test_results.md")),
            generate_report(report),
        )?;
    }
    write_frequency_csv(
        &dir.join(format!("{name}_frequency.csv")),
        &frequency_table(seq),
    )?;
    write_gap_csv(&dir.join(format!("{name}_gaps.csv")), &gap_table(seq))?;
    log::debug!("wrote {name} outputs to {}", dir.display());
    Ok(())
}

/// `Value,Count,Frequency`, one row per value in `[0, N)`.
pub fn write_frequency_csv(path: &Path, table: &FrequencyTable) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "Value,Count,Frequency")?;
    for row in table.rows() {
        writeln!(w, "{},{},{}", row.value, row.count, row.frequency)?;
    }
    w.flush()
}

/// `Value,Gaps`, the gaps joined by commas and quoted when there is more than one.
pub fn write_gap_csv(path: &Path, table: &GapTable) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "Value,Gaps")?;
    for (value, gaps) in table.iter() {
        let joined = gaps
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(",");
        if gaps.len() > 1 {
            writeln!(w, "{value},\"{joined}\"")?;
        } else {
            writeln!(w, "{value},{joined}")?;
        }
    }
    w.flush()
}

/// Markdown test report for one distribution.
pub fn generate_report(r: &DistributionReport) -> String {
    let kind = r.distribution.kind();
    let b = &r.battery;
    let s = &r.summary;
    let mut report = String::new();
    report.push_str(&format!("# randcheck: {} test results\n\n", kind.title()));
    report.push_str(&format!("Generated: {}\n\n", chrono_now()));
    report.push_str(&format!(
        "- Range: [0, {})\n- Samples: {}\n- Seed: {}\n\
         - Generation: {:.4}s\n- Testing: {:.4}s\n\
         - Score: {:.1}/100\n- Passed: {}/{} ({} undefined)\n\n",
        b.range,
        b.sample_size,
        r.seed.map(|s| s.to_string()).unwrap_or_else(|| "entropy".to_string()),
        r.generation_secs,
        r.testing_secs,
        b.score,
        b.passed,
        b.results.len(),
        b.undefined
    ));

    report.push_str("## Summary statistics\n\n");
    report.push_str(&format!(
        "| Mean | Std dev | Min | Max | Median | Skewness | Kurtosis | Longest run |\n\
         |------|---------|-----|-----|--------|----------|----------|-------------|\n\
         | {:.4} | {:.4} | {} | {} | {:.1} | {:.4} | {:.4} | {} |\n\n",
        s.mean, s.std_dev, s.min, s.max, s.median, s.skewness, s.kurtosis, r.longest_run
    ));

    report.push_str("## Tests\n\n");
    report.push_str("| Test | Verdict | Grade | p-value | Statistic | Conclusion |\n");
    report.push_str("|------|---------|-------|---------|-----------|------------|\n");
    for t in &b.results {
        let ok = match t.verdict {
            randcheck_tests::Verdict::Pass => "✓",
            randcheck_tests::Verdict::Fail => "✗",
            randcheck_tests::Verdict::Undefined => "?",
        };
        report.push_str(&format!(
            "| {} | {} | {} | {} | {:.4} | {} |\n",
            t.name,
            ok,
            t.grade,
            super::format_p(t.p_value),
            t.statistic,
            t.conclusion()
        ));
    }
    report.push('\n');

    for t in &b.results {
        report.push_str(&format!("### {}\n\n", t.name));
        report.push_str(&format!("{}\n\n", t.details));
        for (field, value) in t.measurements.fields() {
            report.push_str(&format!("- {field}: {value}\n"));
        }
        if let randcheck_tests::Measurements::Independence { lags, .. } = &t.measurements {
            for l in lags {
                report.push_str(&format!("- lag {}: {:.6}\n", l.lag, l.correlation));
            }
        }
        report.push('\n');
    }

    report
}

fn chrono_now() -> String {
    // Simple timestamp without chrono dependency
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", dur.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use randcheck_core::{DistributionKind, generate_seeded};

    fn sample_report() -> (Sequence, DistributionReport) {
        let spec = DistributionSpec::default_for(DistributionKind::Normal);
        let seq = generate_seeded(&spec, 20, 2_000, 4).unwrap();
        let report = DistributionReport::build(spec, &seq, Some(4), 0.001);
        (seq, report)
    }

    #[test]
    fn test_frequency_csv_has_row_per_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.csv");
        let seq = Sequence::new(vec![0, 0, 2, 3], 5).unwrap();
        write_frequency_csv(&path, &frequency_table(&seq)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Value,Count,Frequency");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "0,2,0.5");
        assert_eq!(lines[2], "1,0,0");
        assert_eq!(lines[5], "4,0,0");
    }

    #[test]
    fn test_gap_csv_quotes_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.csv");
        let seq = Sequence::new(vec![0, 1, 0, 1, 1, 0], 3).unwrap();
        write_gap_csv(&path, &gap_table(&seq)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["Value,Gaps", "0,\"2,3\"", "1,\"2,1\"", "2,"]
        );
    }

    #[test]
    fn test_markdown_report_lists_every_test() {
        let (_, report) = sample_report();
        let md = generate_report(&report);
        assert!(md.starts_with("# randcheck: Normal test results"));
        for name in ["Uniformity", "Independence", "Gap Distribution", "Runs Test", "Entropy"] {
            assert!(md.contains(&format!("### {name}")), "missing {name}");
        }
        assert!(md.contains("- Seed: 4"));
        assert!(md.contains("- lag 10:"));
    }

    #[test]
    fn test_write_outputs_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let (seq, report) = sample_report();
        write_outputs(dir.path(), &seq, &report, false).unwrap();
        for file in ["normal_test_results.md", "normal_frequency.csv", "normal_gaps.csv"] {
            assert!(dir.path().join(file).exists(), "missing {file}");
        }
        assert!(!dir.path().join("normal_test_results.json").exists());
    }

    #[test]
    fn test_write_outputs_json() {
        let dir = tempfile::tempdir().unwrap();
        let (seq, report) = sample_report();
        write_outputs(dir.path(), &seq, &report, true).unwrap();
        let text = std::fs::read_to_string(dir.path().join("normal_test_results.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["distribution"]["kind"], "normal");
        assert_eq!(json["battery"]["sample_size"], 2_000);
        assert_eq!(json["battery"]["results"].as_array().unwrap().len(), 5);
        assert_eq!(json["summary"]["count"], 2_000);
    }
}
