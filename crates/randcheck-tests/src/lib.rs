//! Statistical test battery for bounded-integer sequences.
//!
//! Provides five independent tests over a [`Sequence`] and its declared range
//! `N`. Each test returns a [`TestResult`] with a verdict, a p-value (where
//! applicable), a primary statistic, the full set of named measurements and a
//! letter grade (A through F).
//!
//! Degenerate input (empty sequence, zero variance, too few gaps) never
//! aborts the battery: the affected test reports [`Verdict::Undefined`] with
//! a NaN statistic and the remaining tests run as usual.

use std::f64::consts::PI;

use randcheck_core::{Sequence, frequency_table, gap_table};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Significance threshold for every p-value based verdict.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Highest autocorrelation lag examined by the independence test.
pub const MAX_LAG: usize = 10;

/// Two-sided 95% normal quantile used for the autocorrelation band.
pub const CONFIDENCE_Z: f64 = 1.96;

/// Added to every probability before taking its logarithm.
pub const ENTROPY_SMOOTHING: f64 = 1e-10;

/// Entropy ratio above which a sequence counts as high entropy.
pub const ENTROPY_RATIO_THRESHOLD: f64 = 0.9;

/// Number of tests in the battery.
pub const BATTERY_SIZE: usize = 5;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Stable identifier of each test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Uniformity,
    Independence,
    GapDistribution,
    Runs,
    Entropy,
}

impl TestKind {
    /// Battery order.
    pub const ALL: [TestKind; BATTERY_SIZE] = [
        Self::Uniformity,
        Self::Independence,
        Self::GapDistribution,
        Self::Runs,
        Self::Entropy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Uniformity => "Uniformity",
            Self::Independence => "Independence",
            Self::GapDistribution => "Gap Distribution",
            Self::Runs => "Runs Test",
            Self::Entropy => "Entropy",
        }
    }
}

/// Outcome of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    /// The statistic could not be computed for this input.
    Undefined,
}

impl Verdict {
    /// Pass iff `p` exceeds [`SIGNIFICANCE_LEVEL`].
    pub fn from_p(p: f64) -> Self {
        if p > SIGNIFICANCE_LEVEL {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub fn from_bool(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

/// Autocorrelation coefficient at one lag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagCorrelation {
    pub lag: usize,
    pub correlation: f64,
}

/// Every numeric field a test computed, per test kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measurements {
    Uniformity {
        chi_squared: f64,
        degrees_of_freedom: u32,
        expected_per_bin: f64,
    },
    Independence {
        lags: Vec<LagCorrelation>,
        max_abs_correlation: f64,
        confidence_band: f64,
        /// Lags whose coefficient lies outside the band.
        significant_lags: Vec<usize>,
    },
    GapDistribution {
        gap_count: usize,
        mean_gap: f64,
        std_gap: f64,
        min_gap: usize,
        max_gap: usize,
        /// Fitted exponential rate, `1 / mean_gap`.
        rate: f64,
        ks_statistic: f64,
    },
    Runs {
        runs: usize,
        expected_runs: f64,
        std_runs: f64,
        z: f64,
        n1: usize,
        n2: usize,
    },
    Entropy {
        entropy: f64,
        max_entropy: f64,
        ratio: f64,
    },
}

impl Measurements {
    /// Measurements of `kind` with nothing computed.
    pub fn undefined(kind: TestKind) -> Self {
        match kind {
            TestKind::Uniformity => Self::Uniformity {
                chi_squared: f64::NAN,
                degrees_of_freedom: 0,
                expected_per_bin: f64::NAN,
            },
            TestKind::Independence => Self::Independence {
                lags: Vec::new(),
                max_abs_correlation: f64::NAN,
                confidence_band: f64::NAN,
                significant_lags: Vec::new(),
            },
            TestKind::GapDistribution => Self::GapDistribution {
                gap_count: 0,
                mean_gap: f64::NAN,
                std_gap: f64::NAN,
                min_gap: 0,
                max_gap: 0,
                rate: f64::NAN,
                ks_statistic: f64::NAN,
            },
            TestKind::Runs => Self::Runs {
                runs: 0,
                expected_runs: f64::NAN,
                std_runs: f64::NAN,
                z: f64::NAN,
                n1: 0,
                n2: 0,
            },
            TestKind::Entropy => Self::Entropy {
                entropy: f64::NAN,
                max_entropy: f64::NAN,
                ratio: f64::NAN,
            },
        }
    }

    pub fn kind(&self) -> TestKind {
        match self {
            Self::Uniformity { .. } => TestKind::Uniformity,
            Self::Independence { .. } => TestKind::Independence,
            Self::GapDistribution { .. } => TestKind::GapDistribution,
            Self::Runs { .. } => TestKind::Runs,
            Self::Entropy { .. } => TestKind::Entropy,
        }
    }

    /// Scalar fields as `(name, value)` pairs, for tabular reports.
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        match self {
            Self::Uniformity {
                chi_squared,
                degrees_of_freedom,
                expected_per_bin,
            } => vec![
                ("chi_squared", *chi_squared),
                ("degrees_of_freedom", *degrees_of_freedom as f64),
                ("expected_per_bin", *expected_per_bin),
            ],
            Self::Independence {
                max_abs_correlation,
                confidence_band,
                significant_lags,
                ..
            } => vec![
                ("max_abs_correlation", *max_abs_correlation),
                ("confidence_band", *confidence_band),
                ("significant_lag_count", significant_lags.len() as f64),
            ],
            Self::GapDistribution {
                gap_count,
                mean_gap,
                std_gap,
                min_gap,
                max_gap,
                rate,
                ks_statistic,
            } => vec![
                ("gap_count", *gap_count as f64),
                ("mean_gap", *mean_gap),
                ("std_gap", *std_gap),
                ("min_gap", *min_gap as f64),
                ("max_gap", *max_gap as f64),
                ("rate", *rate),
                ("ks_statistic", *ks_statistic),
            ],
            Self::Runs {
                runs,
                expected_runs,
                std_runs,
                z,
                n1,
                n2,
            } => vec![
                ("runs", *runs as f64),
                ("expected_runs", *expected_runs),
                ("std_runs", *std_runs),
                ("z", *z),
                ("n1", *n1 as f64),
                ("n2", *n2 as f64),
            ],
            Self::Entropy {
                entropy,
                max_entropy,
                ratio,
            } => vec![
                ("entropy", *entropy),
                ("max_entropy", *max_entropy),
                ("ratio", *ratio),
            ],
        }
    }
}

/// Result of a single randomness test.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub kind: TestKind,
    pub name: String,
    pub verdict: Verdict,
    pub p_value: Option<f64>,
    /// Primary statistic; NaN when undefined.
    pub statistic: f64,
    pub details: String,
    pub grade: char,
    pub measurements: Measurements,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.05
    /// - C: p >= 0.01
    /// - D: p >= 0.001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.05 => 'B',
            Some(p) if p >= 0.01 => 'C',
            Some(p) if p >= 0.001 => 'D',
            _ => 'F',
        }
    }

    /// Result for a statistic that could not be computed.
    pub fn undefined(measurements: Measurements, details: impl Into<String>) -> Self {
        let kind = measurements.kind();
        TestResult {
            kind,
            name: kind.name().to_string(),
            verdict: Verdict::Undefined,
            p_value: None,
            statistic: f64::NAN,
            details: details.into(),
            grade: 'F',
            measurements,
        }
    }

    /// Result whose verdict follows from a p-value.
    fn from_p(p: f64, statistic: f64, measurements: Measurements, details: String) -> Self {
        let kind = measurements.kind();
        TestResult {
            kind,
            name: kind.name().to_string(),
            verdict: Verdict::from_p(p),
            p_value: Some(p),
            statistic,
            details,
            grade: Self::grade_from_p(Some(p)),
            measurements,
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    pub fn is_undefined(&self) -> bool {
        self.verdict == Verdict::Undefined
    }

    /// Human-readable conclusion for this test's verdict.
    pub fn conclusion(&self) -> &'static str {
        match (self.kind, self.verdict) {
            (_, Verdict::Undefined) => "undefined",
            (TestKind::Uniformity, Verdict::Pass) => "uniform",
            (TestKind::Uniformity, Verdict::Fail) => "not uniform",
            (TestKind::Independence, Verdict::Pass) => "independent",
            (TestKind::Independence, Verdict::Fail) => "not independent",
            (TestKind::GapDistribution, Verdict::Pass) => "gaps are exponential",
            (TestKind::GapDistribution, Verdict::Fail) => "gaps are not exponential",
            (TestKind::Runs, Verdict::Pass) => "random",
            (TestKind::Runs, Verdict::Fail) => "not random",
            (TestKind::Entropy, Verdict::Pass) => "high entropy",
            (TestKind::Entropy, Verdict::Fail) => "low entropy",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Return an undefined `TestResult` when data is too short.
fn insufficient(kind: TestKind, needed: usize, got: usize) -> TestResult {
    TestResult::undefined(
        Measurements::undefined(kind),
        format!("Insufficient data: need {needed}, got {got}"),
    )
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// One-sample Kolmogorov-Smirnov statistic `sup |F_n(x) - F(x)|` over sorted data.
fn ks_statistic(sorted: &[f64], cdf: impl Fn(f64) -> f64) -> f64 {
    let n = sorted.len() as f64;
    sorted.iter().enumerate().fold(0.0f64, |d, (i, &x)| {
        let f_x = cdf(x);
        let d_plus = (i + 1) as f64 / n - f_x;
        let d_minus = f_x - i as f64 / n;
        d.max(d_plus).max(d_minus)
    })
}

/// Asymptotic Kolmogorov p-value with Stephens' small-sample correction.
fn kolmogorov_p_value(d: f64, n: usize) -> f64 {
    let sqrt_n = (n as f64).sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;
    if lambda <= 0.0 {
        return 1.0;
    }
    let p = if lambda < 1.18 {
        // Theta-function form of the CDF; the alternating series converges
        // too slowly for small lambda.
        let mut cdf = 0.0;
        for k in 1..=100i32 {
            let j = (2 * k - 1) as f64;
            cdf += (-(j * j) * PI * PI / (8.0 * lambda * lambda)).exp();
        }
        1.0 - (2.0 * PI).sqrt() / lambda * cdf
    } else {
        let mut sum = 0.0;
        for k in 1..=100i32 {
            let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
            sum += sign * (-2.0 * (k as f64 * lambda).powi(2)).exp();
        }
        2.0 * sum
    };
    p.clamp(0.0, 1.0)
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. UNIFORMITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Test 1: Chi-squared goodness of fit against the uniform distribution on
/// the declared `N` bins.
pub fn uniformity_test(seq: &Sequence) -> TestResult {
    let kind = TestKind::Uniformity;
    let n = seq.len();
    if n == 0 {
        return insufficient(kind, 1, n);
    }
    let range = seq.range();
    let df = range - 1;
    let expected = n as f64 / range as f64;
    let chi2: f64 = frequency_table(seq)
        .counts()
        .iter()
        .map(|&c| {
            if expected > 0.0 {
                let diff = c as f64 - expected;
                diff * diff / expected
            } else {
                0.0
            }
        })
        .sum();
    let measurements = Measurements::Uniformity {
        chi_squared: chi2,
        degrees_of_freedom: df,
        expected_per_bin: expected,
    };
    if df == 0 {
        return TestResult::undefined(measurements, "Single-value range: zero degrees of freedom");
    }
    let dist = match ChiSquared::new(df as f64) {
        Ok(dist) => dist,
        Err(e) => return TestResult::undefined(measurements, format!("Chi-squared: {e}")),
    };
    let p = dist.sf(chi2);
    TestResult::from_p(
        p,
        chi2,
        measurements,
        format!("chi2={chi2:.4}, df={df}, expected_per_bin={expected:.2}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. INDEPENDENCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Test 2: Autocorrelation at lags 1-10 against the `±1.96/√n` band.
///
/// Coefficients are normalized by the lag-0 sum of squares of the centered
/// series. No p-value; the verdict is band-based.
pub fn independence_test(seq: &Sequence) -> TestResult {
    let kind = TestKind::Independence;
    let n = seq.len();
    if n < 2 {
        return insufficient(kind, 2, n);
    }
    let arr = seq.to_f64();
    let m = mean(&arr);
    let centered: Vec<f64> = arr.iter().map(|x| x - m).collect();
    let c0: f64 = centered.iter().map(|d| d * d).sum();
    if c0 < 1e-10 {
        return TestResult::undefined(Measurements::undefined(kind), "Zero variance");
    }

    let band = CONFIDENCE_Z / (n as f64).sqrt();
    let max_lag = MAX_LAG.min(n - 1);
    let mut lags = Vec::with_capacity(max_lag);
    let mut significant_lags = Vec::new();
    let mut max_abs = 0.0f64;
    for lag in 1..=max_lag {
        let sum: f64 = centered
            .iter()
            .zip(&centered[lag..])
            .map(|(a, b)| a * b)
            .sum();
        let r = sum / c0;
        max_abs = max_abs.max(r.abs());
        if r.abs() > band {
            significant_lags.push(lag);
        }
        lags.push(LagCorrelation {
            lag,
            correlation: r,
        });
    }

    let passed = significant_lags.is_empty();
    let grade = if max_abs < band * 0.5 {
        'A'
    } else if max_abs < band {
        'B'
    } else if max_abs < band * 2.0 {
        'C'
    } else if max_abs < band * 4.0 {
        'D'
    } else {
        'F'
    };
    let details = format!(
        "max|r|={max_abs:.4}, band={band:.4}, significant_lags={significant_lags:?}"
    );
    TestResult {
        kind,
        name: kind.name().to_string(),
        verdict: Verdict::from_bool(passed),
        p_value: None,
        statistic: max_abs,
        details,
        grade,
        measurements: Measurements::Independence {
            lags,
            max_abs_correlation: max_abs,
            confidence_band: band,
            significant_lags,
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// 3. GAP DISTRIBUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Test 3: Pooled gaps between repeated values against a fitted exponential,
/// via a Kolmogorov-Smirnov test. Rate is estimated as `1 / mean(gaps)`.
///
/// Fewer than two gaps is undefined.
pub fn gap_distribution_test(seq: &Sequence) -> TestResult {
    let gaps = gap_table(seq).pooled();
    let m = gaps.len();
    if m < 2 {
        return TestResult::undefined(
            Measurements::GapDistribution {
                gap_count: m,
                mean_gap: f64::NAN,
                std_gap: f64::NAN,
                min_gap: gaps.first().copied().unwrap_or(0),
                max_gap: gaps.first().copied().unwrap_or(0),
                rate: f64::NAN,
                ks_statistic: f64::NAN,
            },
            format!("Fewer than 2 gaps (got {m})"),
        );
    }

    let mut sorted: Vec<f64> = gaps.iter().map(|&g| g as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mean_gap = mean(&sorted);
    let std_gap = (sorted.iter().map(|g| (g - mean_gap).powi(2)).sum::<f64>() / m as f64).sqrt();
    let rate = 1.0 / mean_gap;
    let d = ks_statistic(&sorted, |x| 1.0 - (-rate * x).exp());
    let p = kolmogorov_p_value(d, m);

    let min_gap = gaps.iter().copied().min().unwrap_or(0);
    let max_gap = gaps.iter().copied().max().unwrap_or(0);
    TestResult::from_p(
        p,
        d,
        Measurements::GapDistribution {
            gap_count: m,
            mean_gap,
            std_gap,
            min_gap,
            max_gap,
            rate,
            ks_statistic: d,
        },
        format!("gaps={m}, mean={mean_gap:.2}, rate={rate:.5}, D={d:.5}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 4. RUNS
// ═══════════════════════════════════════════════════════════════════════════════

/// Test 4: Wald-Wolfowitz runs test over runs of equal values.
///
/// The expected count and variance use a two-category split: `n1` is the
/// number of occurrences of the first value, `n2` everything else. With more
/// than two distinct values the observed run count is far above that
/// expectation, so multi-valued sequences are usually rejected. The split is
/// kept as is; treat the verdict as meaningful only for (near) binary data.
pub fn runs_test(seq: &Sequence) -> TestResult {
    let kind = TestKind::Runs;
    let values = seq.values();
    let n = values.len();
    if n == 0 {
        return insufficient(kind, 1, n);
    }
    let runs = 1 + values.windows(2).filter(|w| w[0] != w[1]).count();
    let first = values[0];
    let n1 = values.iter().filter(|&&v| v == first).count();
    let n2 = n - n1;

    let (a, b) = (n1 as f64, n2 as f64);
    let total = a + b;
    let expected = 1.0 + 2.0 * a * b / total;
    let variance = if n > 1 {
        2.0 * a * b * (2.0 * a * b - a - b) / (total * total * (total - 1.0))
    } else {
        0.0
    };

    if variance <= 0.0 {
        return TestResult::undefined(
            Measurements::Runs {
                runs,
                expected_runs: expected,
                std_runs: 0.0,
                z: f64::NAN,
                n1,
                n2,
            },
            format!("Zero variance: runs={runs}, n1={n1}, n2={n2}"),
        );
    }

    let std = variance.sqrt();
    let z = (runs as f64 - expected) / std;
    let p = 2.0 * (1.0 - Normal::standard().cdf(z.abs()));
    TestResult::from_p(
        p,
        z,
        Measurements::Runs {
            runs,
            expected_runs: expected,
            std_runs: std,
            z,
            n1,
            n2,
        },
        format!("runs={runs}, expected={expected:.1}, z={z:.4}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 5. ENTROPY
// ═══════════════════════════════════════════════════════════════════════════════

/// Test 5: Shannon entropy over the `N` values relative to `log2(N)`.
///
/// Probabilities are smoothed by [`ENTROPY_SMOOTHING`] inside the logarithm
/// so empty bins contribute zero instead of NaN. Threshold heuristic, no
/// p-value.
pub fn entropy_test(seq: &Sequence) -> TestResult {
    let kind = TestKind::Entropy;
    let n = seq.len();
    if n == 0 {
        return insufficient(kind, 1, n);
    }
    let table = frequency_table(seq);
    let h: f64 = -table
        .counts()
        .iter()
        .map(|&c| {
            let p = c as f64 / n as f64;
            p * (p + ENTROPY_SMOOTHING).log2()
        })
        .sum::<f64>();
    // Smoothing pushes a certain outcome slightly below zero.
    let h = h.max(0.0);
    let h_max = (seq.range() as f64).log2();
    if h_max <= 0.0 {
        return TestResult::undefined(
            Measurements::Entropy {
                entropy: h,
                max_entropy: h_max,
                ratio: f64::NAN,
            },
            "Single-value range: maximum entropy is zero",
        );
    }
    let ratio = h / h_max;
    let grade = if ratio > 0.95 {
        'A'
    } else if ratio > ENTROPY_RATIO_THRESHOLD {
        'B'
    } else if ratio > 0.7 {
        'C'
    } else if ratio > 0.5 {
        'D'
    } else {
        'F'
    };
    TestResult {
        kind,
        name: kind.name().to_string(),
        verdict: Verdict::from_bool(ratio > ENTROPY_RATIO_THRESHOLD),
        p_value: None,
        statistic: ratio,
        details: format!("{h:.4} / {h_max:.4} bits ({:.1}%)", ratio * 100.0),
        grade,
        measurements: Measurements::Entropy {
            entropy: h,
            max_entropy: h_max,
            ratio,
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test battery
// ═══════════════════════════════════════════════════════════════════════════════

type TestFn = fn(&Sequence) -> TestResult;

const BATTERY: [(TestKind, TestFn); BATTERY_SIZE] = [
    (TestKind::Uniformity, uniformity_test),
    (TestKind::Independence, independence_test),
    (TestKind::GapDistribution, gap_distribution_test),
    (TestKind::Runs, runs_test),
    (TestKind::Entropy, entropy_test),
];

/// Run the five-test battery on a sequence.
///
/// Always returns one result per test in the order uniformity, independence,
/// gap distribution, runs, entropy.
pub fn run_all_tests(seq: &Sequence) -> [TestResult; BATTERY_SIZE] {
    BATTERY.map(|(kind, test_fn)| run_isolated(kind, test_fn, seq))
}

/// Run one test, replacing a panic with an undefined result of the same kind.
fn run_isolated(kind: TestKind, test_fn: TestFn, seq: &Sequence) -> TestResult {
    let result = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| test_fn(seq))) {
        Ok(result) => result,
        Err(_) => TestResult::undefined(Measurements::undefined(kind), "Test panicked"),
    };
    if result.is_undefined() {
        log::warn!("{}: undefined ({})", result.name, result.details);
    } else {
        log::debug!("{}: {}", result.name, result.details);
    }
    result
}

/// Calculate overall quality score (0-100) from test results.
///
/// Each grade maps to a score: A=100, B=75, C=50, D=25, F=0.
/// Returns the average across all tests.
pub fn calculate_quality_score(results: &[TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| match r.grade {
            'A' => 100.0,
            'B' => 75.0,
            'C' => 50.0,
            'D' => 25.0,
            _ => 0.0,
        })
        .sum();
    total / results.len() as f64
}

/// Battery results bundled with their context, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct BatteryReport {
    pub range: u32,
    pub sample_size: usize,
    pub passed: usize,
    pub undefined: usize,
    pub score: f64,
    pub results: [TestResult; BATTERY_SIZE],
}

impl BatteryReport {
    /// Run the battery on `seq` and summarize.
    pub fn new(seq: &Sequence) -> Self {
        let results = run_all_tests(seq);
        BatteryReport {
            range: seq.range(),
            sample_size: seq.len(),
            passed: results.iter().filter(|r| r.passed()).count(),
            undefined: results.iter().filter(|r| r.is_undefined()).count(),
            score: calculate_quality_score(&results),
            results,
        }
    }
}
