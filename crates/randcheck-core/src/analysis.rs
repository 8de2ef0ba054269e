//! Descriptive analysis of a sequence.
//!
//! Summary statistics, the per-value frequency table and the per-value gap
//! table. Both tables are arena arrays indexed by value `0..N`, so iteration
//! order is always ascending by value.

use serde::Serialize;

use crate::sequence::Sequence;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Basic descriptive statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
    pub median: f64,
    pub skewness: f64,
    /// Excess kurtosis.
    pub kurtosis: f64,
}

/// Occurrence counts for every value in `[0, N)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    counts: Vec<u64>,
    total: usize,
}

/// One row of a [`FrequencyTable`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub value: u32,
    pub count: u64,
    pub frequency: f64,
}

/// Distances between consecutive occurrences, per value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapTable {
    gaps: Vec<Vec<usize>>,
}

// ---------------------------------------------------------------------------
// Frequency table
// ---------------------------------------------------------------------------

impl FrequencyTable {
    /// Count of `value`; zero for values outside the range.
    pub fn count(&self, value: u32) -> u64 {
        self.counts.get(value as usize).copied().unwrap_or(0)
    }

    /// Empirical probability of `value`. Zero for an empty sequence.
    pub fn frequency(&self, value: u32) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(value) as f64 / self.total as f64
    }

    /// Raw counts indexed by value.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of values tallied.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct values that occur at least once.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = FrequencyRow> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(value, &count)| FrequencyRow {
                value: value as u32,
                count,
                frequency: self.frequency(value as u32),
            })
    }
}

/// Tally every value of `seq` into `N` bins.
pub fn frequency_table(seq: &Sequence) -> FrequencyTable {
    let mut counts = vec![0u64; seq.range() as usize];
    for v in seq.iter() {
        counts[v as usize] += 1;
    }
    FrequencyTable {
        counts,
        total: seq.len(),
    }
}

// ---------------------------------------------------------------------------
// Gap table
// ---------------------------------------------------------------------------

impl GapTable {
    /// Gaps recorded for `value`, in sequence order.
    pub fn gaps_for(&self, value: u32) -> &[usize] {
        self.gaps.get(value as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All gaps pooled in ascending value order.
    pub fn pooled(&self) -> Vec<usize> {
        self.gaps.iter().flatten().copied().collect()
    }

    /// Total number of gaps across all values.
    pub fn total(&self) -> usize {
        self.gaps.iter().map(Vec::len).sum()
    }

    /// `(value, gaps)` for every value in range.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[usize])> + '_ {
        self.gaps
            .iter()
            .enumerate()
            .map(|(value, gaps)| (value as u32, gaps.as_slice()))
    }
}

/// Record, for each position, the distance since the previous occurrence of
/// the same value. First occurrences contribute no gap.
pub fn gap_table(seq: &Sequence) -> GapTable {
    let range = seq.range() as usize;
    let mut last_seen: Vec<Option<usize>> = vec![None; range];
    let mut gaps: Vec<Vec<usize>> = vec![Vec::new(); range];
    for (i, v) in seq.iter().enumerate() {
        let slot = v as usize;
        if let Some(prev) = last_seen[slot] {
            gaps[slot].push(i - prev);
        }
        last_seen[slot] = Some(i);
    }
    GapTable { gaps }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Compute summary statistics. An empty sequence yields all zeros.
pub fn summary_stats(seq: &Sequence) -> SummaryStats {
    if seq.is_empty() {
        return SummaryStats {
            count: 0,
            mean: 0.0,
            std_dev: 0.0,
            min: 0,
            max: 0,
            median: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
        };
    }

    let arr = seq.to_f64();
    let n = arr.len() as f64;
    let mean = arr.iter().sum::<f64>() / n;
    let variance = arr.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let skewness = if std_dev > 1e-10 {
        arr.iter()
            .map(|&x| ((x - mean) / std_dev).powi(3))
            .sum::<f64>()
            / n
    } else {
        0.0
    };
    let kurtosis = if std_dev > 1e-10 {
        arr.iter()
            .map(|&x| ((x - mean) / std_dev).powi(4))
            .sum::<f64>()
            / n
            - 3.0
    } else {
        0.0
    };

    let mut sorted = seq.values().to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    };

    SummaryStats {
        count: sorted.len(),
        mean,
        std_dev,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        median,
        skewness,
        kurtosis,
    }
}

/// Length of the longest block of consecutive equal values.
pub fn longest_run(seq: &Sequence) -> usize {
    let values = seq.values();
    if values.is_empty() {
        return 0;
    }
    let mut longest = 1usize;
    let mut current = 1usize;
    for w in values.windows(2) {
        if w[0] == w[1] {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
