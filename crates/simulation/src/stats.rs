//! Sample statistics for simulated ROI distributions.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// ROI percentiles (percentage points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Moments and extremes of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    /// Sample standard deviation (n-1); 0 for fewer than two samples
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
}

/// Percentile of an ascending sample, interpolating linearly between the
/// two nearest order statistics. `p` is in percent.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let w = rank - lower as f64;
        sorted[lower] * (1.0 - w) + sorted[upper] * w
    }
}

/// Ascending copy of a sample.
pub fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Summarize a finite sample. Returns `None` for an empty sample.
pub fn summarize(samples: &[f64]) -> Option<DistributionSummary> {
    summarize_sorted(&sorted(samples))
}

/// Same as [`summarize`] for a sample already in ascending order.
pub fn summarize_sorted(sorted: &[f64]) -> Option<DistributionSummary> {
    if sorted.is_empty() {
        return None;
    }

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    // A constant sample has no spread; the running moments would leave
    // rounding residue of order 1e-14.
    let (mean, std_dev) = if min == max {
        (min, 0.0)
    } else {
        (sorted.iter().mean(), sorted.iter().std_dev())
    };

    Some(DistributionSummary {
        mean,
        std_dev,
        min,
        max,
        percentiles: Percentiles {
            p10: percentile(&sorted, 10.0),
            p25: percentile(&sorted, 25.0),
            p50: percentile(&sorted, 50.0),
            p75: percentile(&sorted, 75.0),
            p90: percentile(&sorted, 90.0),
        },
    })
}

/// Share of samples strictly above `threshold`.
pub fn probability_above(samples: &[f64], threshold: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().filter(|&&x| x > threshold).count() as f64 / samples.len() as f64
}
