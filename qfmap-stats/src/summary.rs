//! Summary Statistics
//!
//! Aggregates repeated Monte-Carlo estimates into a mean and spread.
//! The standard deviation is the population one (divide by `n`), so a single
//! estimate has zero spread rather than an undefined one.

use crate::percentiles::compute_percentile;

/// Summary of a set of repeated estimates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Median (linear interpolation)
    pub median: f64,
    /// Smallest estimate
    pub min: f64,
    /// Largest estimate
    pub max: f64,
    /// Number of estimates
    pub sample_count: usize,
}

/// Compute summary statistics; an empty slice yields all zeros.
pub fn compute_summary(samples: &[f64]) -> SummaryStatistics {
    if samples.is_empty() {
        return SummaryStatistics::default();
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    SummaryStatistics {
        mean,
        std_dev: variance.max(0.0).sqrt(),
        median: compute_percentile(samples, 50.0),
        min,
        max,
        sample_count: samples.len(),
    }
}

impl SummaryStatistics {
    /// Coefficient of variation in percent
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean).abs() * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let samples = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let summary = compute_summary(&samples);

        assert!((summary.mean - 5.0).abs() < 1e-12);
        // Population std of the classic example is exactly 2
        assert!((summary.std_dev - 2.0).abs() < 1e-12);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.sample_count, 8);
    }

    #[test]
    fn test_single_sample_has_zero_spread() {
        let summary = compute_summary(&[0.42]);
        assert_eq!(summary.mean, 0.42);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn test_empty_samples() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.mean, 0.0);
    }

    #[test]
    fn test_coefficient_of_variation() {
        let summary = compute_summary(&[100.0, 100.0, 100.0]);
        assert!(summary.coefficient_of_variation().abs() < f64::EPSILON);
    }
}
