//! Fidelity Histograms
//!
//! Fidelities live in `[0, 1]` and are binned into `n_bins` equal-width bins.
//! The last bin is closed on the right so a fidelity of exactly 1 is counted.
//!
//! For Haar-random states in dimension `N` the fidelity density is
//! `P(F) = (N − 1)(1 − F)^{N−2}`, whose mass over `[l, u]` integrates to
//! `(1 − l)^{N−1} − (1 − u)^{N−1}`.

use crate::{HAAR_MASS_FLOOR, StatsError};

/// Normalized histogram of sampled fidelities
#[derive(Debug, Clone, PartialEq)]
pub struct FidelityHistogram {
    counts: Vec<usize>,
    total: usize,
}

impl FidelityHistogram {
    /// Bin `samples` into `n_bins` equal bins over `[0, 1]`.
    ///
    /// Values outside the interval (rounding noise around 0 and 1) are
    /// clamped into the edge bins.
    pub fn from_samples(samples: &[f64], n_bins: usize) -> Result<Self, StatsError> {
        if n_bins == 0 {
            return Err(StatsError::NoBins);
        }
        if samples.is_empty() {
            return Err(StatsError::NoShots);
        }

        let mut counts = vec![0usize; n_bins];
        for &f in samples {
            let idx = ((f.clamp(0.0, 1.0) * n_bins as f64).floor() as usize).min(n_bins - 1);
            counts[idx] += 1;
        }
        Ok(Self {
            counts,
            total: samples.len(),
        })
    }

    /// Raw bin counts
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of bins
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    /// Probability mass per bin (sums to 1)
    pub fn masses(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|&c| c as f64 / self.total as f64)
            .collect()
    }
}

/// Haar-random fidelity mass per bin for an `n_qubits` register.
pub fn haar_bin_masses(n_qubits: usize, n_bins: usize) -> Vec<f64> {
    let exponent = 2f64.powi(n_qubits as i32) - 1.0;
    let cdf_tail = |f: f64| (1.0 - f).max(0.0).powf(exponent);
    (0..n_bins)
        .map(|k| {
            let lower = k as f64 / n_bins as f64;
            let upper = (k + 1) as f64 / n_bins as f64;
            (cdf_tail(lower) - cdf_tail(upper)).max(0.0)
        })
        .collect()
}

/// Kullback-Leibler divergence `D_KL(p ‖ q)` in nats.
///
/// Both inputs are renormalized; bins where `p` is zero contribute nothing and
/// `q` is floored at [`HAAR_MASS_FLOOR`].
pub fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    let q_floored: Vec<f64> = q.iter().map(|&x| x.max(HAAR_MASS_FLOOR)).collect();
    let p_total: f64 = p.iter().sum();
    let q_total: f64 = q_floored.iter().sum();
    if p_total <= 0.0 || q_total <= 0.0 {
        return 0.0;
    }

    p.iter()
        .zip(&q_floored)
        .filter(|(pi, _)| **pi > 0.0)
        .map(|(pi, qi)| {
            let pn = pi / p_total;
            let qn = qi / q_total;
            pn * (pn / qn).ln()
        })
        .sum()
}
