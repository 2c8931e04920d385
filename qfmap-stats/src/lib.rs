#![warn(missing_docs)]
//! qfmap Statistical Engine
//!
//! Monte-Carlo diagnostics for parameterized feature-map circuits:
//! - Expressibility: KL divergence between the circuit's fidelity
//!   distribution and the Haar-random fidelity distribution
//! - Entanglement capability: mean Meyer-Wallach measure over random parameters
//! - Summary statistics (mean, population standard deviation, extremes)
//! - ROC-AUC separation between background and anomaly score distributions

mod entanglement;
mod expressibility;
mod histogram;
mod percentiles;
mod separation;
mod summary;

pub use entanglement::{entanglement_capability, meyer_wallach};
pub use expressibility::{
    ExpressibilityConfig, ParameterSource, expressibility, sample_fidelities, uniform_parameters,
};
pub use histogram::{FidelityHistogram, haar_bin_masses, kl_divergence};
pub use percentiles::compute_percentile;
pub use separation::{SeparationSummary, roc_auc, summarize_separation};
pub use summary::{SummaryStatistics, compute_summary};

use qfmap_core::CircuitError;
use thiserror::Error;

/// Number of fidelity histogram bins used for expressibility
pub const DEFAULT_N_BINS: usize = 75;

/// Parameter draws averaged for one entanglement-capability estimate
pub const DEFAULT_ENT_SHOTS: usize = 10;

/// Haar masses below this are floored so the divergence stays finite
pub const HAAR_MASS_FLOOR: f64 = 1e-12;

/// Errors raised by the estimators
#[derive(Debug, Error)]
pub enum StatsError {
    /// Circuit evaluation failed
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    /// Sampling requested with zero shots
    #[error("at least one shot is required")]
    NoShots,

    /// Histogram requested with zero bins
    #[error("at least one histogram bin is required")]
    NoBins,

    /// Data rows do not match the circuit's parameter count
    #[error("data rows have {got} features, circuit expects {expected}")]
    DataShape {
        /// Parameter count of the circuit
        expected: usize,
        /// Columns in the data
        got: usize,
    },

    /// Data-dependent sampling needs two distinct rows
    #[error("data-dependent sampling needs at least 2 rows, got {0}")]
    NotEnoughRows(usize),

    /// ROC-AUC needs both classes present
    #[error("cannot compute separation: {0} scores are empty")]
    EmptyScores(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_N_BINS, 75);
        assert_eq!(DEFAULT_ENT_SHOTS, 10);
        assert!(HAAR_MASS_FLOOR > 0.0);
    }
}
