#![warn(missing_docs)]
//! # qfmap
//!
//! Diagnostics for quantum feature maps used as kernels in anomaly detection.
//!
//! - **Expressibility**: KL divergence between the fidelity distribution of a
//!   parameterised circuit and the Haar-random distribution
//! - **Entanglement Capability**: mean Meyer-Wallach measure over random
//!   parameter draws
//! - **Data-Dependent Sampling**: both metrics with parameters drawn from
//!   latent-space datasets instead of uniformly
//! - **k-fold Model Testing**: scores a trained fidelity-kernel SVM on
//!   background and anomalous test folds, in parallel, with per-fold ROC-AUC
//!
//! ## Quick Start
//!
//! ```ignore
//! use qfmap::prelude::*;
//! use rand::SeedableRng;
//!
//! let map = FeatureMap::linear(4, 2)?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let config = ExpressibilityConfig::with_shots(1000);
//! let kl = expressibility(&map, ParameterSource::Uniform, &config, &mut rng)?;
//! let ent = entanglement_capability(&map, 10, &mut rng)?;
//! ```
//!
//! ## Command Line
//!
//! ```text
//! qfmap metrics --n_qubits 8 --n_shots 1000 --n_exp 20 --compute expr_ent_vs_circ --out_path expr
//! qfmap test --sig_path sig.npy --bkg_path bkg.npy --test_bkg_path test_bkg.npy --model trained/ --kfolds 5
//! ```

// Re-export circuit types
pub use qfmap_core::{
    CircuitError, Entanglement, FeatureMap, LabelledCircuit, Statevector, standard_circuits,
};

// Re-export metrics
pub use qfmap_stats::{
    ExpressibilityConfig, ParameterSource, SeparationSummary, StatsError, SummaryStatistics,
    compute_summary, entanglement_capability, expressibility, meyer_wallach, roc_auc,
    summarize_separation,
};

// Re-export data handling
pub use qfmap_data::{
    DataError, Dataset, LatentData, LoadOptions, TestSet, assemble_test_set, kfold_partition,
    load_dataset, load_latent,
};

// Re-export kernel models
pub use qfmap_kernel::{
    Backend, HardwareProfile, ModelError, ModelKind, QuantumKernelModel, kernel_matrix,
};

// Re-export reports
pub use qfmap_report::{KFoldSummary, MetricsTable, ReportError};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Dataset, Entanglement, ExpressibilityConfig, FeatureMap, ModelKind, ParameterSource,
        QuantumKernelModel, entanglement_capability, expressibility, standard_circuits,
    };
}

/// Run the qfmap command line.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     qfmap::run()
/// }
/// ```
pub use qfmap_cli::run;

pub use qfmap_cli::{
    Cli, Commands, ComputeMode, MetricsArgs, QfmapConfig, TestArgs, TestOutcome, TestSettings,
    run_kfold_test, run_metrics, run_with_cli, test_settings,
};
