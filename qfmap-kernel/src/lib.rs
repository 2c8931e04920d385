#![warn(missing_docs)]
//! qfmap Kernel - Quantum-kernel Models
//!
//! Everything needed to score events with a trained fidelity-kernel SVM:
//! - `QuantumKernelModel`: serialized model, decision function, test kernel
//! - Kernel matrices over exact or finite-shot backends
//! - Device profile and IBMQ credentials for hardware-style runs

mod backend;
mod credentials;
mod kernel;
mod model;

pub use backend::{
    Backend, DEFAULT_BACKEND_NAME, DEFAULT_HARDWARE_SHOTS, DEFAULT_INITIAL_LAYOUT,
    DEFAULT_OPTIMIZATION_LEVEL, DEFAULT_SEED_TRANSPILER, HardwareProfile,
};
pub use credentials::{IbmqCredentials, load_credentials, parse_credentials};
pub use kernel::{encode_rows, kernel_against_states, kernel_from_states, kernel_matrix};
pub use model::{MODEL_FILE, MODEL_SUBDIR, ModelKind, QuantumKernelModel, ScoredBatch};

use qfmap_core::CircuitError;
use qfmap_data::DataError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or evaluating a model
#[derive(Debug, Error)]
pub enum ModelError {
    /// Circuit evaluation failed
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    /// Input matrix could not be formed
    #[error(transparent)]
    Data(#[from] DataError),

    /// File system failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Model without support vectors
    #[error("model has no support vectors")]
    NoSupportVectors,

    /// One dual coefficient per support vector is required
    #[error("{support_vectors} support vectors but {coefficients} dual coefficients")]
    CoefficientCount {
        /// Support vector count
        support_vectors: usize,
        /// Coefficient count
        coefficients: usize,
    },

    /// Input rows do not match the feature map
    #[error("feature map expects {expected} features per row, got {got}")]
    FeatureCount {
        /// `2 × n_qubits`
        expected: usize,
        /// Supplied columns
        got: usize,
    },

    /// Model trained in a different regime than requested
    #[error("expected a {expected} model, found a {found} model")]
    KindMismatch {
        /// Requested kind
        expected: ModelKind,
        /// Stored kind
        found: ModelKind,
    },

    /// Initial layout does not cover the register
    #[error("initial layout has {layout} qubits, feature map has {n_qubits}")]
    Layout {
        /// Layout length
        layout: usize,
        /// Register size
        n_qubits: usize,
    },

    /// Physical qubit used twice
    #[error("initial layout {0:?} repeats a physical qubit")]
    DuplicateLayout(Vec<usize>),

    /// Transpiler level outside 0-3
    #[error("optimization level {0} is not in 0..=3")]
    OptimizationLevel(u8),

    /// Sampling backend with zero shots
    #[error("sampling backend needs at least one shot")]
    NoShots,

    /// Shot sampling failed
    #[error("sampling failed: {0}")]
    Sampling(String),
}
