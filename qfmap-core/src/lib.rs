#![warn(missing_docs)]
//! qfmap Core - Circuit Factory
//!
//! This crate provides the quantum side of qfmap:
//! - `FeatureMap`: immutable descriptor of a dense-encoding feature map
//!   (qubit count, repetitions, entanglement topology)
//! - `Statevector`: dense pure-state evolution for `U` and `CX` gates
//! - The labelled circuit list used by the expressibility study

mod feature_map;
mod statevector;

pub use feature_map::{Entanglement, FeatureMap, LabelledCircuit, standard_circuits};
pub use statevector::{Gate2, MAX_QUBITS, Statevector, u_matrix};

use thiserror::Error;

/// Errors raised while building or evolving a circuit
#[derive(Debug, Error)]
pub enum CircuitError {
    /// A register needs at least one qubit
    #[error("qubit count must be at least 1")]
    NoQubits,

    /// A feature map needs at least one repetition
    #[error("repetition depth must be at least 1")]
    NoRepetitions,

    /// Register too large for a dense statevector
    #[error("{requested} qubits requested, dense statevectors support at most {max}")]
    TooManyQubits {
        /// Requested qubit count
        requested: usize,
        /// Supported maximum
        max: usize,
    },

    /// Parameter vector does not match `2 × n_qubits`
    #[error("parameter vector has length {got}, circuit expects {expected}")]
    ParameterLength {
        /// Expected length
        expected: usize,
        /// Supplied length
        got: usize,
    },

    /// Gate addressed a qubit outside the register
    #[error("qubit {qubit} out of range for a {n_qubits}-qubit register")]
    QubitOutOfRange {
        /// Offending qubit index
        qubit: usize,
        /// Register size
        n_qubits: usize,
    },

    /// Two-qubit gate with identical control and target
    #[error("control and target are both qubit {0}")]
    SameQubit(usize),

    /// Overlap between states of different register sizes
    #[error("cannot compare a {left}-qubit state with a {right}-qubit state")]
    DimensionMismatch {
        /// Left register size
        left: usize,
        /// Right register size
        right: usize,
    },
}
