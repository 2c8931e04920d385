//! Feature Map Circuits
//!
//! Dense-encoding feature maps with data re-uploading. Every qubit consumes a
//! consecutive pair of features `(x[2q], x[2q+1])`, so a map over `n` qubits
//! takes a parameter vector of length `2n`.
//!
//! One repetition is:
//!
//! ```text
//! U(π/2, x[2q], x[2q+1])  on every qubit
//! CX layer                (topology dependent, absent for the NE maps)
//! U(x[2q], x[2q+1], 0)    on every qubit (absent for NE_1)
//! ```

use crate::statevector::{MAX_QUBITS, Statevector};
use crate::CircuitError;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// Which qubit pairs receive a `CX` in each repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entanglement {
    /// No entanglement, both rotation layers (`NE_0`)
    NoneDouble,
    /// No entanglement, first rotation layer only (`NE_1`)
    NoneSingle,
    /// Nearest-neighbour chain `CX(i, i+1)`
    Linear,
    /// Complete graph `CX(i, j)` for every `i < j`
    Full,
}

impl Entanglement {
    /// Whether this topology applies any two-qubit gate
    pub fn is_entangling(self) -> bool {
        matches!(self, Entanglement::Linear | Entanglement::Full)
    }

    /// Ordered `(control, target)` pairs for one repetition
    pub fn pairs(self, n_qubits: usize) -> Vec<(usize, usize)> {
        match self {
            Entanglement::NoneDouble | Entanglement::NoneSingle => Vec::new(),
            Entanglement::Linear => (0..n_qubits.saturating_sub(1)).map(|i| (i, i + 1)).collect(),
            Entanglement::Full => (0..n_qubits)
                .flat_map(|i| (i + 1..n_qubits).map(move |j| (i, j)))
                .collect(),
        }
    }

    fn has_second_layer(self) -> bool {
        !matches!(self, Entanglement::NoneSingle)
    }
}

impl fmt::Display for Entanglement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entanglement::NoneDouble => write!(f, "none-type-0"),
            Entanglement::NoneSingle => write!(f, "none-type-1"),
            Entanglement::Linear => write!(f, "linear"),
            Entanglement::Full => write!(f, "full"),
        }
    }
}

/// Serialized shape of a [`FeatureMap`], validated on the way in
#[derive(Deserialize)]
struct RawFeatureMap {
    n_qubits: usize,
    reps: usize,
    entanglement: Entanglement,
}

impl TryFrom<RawFeatureMap> for FeatureMap {
    type Error = CircuitError;

    fn try_from(raw: RawFeatureMap) -> Result<Self, Self::Error> {
        FeatureMap::new(raw.n_qubits, raw.reps, raw.entanglement)
    }
}

/// Immutable circuit descriptor
///
/// Replaces a closure over `(n_qubits, reps)`: the configuration is a plain
/// value and [`FeatureMap::evaluate`] takes the parameters explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureMap")]
pub struct FeatureMap {
    n_qubits: usize,
    reps: usize,
    entanglement: Entanglement,
}

impl FeatureMap {
    /// Create a validated descriptor.
    pub fn new(
        n_qubits: usize,
        reps: usize,
        entanglement: Entanglement,
    ) -> Result<Self, CircuitError> {
        if n_qubits == 0 {
            return Err(CircuitError::NoQubits);
        }
        if n_qubits > MAX_QUBITS {
            return Err(CircuitError::TooManyQubits {
                requested: n_qubits,
                max: MAX_QUBITS,
            });
        }
        if reps == 0 {
            return Err(CircuitError::NoRepetitions);
        }
        Ok(Self {
            n_qubits,
            reps,
            entanglement,
        })
    }

    /// Shorthand for the nearest-neighbour chain map
    pub fn linear(n_qubits: usize, reps: usize) -> Result<Self, CircuitError> {
        Self::new(n_qubits, reps, Entanglement::Linear)
    }

    /// Number of qubits
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Number of repetitions of the encoding block
    pub fn reps(&self) -> usize {
        self.reps
    }

    /// Entanglement topology
    pub fn entanglement(&self) -> Entanglement {
        self.entanglement
    }

    /// Required parameter-vector length (`2 × n_qubits`)
    pub fn n_params(&self) -> usize {
        2 * self.n_qubits
    }

    /// Number of `CX` gates in the whole circuit
    pub fn cx_count(&self) -> usize {
        self.reps * self.entanglement.pairs(self.n_qubits).len()
    }

    /// Build the output state for one parameter vector.
    pub fn evaluate(&self, params: &[f64]) -> Result<Statevector, CircuitError> {
        if params.len() != self.n_params() {
            return Err(CircuitError::ParameterLength {
                expected: self.n_params(),
                got: params.len(),
            });
        }

        let pairs = self.entanglement.pairs(self.n_qubits);
        let mut state = Statevector::zero(self.n_qubits)?;
        for _ in 0..self.reps {
            for (qubit, x) in params.chunks_exact(2).enumerate() {
                state.apply_u(qubit, FRAC_PI_2, x[0], x[1])?;
            }
            for &(control, target) in &pairs {
                state.apply_cx(control, target)?;
            }
            if self.entanglement.has_second_layer() {
                for (qubit, x) in params.chunks_exact(2).enumerate() {
                    state.apply_u(qubit, x[0], x[1], 0.0)?;
                }
            }
        }
        Ok(state)
    }
}

impl fmt::Display for FeatureMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}q/{}rep/{}",
            self.n_qubits, self.reps, self.entanglement
        )
    }
}

/// A feature map with the label it carries in result tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledCircuit {
    /// Table label, e.g. `NE_0` or `L=3`
    pub label: String,
    /// The circuit itself
    pub map: FeatureMap,
}

impl LabelledCircuit {
    /// Attach a label to a map
    pub fn new(label: impl Into<String>, map: FeatureMap) -> Self {
        Self {
            label: label.into(),
            map,
        }
    }
}

/// The nine circuits compared in the expressibility/entanglement study.
///
/// Order: `NE_0`, `NE_1`, `L=1` … `L=6`, `FE`.
pub fn standard_circuits(n_qubits: usize) -> Result<Vec<LabelledCircuit>, CircuitError> {
    let mut circuits = Vec::with_capacity(9);
    circuits.push(LabelledCircuit::new(
        "NE_0",
        FeatureMap::new(n_qubits, 1, Entanglement::NoneDouble)?,
    ));
    circuits.push(LabelledCircuit::new(
        "NE_1",
        FeatureMap::new(n_qubits, 1, Entanglement::NoneSingle)?,
    ));
    for reps in 1..=6 {
        circuits.push(LabelledCircuit::new(
            format!("L={}", reps),
            FeatureMap::linear(n_qubits, reps)?,
        ));
    }
    circuits.push(LabelledCircuit::new(
        "FE",
        FeatureMap::new(n_qubits, 3, Entanglement::Full)?,
    ));
    Ok(circuits)
}
