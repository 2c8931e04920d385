//! Dense Statevector
//!
//! Minimal statevector engine for the gate set the feature maps use:
//! the generic single-qubit `U(θ, φ, λ)` rotation and `CX`.
//!
//! Qubit `q` is bit `q` of the basis-state index (little-endian ordering),
//! so `|q1 q0⟩ = |01⟩` is index 1.

use crate::CircuitError;
use num_complex::Complex64;

/// Largest register the dense representation accepts (2^24 amplitudes, 256 MiB).
pub const MAX_QUBITS: usize = 24;

/// 2x2 complex matrix in row-major order
pub type Gate2 = [[Complex64; 2]; 2];

/// Pure quantum state of an `n`-qubit register
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    n_qubits: usize,
    amplitudes: Vec<Complex64>,
}

/// Matrix of `U(θ, φ, λ)`.
///
/// `[[cos θ/2, −e^{iλ} sin θ/2], [e^{iφ} sin θ/2, e^{i(φ+λ)} cos θ/2]]`
pub fn u_matrix(theta: f64, phi: f64, lambda: f64) -> Gate2 {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        [
            Complex64::new(cos, 0.0),
            -Complex64::from_polar(sin, lambda),
        ],
        [
            Complex64::from_polar(sin, phi),
            Complex64::from_polar(cos, phi + lambda),
        ],
    ]
}

impl Statevector {
    /// The all-zero computational basis state `|0…0⟩`.
    pub fn zero(n_qubits: usize) -> Result<Self, CircuitError> {
        if n_qubits == 0 {
            return Err(CircuitError::NoQubits);
        }
        if n_qubits > MAX_QUBITS {
            return Err(CircuitError::TooManyQubits {
                requested: n_qubits,
                max: MAX_QUBITS,
            });
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << n_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            n_qubits,
            amplitudes,
        })
    }

    /// Number of qubits in the register
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Hilbert-space dimension `2^n`
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Raw amplitudes, indexed by basis state
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Squared norm `⟨ψ|ψ⟩`
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    fn check_qubit(&self, qubit: usize) -> Result<(), CircuitError> {
        if qubit >= self.n_qubits {
            return Err(CircuitError::QubitOutOfRange {
                qubit,
                n_qubits: self.n_qubits,
            });
        }
        Ok(())
    }

    /// Apply an arbitrary single-qubit gate.
    pub fn apply_single(&mut self, qubit: usize, gate: &Gate2) -> Result<(), CircuitError> {
        self.check_qubit(qubit)?;
        let stride = 1usize << qubit;
        let len = self.amplitudes.len();
        for base in (0..len).step_by(stride << 1) {
            for i in base..base + stride {
                let a0 = self.amplitudes[i];
                let a1 = self.amplitudes[i + stride];
                self.amplitudes[i] = gate[0][0] * a0 + gate[0][1] * a1;
                self.amplitudes[i + stride] = gate[1][0] * a0 + gate[1][1] * a1;
            }
        }
        Ok(())
    }

    /// Apply `U(θ, φ, λ)` to `qubit`.
    pub fn apply_u(
        &mut self,
        qubit: usize,
        theta: f64,
        phi: f64,
        lambda: f64,
    ) -> Result<(), CircuitError> {
        self.apply_single(qubit, &u_matrix(theta, phi, lambda))
    }

    /// Apply a controlled-X with the given control and target.
    pub fn apply_cx(&mut self, control: usize, target: usize) -> Result<(), CircuitError> {
        self.check_qubit(control)?;
        self.check_qubit(target)?;
        if control == target {
            return Err(CircuitError::SameQubit(control));
        }
        let cbit = 1usize << control;
        let tbit = 1usize << target;
        for i in 0..self.amplitudes.len() {
            // Visit each swapped pair once, from its target-0 member.
            if i & cbit != 0 && i & tbit == 0 {
                self.amplitudes.swap(i, i | tbit);
            }
        }
        Ok(())
    }

    /// Inner product `⟨self|other⟩`
    pub fn inner(&self, other: &Statevector) -> Result<Complex64, CircuitError> {
        if self.n_qubits != other.n_qubits {
            return Err(CircuitError::DimensionMismatch {
                left: self.n_qubits,
                right: other.n_qubits,
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// State fidelity `|⟨self|other⟩|²`
    pub fn fidelity(&self, other: &Statevector) -> Result<f64, CircuitError> {
        self.inner(other).map(|z| z.norm_sqr())
    }

    /// Purity `Tr ρ_q²` of the reduced density matrix of a single qubit.
    ///
    /// Equals 1 for a qubit in a product state and 1/2 when it is maximally
    /// entangled with the rest of the register.
    pub fn qubit_purity(&self, qubit: usize) -> Result<f64, CircuitError> {
        self.check_qubit(qubit)?;
        let stride = 1usize << qubit;
        let mut p0 = 0.0;
        let mut p1 = 0.0;
        let mut coherence = Complex64::new(0.0, 0.0);
        for i in 0..self.amplitudes.len() {
            if i & stride == 0 {
                let a0 = self.amplitudes[i];
                let a1 = self.amplitudes[i | stride];
                p0 += a0.norm_sqr();
                p1 += a1.norm_sqr();
                coherence += a0 * a1.conj();
            }
        }
        Ok(p0 * p0 + p1 * p1 + 2.0 * coherence.norm_sqr())
    }
}
