//! Kernel Execution Backends
//!
//! A backend decides how one kernel entry `|⟨ψ(x)|ψ(y)⟩|²` is obtained:
//! - `Statevector`: exact overlap of two simulated states
//! - `Sampler`: the probability of the all-zero outcome of `U†(y)U(x)|0⟩`
//!   estimated from a finite number of shots
//! - `Hardware`: a device profile; without device access it runs on the
//!   sampler with the profile's shot count and transpiler seed

use crate::ModelError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};

/// Device whose calibration the hardware profile targets
pub const DEFAULT_BACKEND_NAME: &str = "ibmq_toronto";
/// Shots per circuit on hardware
pub const DEFAULT_HARDWARE_SHOTS: usize = 10_000;
/// Transpiler optimization level
pub const DEFAULT_OPTIMIZATION_LEVEL: u8 = 3;
/// Transpiler and sampler seed
pub const DEFAULT_SEED_TRANSPILER: u64 = 12345;
/// Physical qubits for an 8-qubit feature map
pub const DEFAULT_INITIAL_LAYOUT: [usize; 8] = [5, 8, 11, 14, 13, 12, 10, 7];

/// Settings for running the kernel on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareProfile {
    /// Target device
    pub backend_name: String,
    /// Shots per kernel circuit
    pub shots: usize,
    /// Transpiler optimization level (0-3)
    pub optimization_level: u8,
    /// Logical-to-physical qubit map
    pub initial_layout: Vec<usize>,
    /// Transpiler seed, also seeds the local sampler
    pub seed_transpiler: u64,
}

impl Default for HardwareProfile {
    fn default() -> Self {
        Self {
            backend_name: DEFAULT_BACKEND_NAME.to_string(),
            shots: DEFAULT_HARDWARE_SHOTS,
            optimization_level: DEFAULT_OPTIMIZATION_LEVEL,
            initial_layout: DEFAULT_INITIAL_LAYOUT.to_vec(),
            seed_transpiler: DEFAULT_SEED_TRANSPILER,
        }
    }
}

impl HardwareProfile {
    /// Check the profile against a feature map of `n_qubits` qubits.
    pub fn validate(&self, n_qubits: usize) -> Result<(), ModelError> {
        if self.shots == 0 {
            return Err(ModelError::NoShots);
        }
        if self.optimization_level > 3 {
            return Err(ModelError::OptimizationLevel(self.optimization_level));
        }
        if !self.initial_layout.is_empty() && self.initial_layout.len() != n_qubits {
            return Err(ModelError::Layout {
                layout: self.initial_layout.len(),
                n_qubits,
            });
        }
        let mut seen = self.initial_layout.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != self.initial_layout.len() {
            return Err(ModelError::DuplicateLayout(self.initial_layout.clone()));
        }
        Ok(())
    }
}

/// How kernel entries are evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Backend {
    /// Exact statevector overlap
    #[default]
    Statevector,
    /// Finite-shot estimate
    Sampler {
        /// Shots per kernel entry
        shots: usize,
        /// Base seed
        seed: u64,
    },
    /// Device profile, executed locally as a sampler
    Hardware(HardwareProfile),
}

impl Backend {
    /// Shots and seed when entries are sampled, `None` when exact.
    pub fn sampling(&self) -> Option<(usize, u64)> {
        match self {
            Backend::Statevector => None,
            Backend::Sampler { shots, seed } => Some((*shots, *seed)),
            Backend::Hardware(profile) => Some((profile.shots, profile.seed_transpiler)),
        }
    }

    /// Short name for logs and metadata
    pub fn name(&self) -> &str {
        match self {
            Backend::Statevector => "statevector_simulator",
            Backend::Sampler { .. } => "qasm_simulator",
            Backend::Hardware(profile) => &profile.backend_name,
        }
    }
}

/// Draws shot-noise estimates for one kernel row
pub(crate) struct ShotSampler {
    shots: u64,
    rng: StdRng,
}

impl ShotSampler {
    /// Per-row sampler. Every `(stream, row)` pair gets its own RNG, so
    /// parallel evaluation is reproducible and separate scoring tasks draw
    /// independent shot noise.
    pub(crate) fn for_row(shots: usize, seed: u64, stream: u64, row: usize) -> Self {
        let mixed = seed
            ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ stream.wrapping_mul(0xD1B5_4A32_D192_ED03);
        Self {
            shots: shots as u64,
            rng: StdRng::seed_from_u64(mixed),
        }
    }

    /// Fraction of `shots` all-zero outcomes for a true probability `p`.
    pub(crate) fn estimate(&mut self, p: f64) -> Result<f64, ModelError> {
        let binomial = Binomial::new(self.shots, p.clamp(0.0, 1.0))
            .map_err(|e| ModelError::Sampling(e.to_string()))?;
        Ok(binomial.sample(&mut self.rng) as f64 / self.shots as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = HardwareProfile::default();
        assert_eq!(profile.backend_name, "ibmq_toronto");
        assert_eq!(profile.shots, 10_000);
        assert_eq!(profile.optimization_level, 3);
        assert_eq!(profile.initial_layout, vec![5, 8, 11, 14, 13, 12, 10, 7]);
        assert_eq!(profile.seed_transpiler, 12345);
        assert!(profile.validate(8).is_ok());
    }

    #[test]
    fn test_profile_validation() {
        let profile = HardwareProfile::default();
        assert!(matches!(
            profile.validate(4),
            Err(ModelError::Layout {
                layout: 8,
                n_qubits: 4
            })
        ));

        let free = HardwareProfile {
            initial_layout: Vec::new(),
            ..HardwareProfile::default()
        };
        assert!(free.validate(4).is_ok());

        let dup = HardwareProfile {
            initial_layout: vec![1, 1],
            ..HardwareProfile::default()
        };
        assert!(matches!(
            dup.validate(2),
            Err(ModelError::DuplicateLayout(_))
        ));

        let bad_level = HardwareProfile {
            optimization_level: 4,
            ..HardwareProfile::default()
        };
        assert!(bad_level.validate(8).is_err());
    }

    #[test]
    fn test_backend_sampling() {
        assert_eq!(Backend::Statevector.sampling(), None);
        assert_eq!(
            Backend::Sampler { shots: 100, seed: 1 }.sampling(),
            Some((100, 1))
        );
        let hw = Backend::Hardware(HardwareProfile::default());
        assert_eq!(hw.sampling(), Some((10_000, 12345)));
        assert_eq!(hw.name(), "ibmq_toronto");
    }

    #[test]
    fn test_backend_json_tagging() {
        let json = serde_json::to_string(&Backend::Sampler { shots: 8, seed: 2 }).unwrap();
        assert!(json.contains("\"type\":\"sampler\""));
        let back: Backend = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Backend::Sampler { shots: 8, seed: 2 });
    }

    #[test]
    fn test_sampler_estimates() {
        let mut sampler = ShotSampler::for_row(1000, 5, 0, 0);
        assert_eq!(sampler.estimate(1.0).unwrap(), 1.0);
        assert_eq!(sampler.estimate(0.0).unwrap(), 0.0);
        let half = sampler.estimate(0.5).unwrap();
        assert!((half - 0.5).abs() < 0.1);

        let a = ShotSampler::for_row(1000, 5, 0, 3).estimate(0.3).unwrap();
        let b = ShotSampler::for_row(1000, 5, 0, 3).estimate(0.3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_streams_draw_independent_noise() {
        let draws = |stream: u64| -> Vec<f64> {
            let mut sampler = ShotSampler::for_row(10_000, 5, stream, 0);
            (0..8).map(|_| sampler.estimate(0.4).unwrap()).collect()
        };
        assert_eq!(draws(1), draws(1));
        assert_ne!(draws(0), draws(1));
        assert_ne!(draws(1), draws(2));
    }
}
