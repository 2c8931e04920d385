//! Expressibility
//!
//! Estimates how uniformly a feature map covers the state space:
//!
//! ```text
//! draw n_shots parameter pairs (θ, φ)     uniform in [0, 2π) or data rows
//!       │
//!       ▼
//! F = |⟨ψ(θ)|ψ(φ)⟩|²                      parallel over pairs (rayon)
//!       │
//!       ▼
//! histogram(F, n_bins) ─── D_KL ───▶ Haar fidelity distribution
//! ```
//!
//! Lower values mean the circuit is closer to Haar-random, i.e. more
//! expressive. All randomness comes from the caller's RNG and is consumed
//! before the parallel section, so the result does not depend on the number
//! of rayon threads.

use crate::histogram::{FidelityHistogram, haar_bin_masses, kl_divergence};
use crate::{DEFAULT_N_BINS, StatsError};
use qfmap_core::FeatureMap;
use rand::Rng;
use rayon::prelude::*;
use std::f64::consts::TAU;

/// Where parameter vectors come from
#[derive(Debug, Clone, Copy)]
pub enum ParameterSource<'a> {
    /// Independent uniform draws in `[0, 2π)`
    Uniform,
    /// Random pairs of distinct rows of a row-major matrix
    Data {
        /// Row-major values
        values: &'a [f64],
        /// Features per row
        cols: usize,
    },
}

impl<'a> ParameterSource<'a> {
    /// Borrow a row-major matrix as a data source
    pub fn data(values: &'a [f64], cols: usize) -> Self {
        ParameterSource::Data { values, cols }
    }

    fn validate(&self, n_params: usize) -> Result<(), StatsError> {
        if let ParameterSource::Data { values, cols } = *self {
            if cols != n_params {
                return Err(StatsError::DataShape {
                    expected: n_params,
                    got: cols,
                });
            }
            let rows = values.len() / cols.max(1);
            if rows < 2 {
                return Err(StatsError::NotEnoughRows(rows));
            }
        }
        Ok(())
    }

    fn draw_pair<R: Rng + ?Sized>(&self, n_params: usize, rng: &mut R) -> (Vec<f64>, Vec<f64>) {
        match *self {
            ParameterSource::Uniform => (
                uniform_parameters(n_params, rng),
                uniform_parameters(n_params, rng),
            ),
            ParameterSource::Data { values, cols } => {
                let rows = values.len() / cols;
                let i = rng.gen_range(0..rows);
                // Second index skips the first so the pair is always distinct
                let mut j = rng.gen_range(0..rows - 1);
                if j >= i {
                    j += 1;
                }
                (
                    values[i * cols..(i + 1) * cols].to_vec(),
                    values[j * cols..(j + 1) * cols].to_vec(),
                )
            }
        }
    }
}

/// Sampling configuration for one expressibility estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressibilityConfig {
    /// Fidelity samples per estimate
    pub n_shots: usize,
    /// Histogram bins over `[0, 1]`
    pub n_bins: usize,
}

impl ExpressibilityConfig {
    /// Config with the default bin count
    pub fn with_shots(n_shots: usize) -> Self {
        Self {
            n_shots,
            n_bins: DEFAULT_N_BINS,
        }
    }
}

/// Draw a parameter vector uniformly from `[0, 2π)^n`.
pub fn uniform_parameters<R: Rng + ?Sized>(n_params: usize, rng: &mut R) -> Vec<f64> {
    (0..n_params).map(|_| rng.gen_range(0.0..TAU)).collect()
}

/// Sample `n_shots` pairwise state fidelities of `map`.
pub fn sample_fidelities<R: Rng + ?Sized>(
    map: &FeatureMap,
    source: ParameterSource<'_>,
    n_shots: usize,
    rng: &mut R,
) -> Result<Vec<f64>, StatsError> {
    if n_shots == 0 {
        return Err(StatsError::NoShots);
    }
    let n_params = map.n_params();
    source.validate(n_params)?;

    let pairs: Vec<(Vec<f64>, Vec<f64>)> = (0..n_shots)
        .map(|_| source.draw_pair(n_params, rng))
        .collect();

    pairs
        .par_iter()
        .map(|(theta, phi)| -> Result<f64, StatsError> {
            let a = map.evaluate(theta)?;
            let b = map.evaluate(phi)?;
            Ok(a.fidelity(&b)?)
        })
        .collect()
}

/// One expressibility estimate: `D_KL(P_circuit(F) ‖ P_Haar(F))`.
pub fn expressibility<R: Rng + ?Sized>(
    map: &FeatureMap,
    source: ParameterSource<'_>,
    config: &ExpressibilityConfig,
    rng: &mut R,
) -> Result<f64, StatsError> {
    if config.n_bins == 0 {
        return Err(StatsError::NoBins);
    }
    let fidelities = sample_fidelities(map, source, config.n_shots, rng)?;
    let histogram = FidelityHistogram::from_samples(&fidelities, config.n_bins)?;
    let haar = haar_bin_masses(map.n_qubits(), config.n_bins);
    let value = kl_divergence(&histogram.masses(), &haar);
    tracing::trace!(circuit = %map, shots = config.n_shots, expr = value, "expressibility sample");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfmap_core::Entanglement;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_uniform_parameters_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let x = uniform_parameters(1000, &mut rng);
        assert!(x.iter().all(|v| (0.0..TAU).contains(v)));
    }

    #[test]
    fn test_same_seed_same_estimate() {
        let map = FeatureMap::linear(3, 2).unwrap();
        let config = ExpressibilityConfig::with_shots(200);
        let a = expressibility(
            &map,
            ParameterSource::Uniform,
            &config,
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        let b = expressibility(
            &map,
            ParameterSource::Uniform,
            &config,
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        assert_eq!(a, b);
        assert!(a >= 0.0);
    }

    #[test]
    fn test_fidelities_are_probabilities() {
        let map = FeatureMap::new(2, 1, Entanglement::Full).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let fids = sample_fidelities(&map, ParameterSource::Uniform, 50, &mut rng).unwrap();
        assert_eq!(fids.len(), 50);
        assert!(fids.iter().all(|f| (-1e-12..=1.0 + 1e-12).contains(f)));
    }

    #[test]
    fn test_constant_circuit_is_maximally_inexpressive() {
        // Identical data rows always give fidelity 1, far from Haar.
        let map = FeatureMap::linear(2, 1).unwrap();
        let rows = vec![0.3, 0.1, 0.7, 0.2, 0.3, 0.1, 0.7, 0.2];
        let config = ExpressibilityConfig::with_shots(20);
        let mut rng = StdRng::seed_from_u64(3);
        let constant =
            expressibility(&map, ParameterSource::data(&rows, 4), &config, &mut rng).unwrap();
        let uniform = expressibility(&map, ParameterSource::Uniform, &config, &mut rng).unwrap();
        assert!(constant > uniform);
    }

    #[test]
    fn test_data_shape_is_checked() {
        let map = FeatureMap::linear(2, 1).unwrap();
        let rows = vec![0.0; 9];
        let mut rng = StdRng::seed_from_u64(0);
        let err = sample_fidelities(&map, ParameterSource::data(&rows, 3), 5, &mut rng);
        assert!(matches!(
            err,
            Err(StatsError::DataShape {
                expected: 4,
                got: 3
            })
        ));

        let single = vec![0.0; 4];
        let err = sample_fidelities(&map, ParameterSource::data(&single, 4), 5, &mut rng);
        assert!(matches!(err, Err(StatsError::NotEnoughRows(1))));
    }

    #[test]
    fn test_zero_shots_rejected() {
        let map = FeatureMap::linear(1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            sample_fidelities(&map, ParameterSource::Uniform, 0, &mut rng),
            Err(StatsError::NoShots)
        ));
    }
}
