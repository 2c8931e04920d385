//! Entanglement Capability
//!
//! Meyer-Wallach measure `Q = 2(1 − (1/n) Σ_q Tr ρ_q²)`, averaged over random
//! parameter draws. `Q = 0` for product states and approaches 1 for highly
//! entangled ones.

use crate::expressibility::uniform_parameters;
use crate::StatsError;
use qfmap_core::{CircuitError, FeatureMap, Statevector};
use rand::Rng;

/// Meyer-Wallach entanglement of a single state.
pub fn meyer_wallach(state: &Statevector) -> Result<f64, CircuitError> {
    let n = state.n_qubits();
    let mut purity_sum = 0.0;
    for q in 0..n {
        purity_sum += state.qubit_purity(q)?;
    }
    let q = 2.0 * (1.0 - purity_sum / n as f64);
    // Rounding can push a product state a hair below zero
    Ok(q.max(0.0))
}

/// Mean Meyer-Wallach measure over `n_shots` uniform parameter draws.
pub fn entanglement_capability<R: Rng + ?Sized>(
    map: &FeatureMap,
    n_shots: usize,
    rng: &mut R,
) -> Result<f64, StatsError> {
    if n_shots == 0 {
        return Err(StatsError::NoShots);
    }
    let mut total = 0.0;
    for _ in 0..n_shots {
        let params = uniform_parameters(map.n_params(), rng);
        total += meyer_wallach(&map.evaluate(&params)?)?;
    }
    let value = total / n_shots as f64;
    tracing::trace!(circuit = %map, shots = n_shots, ent = value, "entanglement capability");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfmap_core::Entanglement;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    #[test]
    fn test_bell_state_is_maximally_entangled() {
        let mut sv = Statevector::zero(2).unwrap();
        sv.apply_u(0, PI / 2.0, 0.0, PI).unwrap();
        sv.apply_cx(0, 1).unwrap();
        assert!((meyer_wallach(&sv).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_entanglement_maps_score_zero() {
        let mut rng = StdRng::seed_from_u64(42);
        for ent in [Entanglement::NoneDouble, Entanglement::NoneSingle] {
            let map = FeatureMap::new(4, 2, ent).unwrap();
            let q = entanglement_capability(&map, 10, &mut rng).unwrap();
            assert!(q.abs() < 1e-10);
        }
    }

    #[test]
    fn test_single_qubit_has_no_entanglement() {
        let mut rng = StdRng::seed_from_u64(5);
        let map = FeatureMap::linear(1, 4).unwrap();
        assert!(entanglement_capability(&map, 10, &mut rng).unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_linear_map_entangles() {
        let mut rng = StdRng::seed_from_u64(42);
        let map = FeatureMap::linear(4, 2).unwrap();
        let q = entanglement_capability(&map, 20, &mut rng).unwrap();
        assert!(q > 0.05 && q <= 1.0, "got {}", q);
    }
}
