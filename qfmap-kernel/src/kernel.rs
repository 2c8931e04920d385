//! Fidelity Kernel
//!
//! `K(x, y) = |⟨ψ(x)|ψ(y)⟩|²` with `|ψ(x)⟩` the feature-map state of `x`.
//! Each row of a matrix is computed independently on the rayon pool.
//!
//! Sampled backends seed one RNG per `(stream, row)`. Callers scoring several
//! batches against the same model pass a distinct `stream` per batch.

use crate::ModelError;
use crate::backend::{Backend, ShotSampler};
use ndarray::Array2;
use qfmap_core::{FeatureMap, Statevector};
use qfmap_data::Dataset;
use rayon::prelude::*;

/// Feature-map states of every row of `data`, in row order.
pub fn encode_rows(map: &FeatureMap, data: &Dataset) -> Result<Vec<Statevector>, ModelError> {
    check_features(map, data)?;
    let rows: Vec<&[f64]> = data.iter_rows().collect();
    rows.par_iter()
        .map(|row| map.evaluate(row).map_err(ModelError::from))
        .collect()
}

fn check_features(map: &FeatureMap, data: &Dataset) -> Result<(), ModelError> {
    if data.cols() != map.n_params() {
        return Err(ModelError::FeatureCount {
            expected: map.n_params(),
            got: data.cols(),
        });
    }
    Ok(())
}

fn sampling_of(backend: &Backend) -> Result<Option<(usize, u64)>, ModelError> {
    match backend.sampling() {
        Some((0, _)) => Err(ModelError::NoShots),
        other => Ok(other),
    }
}

/// One kernel row of `state` against `right`.
fn kernel_row(
    state: &Statevector,
    right: &[Statevector],
    sampler: Option<ShotSampler>,
) -> Result<Vec<f64>, ModelError> {
    let mut sampler = sampler;
    right
        .iter()
        .map(|b| -> Result<f64, ModelError> {
            let exact = state.fidelity(b)?;
            match sampler.as_mut() {
                Some(s) => s.estimate(exact),
                None => Ok(exact),
            }
        })
        .collect()
}

fn assemble(rows: Vec<Vec<f64>>, n_rows: usize, n_cols: usize) -> Result<Array2<f64>, ModelError> {
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|e| ModelError::Sampling(e.to_string()))
}

/// Kernel between two sets of already encoded states (`left.len() × right.len()`).
pub fn kernel_from_states(
    left: &[Statevector],
    right: &[Statevector],
    backend: &Backend,
    stream: u64,
) -> Result<Array2<f64>, ModelError> {
    let sampling = sampling_of(backend)?;
    let rows: Vec<Vec<f64>> = left
        .par_iter()
        .enumerate()
        .map(|(i, a)| {
            let sampler = sampling.map(|(shots, seed)| ShotSampler::for_row(shots, seed, stream, i));
            kernel_row(a, right, sampler)
        })
        .collect::<Result<_, _>>()?;
    assemble(rows, left.len(), right.len())
}

/// Kernel between the rows of `data` and encoded `right` states.
///
/// Row states are built inside the worker that consumes them, so only one
/// state per worker is alive at a time. Equal to encoding `data` first and
/// calling [`kernel_from_states`].
pub fn kernel_against_states(
    map: &FeatureMap,
    data: &Dataset,
    right: &[Statevector],
    backend: &Backend,
    stream: u64,
) -> Result<Array2<f64>, ModelError> {
    check_features(map, data)?;
    let sampling = sampling_of(backend)?;
    let rows: Vec<&[f64]> = data.iter_rows().collect();
    let kernel_rows: Vec<Vec<f64>> = rows
        .par_iter()
        .enumerate()
        .map(|(i, row)| -> Result<Vec<f64>, ModelError> {
            let state = map.evaluate(row)?;
            let sampler = sampling.map(|(shots, seed)| ShotSampler::for_row(shots, seed, stream, i));
            kernel_row(&state, right, sampler)
        })
        .collect::<Result<_, _>>()?;
    assemble(kernel_rows, data.rows(), right.len())
}

/// Kernel matrix between the rows of `x` and the rows of `y`.
pub fn kernel_matrix(
    map: &FeatureMap,
    x: &Dataset,
    y: &Dataset,
    backend: &Backend,
) -> Result<Array2<f64>, ModelError> {
    let right = encode_rows(map, y)?;
    tracing::debug!(
        rows = x.rows(),
        cols = right.len(),
        backend = backend.name(),
        "evaluating kernel matrix"
    );
    kernel_against_states(map, x, &right, backend, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Dataset {
        Dataset::from_rows(
            "pts",
            &[
                vec![0.1, 0.2, 0.3, 0.4],
                vec![1.0, 2.0, 3.0, 4.0],
                vec![5.0, 0.5, 2.5, 1.5],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_gram_matrix_properties() {
        let map = FeatureMap::linear(2, 2).unwrap();
        let x = points();
        let gram = kernel_matrix(&map, &x, &x, &Backend::Statevector).unwrap();
        assert_eq!(gram.dim(), (3, 3));
        for i in 0..3 {
            assert!((gram[[i, i]] - 1.0).abs() < 1e-10);
            for j in 0..3 {
                assert!((gram[[i, j]] - gram[[j, i]]).abs() < 1e-10);
                assert!((-1e-12..=1.0 + 1e-12).contains(&gram[[i, j]]));
            }
        }
    }

    #[test]
    fn test_feature_count_checked() {
        let map = FeatureMap::linear(3, 1).unwrap();
        let err = encode_rows(&map, &points());
        assert!(matches!(
            err,
            Err(ModelError::FeatureCount {
                expected: 6,
                got: 4
            })
        ));
    }

    #[test]
    fn test_sampled_kernel_is_reproducible() {
        let map = FeatureMap::linear(2, 1).unwrap();
        let x = points();
        let backend = Backend::Sampler {
            shots: 2000,
            seed: 9,
        };
        let a = kernel_matrix(&map, &x, &x, &backend).unwrap();
        let b = kernel_matrix(&map, &x, &x, &backend).unwrap();
        assert_eq!(a, b);

        let exact = kernel_matrix(&map, &x, &x, &Backend::Statevector).unwrap();
        for (s, e) in a.iter().zip(exact.iter()) {
            assert!((s - e).abs() < 0.1);
        }
    }

    #[test]
    fn test_streamed_rows_match_encoded_rows() {
        let map = FeatureMap::linear(2, 2).unwrap();
        let x = points();
        let right = encode_rows(&map, &x).unwrap();
        let backend = Backend::Sampler {
            shots: 500,
            seed: 4,
        };
        let left = encode_rows(&map, &x).unwrap();
        assert_eq!(
            kernel_against_states(&map, &x, &right, &backend, 3).unwrap(),
            kernel_from_states(&left, &right, &backend, 3).unwrap()
        );
    }

    #[test]
    fn test_streams_decorrelate_batches() {
        let map = FeatureMap::linear(2, 1).unwrap();
        let x = points();
        let right = encode_rows(&map, &x).unwrap();
        let backend = Backend::Sampler {
            shots: 10_000,
            seed: 9,
        };
        let first = kernel_against_states(&map, &x, &right, &backend, 0).unwrap();
        let second = kernel_against_states(&map, &x, &right, &backend, 1).unwrap();
        assert_ne!(first, second);

        let exact = kernel_against_states(&map, &x, &right, &Backend::Statevector, 0).unwrap();
        let exact_other = kernel_against_states(&map, &x, &right, &Backend::Statevector, 1).unwrap();
        assert_eq!(exact, exact_other);
    }

    #[test]
    fn test_zero_shots_rejected() {
        let map = FeatureMap::linear(2, 1).unwrap();
        let backend = Backend::Sampler { shots: 0, seed: 0 };
        assert!(matches!(
            kernel_matrix(&map, &points(), &points(), &backend),
            Err(ModelError::NoShots)
        ));
    }
}
