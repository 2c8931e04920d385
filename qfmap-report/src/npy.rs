//! `.npy` Array Output

use crate::ReportError;
use ndarray::{Array1, Array2};
use ndarray_npy::{WriteNpyExt, write_npy};
use std::path::Path;

/// Write a 1-D score array.
pub fn write_scores(path: &Path, scores: &[f64]) -> Result<(), ReportError> {
    let array = Array1::from(scores.to_vec());
    save(path, &array)?;
    tracing::debug!(path = %path.display(), len = scores.len(), "wrote scores");
    Ok(())
}

/// Write a 2-D matrix.
pub fn write_matrix(path: &Path, matrix: &Array2<f64>) -> Result<(), ReportError> {
    save(path, matrix)?;
    tracing::debug!(path = %path.display(), shape = ?matrix.dim(), "wrote matrix");
    Ok(())
}

/// Write per-fold scores as a `k × fold_len` array, or as one flat array
/// when folds differ in length.
pub fn write_fold_scores(path: &Path, folds: &[Vec<f64>]) -> Result<(), ReportError> {
    let fold_len = folds.first().map(Vec::len).unwrap_or(0);
    if folds.iter().all(|f| f.len() == fold_len) {
        let flat: Vec<f64> = folds.iter().flatten().copied().collect();
        let array = Array2::from_shape_vec((folds.len(), fold_len), flat)
            .map_err(|e| ReportError::Shape(e.to_string()))?;
        write_matrix(path, &array)
    } else {
        tracing::warn!(
            path = %path.display(),
            "folds differ in length, writing a flat array"
        );
        let flat: Vec<f64> = folds.iter().flatten().copied().collect();
        write_scores(path, &flat)
    }
}

fn save<T>(path: &Path, array: &T) -> Result<(), ReportError>
where
    T: WriteNpyExt,
{
    write_npy(path, array).map_err(|e| ReportError::Npy {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
