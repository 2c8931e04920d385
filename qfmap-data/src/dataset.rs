//! Row-major Feature Matrices

use crate::DataError;
use std::f64::consts::PI;

/// Map a latent value onto a rotation angle: `x·π + π`.
///
/// Inputs in `[-1, 1)` land in `[0, 2π)`, in particular `[0, 1)` maps into
/// `[π, 2π)`.
#[inline]
pub fn rescale_value(x: f64) -> f64 {
    x * PI + PI
}

/// Inverse of [`rescale_value`].
#[inline]
pub fn inverse_rescale_value(angle: f64) -> f64 {
    (angle - PI) / PI
}

/// Rescale every value in place.
pub fn rescale_in_place(values: &mut [f64]) {
    for v in values.iter_mut() {
        *v = rescale_value(*v);
    }
}

/// Dense 2-D `f64` matrix with a provenance name
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Dataset {
    /// Wrap row-major values; `values.len()` must equal `rows × cols`.
    pub fn new(
        name: impl Into<String>,
        rows: usize,
        cols: usize,
        values: Vec<f64>,
    ) -> Result<Self, DataError> {
        if values.len() != rows * cols {
            return Err(DataError::Shape {
                rows,
                cols,
                len: values.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            rows,
            cols,
            values,
        })
    }

    /// Build from a list of equally long rows.
    pub fn from_rows(name: impl Into<String>, rows: &[Vec<f64>]) -> Result<Self, DataError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut values = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(DataError::Shape {
                    rows: rows.len(),
                    cols,
                    len: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Self::new(name, rows.len(), cols, values)
    }

    /// Where the data came from (file path or a derived label)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows (events)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (latent features)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Whether the matrix has no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Borrow row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact(0) panics, and a zero-column matrix has no row content
        let chunk = self.cols.max(1);
        self.values.chunks_exact(chunk).take(self.rows)
    }

    /// Apply `x·π + π` to every value.
    pub fn rescale_to_angles(&mut self) {
        rescale_in_place(&mut self.values);
    }

    /// New dataset holding the given rows, in the given order.
    pub fn select_rows(&self, name: impl Into<String>, indices: &[usize]) -> Self {
        let mut values = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            values.extend_from_slice(self.row(i));
        }
        Self {
            name: name.into(),
            rows: indices.len(),
            cols: self.cols,
            values,
        }
    }

    /// First `n` rows, or an error if fewer are available.
    pub fn head(&self, n: usize) -> Result<Self, DataError> {
        if n > self.rows {
            return Err(DataError::NotEnoughRows {
                name: self.name.clone(),
                requested: n,
                available: self.rows,
            });
        }
        Ok(Self {
            name: self.name.clone(),
            rows: n,
            cols: self.cols,
            values: self.values[..n * self.cols].to_vec(),
        })
    }

    /// Stack `other` under `self`.
    pub fn concat(&self, name: impl Into<String>, other: &Dataset) -> Result<Self, DataError> {
        if self.cols != other.cols {
            return Err(DataError::ColumnMismatch {
                expected: self.cols,
                got: other.cols,
            });
        }
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        Ok(Self {
            name: name.into(),
            rows: self.rows + other.rows,
            cols: self.cols,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_round_trip() {
        for i in 0..100 {
            let x = i as f64 / 100.0;
            let angle = rescale_value(x);
            assert!((PI..2.0 * PI).contains(&angle));
            assert!((inverse_rescale_value(angle) - x).abs() < 1e-12);
        }
        assert_eq!(rescale_value(-1.0), 0.0);
    }

    #[test]
    fn test_shape_validation() {
        assert!(matches!(
            Dataset::new("x", 2, 3, vec![0.0; 5]),
            Err(DataError::Shape { .. })
        ));
        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(Dataset::from_rows("x", &ragged).is_err());
    }

    #[test]
    fn test_row_access_and_selection() {
        let ds = Dataset::from_rows("m", &[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
            .unwrap();
        assert_eq!(ds.row(1), &[3.0, 4.0]);
        assert_eq!(ds.iter_rows().count(), 3);

        let picked = ds.select_rows("picked", &[2, 0]);
        assert_eq!(picked.values(), &[5.0, 6.0, 1.0, 2.0]);

        let head = ds.head(2).unwrap();
        assert_eq!(head.rows(), 2);
        assert!(matches!(
            ds.head(4),
            Err(DataError::NotEnoughRows { requested: 4, .. })
        ));
    }

    #[test]
    fn test_concat() {
        let a = Dataset::from_rows("a", &[vec![1.0, 2.0]]).unwrap();
        let b = Dataset::from_rows("b", &[vec![3.0, 4.0]]).unwrap();
        let ab = a.concat("ab", &b).unwrap();
        assert_eq!(ab.shape(), (2, 2));

        let c = Dataset::from_rows("c", &[vec![1.0]]).unwrap();
        assert!(matches!(
            a.concat("ac", &c),
            Err(DataError::ColumnMismatch { .. })
        ));
    }

    #[test]
    fn test_rescale_dataset() {
        let mut ds = Dataset::from_rows("r", &[vec![0.0, 0.5]]).unwrap();
        ds.rescale_to_angles();
        assert!((ds.values()[0] - PI).abs() < 1e-12);
        assert!((ds.values()[1] - 1.5 * PI).abs() < 1e-12);
    }
}
