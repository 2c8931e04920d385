//! Latent-space Loader
//!
//! Reads precomputed latent vectors from disk:
//! - `.h5` / `.hdf5`: the named dataset (default `latent_space`), requires the
//!   `hdf5` cargo feature
//! - `.npy`: the whole array; the dataset name is ignored
//!
//! Arrays of any rank ≥ 1 are flattened to `(len, -1)`.

use crate::dataset::Dataset;
use crate::DataError;
use ndarray::ArrayD;
use std::path::{Path, PathBuf};

/// Dataset key inside HDF5 files written by the autoencoder stage
pub const DEFAULT_DATASET_NAME: &str = "latent_space";

/// Loader options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// HDF5 dataset to read
    pub dataset_name: String,
    /// Apply `x·π + π` after loading
    pub rescale: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            rescale: true,
        }
    }
}

impl LoadOptions {
    /// Load values as stored, without the angle rescale
    pub fn raw() -> Self {
        Self {
            rescale: false,
            ..Self::default()
        }
    }
}

/// One dataset for one path, a list for several
#[derive(Debug, Clone, PartialEq)]
pub enum LatentData {
    /// Exactly one input file
    Single(Dataset),
    /// Several input files, in argument order
    Multiple(Vec<Dataset>),
}

impl LatentData {
    /// Flatten into a list regardless of how many files were read.
    pub fn into_vec(self) -> Vec<Dataset> {
        match self {
            LatentData::Single(ds) => vec![ds],
            LatentData::Multiple(list) => list,
        }
    }

    /// Number of datasets held
    pub fn len(&self) -> usize {
        match self {
            LatentData::Single(_) => 1,
            LatentData::Multiple(list) => list.len(),
        }
    }

    /// Whether no dataset is held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load every path and return a single dataset or a list.
pub fn load_latent(paths: &[PathBuf], options: &LoadOptions) -> Result<LatentData, DataError> {
    if paths.is_empty() {
        return Err(DataError::NoPaths);
    }
    tracing::info!(files = paths.len(), "loading latent datasets");

    let mut datasets = paths
        .iter()
        .map(|p| load_dataset(p, options))
        .collect::<Result<Vec<_>, _>>()?;

    let shapes: Vec<String> = datasets
        .iter()
        .map(|d| format!("({}, {})", d.rows(), d.cols()))
        .collect();
    tracing::info!(shapes = %shapes.join(" "), "loaded {} dataset(s)", datasets.len());

    if datasets.len() == 1 {
        Ok(LatentData::Single(datasets.remove(0)))
    } else {
        Ok(LatentData::Multiple(datasets))
    }
}

/// Load a single file into a 2-D dataset.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let (shape, values) = match extension.as_str() {
        "npy" => read_npy_array(path)?,
        "h5" | "hdf5" => read_hdf5_array(path, &options.dataset_name)?,
        other => {
            return Err(DataError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: other.to_string(),
            });
        }
    };

    let (rows, cols) = flatten_shape(path, &shape)?;
    let mut dataset = Dataset::new(path.display().to_string(), rows, cols, values)?;
    if options.rescale {
        dataset.rescale_to_angles();
    }
    tracing::debug!(path = %path.display(), rows, cols, "dataset loaded");
    Ok(dataset)
}

/// `(len, -1)` reshape of an arbitrary-rank array shape.
fn flatten_shape(path: &Path, shape: &[usize]) -> Result<(usize, usize), DataError> {
    match shape.split_first() {
        None => Err(DataError::Scalar(path.to_path_buf())),
        Some((&rows, rest)) => Ok((rows, rest.iter().product::<usize>())),
    }
}

fn read_npy_array(path: &Path) -> Result<(Vec<usize>, Vec<f64>), DataError> {
    let to_error = |e: ndarray_npy::ReadNpyError| DataError::Npy {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    match ndarray_npy::read_npy::<_, ArrayD<f64>>(path) {
        Ok(array) => Ok((array.shape().to_vec(), array.iter().copied().collect())),
        // Latent spaces are often stored as f32
        Err(first) => match ndarray_npy::read_npy::<_, ArrayD<f32>>(path) {
            Ok(array) => Ok((
                array.shape().to_vec(),
                array.iter().map(|&v| f64::from(v)).collect(),
            )),
            Err(_) => Err(to_error(first)),
        },
    }
}

#[cfg(feature = "hdf5")]
fn read_hdf5_array(path: &Path, name: &str) -> Result<(Vec<usize>, Vec<f64>), DataError> {
    let file = hdf5::File::open(path).map_err(|e| DataError::Hdf5 {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let dataset = file.dataset(name).map_err(|_| DataError::MissingDataset {
        path: path.to_path_buf(),
        name: name.to_string(),
    })?;
    let shape = dataset.shape();
    let values = dataset.read_raw::<f64>().map_err(|e| DataError::Hdf5 {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok((shape, values))
}

#[cfg(not(feature = "hdf5"))]
fn read_hdf5_array(path: &Path, _name: &str) -> Result<(Vec<usize>, Vec<f64>), DataError> {
    Err(DataError::Hdf5Disabled(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use ndarray_npy::write_npy;
    use std::f64::consts::PI;

    #[test]
    fn test_load_npy_rescaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latent.npy");
        let array = Array2::from_shape_vec((2, 2), vec![0.0, 0.5, -1.0, 0.25]).unwrap();
        write_npy(&path, &array).unwrap();

        let ds = load_dataset(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ds.shape(), (2, 2));
        assert!((ds.values()[0] - PI).abs() < 1e-12);
        assert!(ds.values()[2].abs() < 1e-12);
    }

    #[test]
    fn test_load_flattens_higher_rank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.npy");
        let array = Array3::<f32>::zeros((3, 2, 4));
        write_npy(&path, &array).unwrap();

        let ds = load_dataset(&path, &LoadOptions::raw()).unwrap();
        assert_eq!(ds.shape(), (3, 8));
        assert!(ds.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_single_vs_multiple() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.npy");
        let b = dir.path().join("b.npy");
        write_npy(&a, &Array2::<f64>::zeros((4, 8))).unwrap();
        write_npy(&b, &Array2::<f64>::zeros((4, 16))).unwrap();

        let one = load_latent(&[a.clone()], &LoadOptions::default()).unwrap();
        assert!(matches!(one, LatentData::Single(_)));

        let two = load_latent(&[a, b], &LoadOptions::default()).unwrap();
        assert_eq!(two.len(), 2);
        let list = two.into_vec();
        assert_eq!(list[1].cols(), 16);
    }

    #[test]
    fn test_missing_and_unsupported_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.npy");
        assert!(matches!(
            load_dataset(&missing, &LoadOptions::default()),
            Err(DataError::NotFound(_))
        ));

        let text = dir.path().join("data.txt");
        std::fs::write(&text, "1,2,3").unwrap();
        assert!(matches!(
            load_dataset(&text, &LoadOptions::default()),
            Err(DataError::UnsupportedFormat { .. })
        ));

        assert!(matches!(
            load_latent(&[], &LoadOptions::default()),
            Err(DataError::NoPaths)
        ));
    }

    #[cfg(feature = "hdf5")]
    fn write_h5(path: &Path, name: &str, shape: (usize, usize, usize), values: &[f64]) {
        let file = hdf5::File::create(path).unwrap();
        let dataset = file.new_dataset::<f64>().shape(shape).create(name).unwrap();
        dataset.write_raw(values).unwrap();
    }

    #[cfg(feature = "hdf5")]
    #[test]
    fn test_load_hdf5_latent_space() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latent.h5");
        let values: Vec<f64> = (0..12).map(|i| i as f64 / 12.0 - 0.5).collect();
        write_h5(&path, DEFAULT_DATASET_NAME, (3, 2, 2), &values);

        let ds = load_dataset(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ds.shape(), (3, 4));
        for (got, raw) in ds.values().iter().zip(&values) {
            assert!((got - (raw * PI + PI)).abs() < 1e-12);
        }

        let raw = load_dataset(&path, &LoadOptions::raw()).unwrap();
        assert_eq!(raw.values(), values.as_slice());
    }

    #[cfg(feature = "hdf5")]
    #[test]
    fn test_hdf5_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.h5");
        write_h5(&path, "reconstruction", (2, 2, 1), &[0.0; 4]);

        match load_dataset(&path, &LoadOptions::default()) {
            Err(DataError::MissingDataset { name, .. }) => assert_eq!(name, "latent_space"),
            other => panic!("expected a missing dataset error, got {:?}", other),
        }
    }

    #[cfg(not(feature = "hdf5"))]
    #[test]
    fn test_hdf5_requires_feature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latent.h5");
        std::fs::write(&path, b"not really hdf5").unwrap();
        assert!(matches!(
            load_dataset(&path, &LoadOptions::default()),
            Err(DataError::Hdf5Disabled(_))
        ));
    }
}
