#![warn(missing_docs)]
//! qfmap Data - Latent-space Inputs
//!
//! Loads autoencoder latent spaces and prepares them for the quantum feature
//! maps:
//! - `.npy` and (with the `hdf5` feature) `.h5` readers
//! - Affine rescale `x·π + π` onto rotation angles
//! - Test-set assembly, seeded shuffling and stratified k-fold partitioning

mod dataset;
mod folds;
mod loader;

pub use dataset::{Dataset, inverse_rescale_value, rescale_in_place, rescale_value};
pub use folds::{
    BACKGROUND_LABEL, FoldPartition, SIGNAL_LABEL, TestSet, assemble_test_set, kfold_partition,
    split_even,
};
pub use loader::{DEFAULT_DATASET_NAME, LatentData, LoadOptions, load_dataset, load_latent};

use std::path::PathBuf;
use thiserror::Error;

/// Seed for the test-set shuffle
pub const DEFAULT_SHUFFLE_SEED: u64 = 12345;

/// Errors raised while reading or partitioning data
#[derive(Debug, Error)]
pub enum DataError {
    /// No input paths were given
    #[error("no data paths given")]
    NoPaths,

    /// Input file does not exist
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Extension is neither `.npy` nor `.h5`
    #[error("unsupported data format '{extension}' for {}", path.display())]
    UnsupportedFormat {
        /// Offending file
        path: PathBuf,
        /// Lower-cased extension
        extension: String,
    },

    /// `.npy` read failure
    #[error("failed to read {}: {message}", path.display())]
    Npy {
        /// Offending file
        path: PathBuf,
        /// Reader message
        message: String,
    },

    /// HDF5 read failure
    #[error("failed to read {}: {message}", path.display())]
    Hdf5 {
        /// Offending file
        path: PathBuf,
        /// Library message
        message: String,
    },

    /// Named dataset absent from an HDF5 file
    #[error("dataset '{name}' not found in {}", path.display())]
    MissingDataset {
        /// Offending file
        path: PathBuf,
        /// Requested dataset
        name: String,
    },

    /// `.h5` input without the `hdf5` feature
    #[error("{} is an HDF5 file; rebuild with `--features hdf5` or convert it to .npy", .0.display())]
    Hdf5Disabled(PathBuf),

    /// Zero-dimensional array
    #[error("{} holds a scalar, expected at least one dimension", .0.display())]
    Scalar(PathBuf),

    /// Value count disagrees with the declared shape
    #[error("{len} values cannot form a {rows}x{cols} matrix")]
    Shape {
        /// Declared rows
        rows: usize,
        /// Declared columns
        cols: usize,
        /// Actual value count
        len: usize,
    },

    /// Fewer rows than requested
    #[error("{name}: {requested} rows requested, only {available} available")]
    NotEnoughRows {
        /// Dataset name
        name: String,
        /// Requested rows
        requested: usize,
        /// Available rows
        available: usize,
    },

    /// Datasets with different feature counts
    #[error("feature count mismatch: expected {expected}, got {got}")]
    ColumnMismatch {
        /// Expected columns
        expected: usize,
        /// Actual columns
        got: usize,
    },

    /// `k = 0` or more folds than rows
    #[error("cannot split {rows} rows into {folds} folds")]
    InvalidFolds {
        /// Requested fold count
        folds: usize,
        /// Rows available
        rows: usize,
    },
}
