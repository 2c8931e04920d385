#![warn(missing_docs)]
//! qfmap Report - Result Writers
//!
//! Generates the artifacts of a run:
//! - CSV metrics tables (expressibility / entanglement)
//! - `.npy` score arrays and kernel matrices
//! - JSON k-fold summary with run metadata
//! - SVG score-distribution plot

mod csv;
mod json;
mod npy;
mod plot;
mod report;

pub use self::csv::{generate_csv_report, write_csv_report};
pub use json::{generate_json_summary, write_json_summary};
pub use npy::{write_fold_scores, write_matrix, write_scores};
pub use plot::{SCORE_BINS, plot_score_distribution};
pub use report::{
    ExprEntRecord, ExprQubitRecord, KFoldSummary, MetricsTable, ModelInfo, ReportMeta,
    StatBlock, SystemInfo,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing results
#[derive(Debug, Error)]
pub enum ReportError {
    /// File system failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding failure
    #[error("CSV error: {0}")]
    Csv(String),

    /// `.npy` encoding failure
    #[error("failed to write {}: {message}", path.display())]
    Npy {
        /// Offending path
        path: PathBuf,
        /// Writer message
        message: String,
    },

    /// JSON encoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Values do not form the requested array
    #[error("array shape error: {0}")]
    Shape(String),

    /// Plot rendering failure
    #[error("plot error: {0}")]
    Plot(String),

    /// Nothing to plot
    #[error("score distribution plot needs background and signal scores")]
    EmptyPlot,
}

/// Output artifact naming shared by the tester
pub mod names {
    /// Scores of a single-fold run
    pub fn scores(ntest: usize, kfolds: usize) -> String {
        format!("scores_n{}_k{}.npy", ntest, kfolds)
    }

    /// Signal scores of a k-fold run
    pub fn sig_scores(ntest: usize, kfolds: usize) -> String {
        format!("sig_scores_n{}_k{}.npy", ntest, kfolds)
    }

    /// Background scores of a k-fold run
    pub fn bkg_scores(ntest: usize, kfolds: usize) -> String {
        format!("bkg_scores_n{}_k{}.npy", ntest, kfolds)
    }

    /// Test kernel matrix
    pub const KERNEL_MATRIX_TEST: &str = "kernel_matrix_test.npy";

    /// Score distribution plot
    pub fn score_plot(ntest: usize) -> String {
        format!("score_distribution_n{}_test.svg", ntest)
    }

    /// JSON summary of a k-fold run
    pub fn kfold_summary(ntest: usize, kfolds: usize) -> String {
        format!("kfold_summary_n{}_k{}.json", ntest, kfolds)
    }
}
