//! Experiment Driver
//!
//! Orchestrates the two commands on top of the library crates.
//!
//! ## Pipeline Overview
//!
//! ```text
//! qfmap metrics                          qfmap test
//!       │                                     │
//!       ▼                                     ▼
//! ┌─────────────┐                     ┌─────────────┐
//! │   metrics   │  circuits ×         │   tester    │  model + datasets,
//! │             │  n_exp estimates    │             │  shuffle, k folds
//! └──────┬──────┘                     └──────┬──────┘
//!        │                                   │
//!        │                                   ▼
//!        │                            ┌─────────────┐
//!        │                            │    pool     │  one task per fold
//!        │                            └──────┬──────┘
//!        ▼                                   ▼
//! ┌─────────────┐                     ┌─────────────┐
//! │ formatting  │  terminal table     │  metadata   │  JSON summary header
//! └─────────────┘                     └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`metrics`] - Expressibility / entanglement experiments
//! - [`tester`] - k-fold scoring of a trained model
//! - [`pool`] - Bounded, order-preserving fold worker pool
//! - [`metadata`] - System metadata collection
//! - [`formatting`] - Human-readable output formatting

mod formatting;
mod metadata;
mod metrics;
mod pool;
mod tester;

pub use formatting::{format_metrics_table, format_test_summary};
pub use metadata::build_report_meta;
pub use metrics::{
    ComputeMode, DATA_SWEEP_QUBITS, MetricsError, MetricsSettings, UNIFORM_SWEEP_QUBITS,
    expr_ent_vs_circ, expr_vs_qubits, run_compute,
};
pub use pool::{FoldPool, PoolError, default_jobs};
pub use tester::{TestOutcome, TestSettings, run_kfold_test};
