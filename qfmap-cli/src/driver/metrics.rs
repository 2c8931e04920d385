//! Metrics Experiments
//!
//! Runs the Monte-Carlo statistics loops over circuits or qubit counts and
//! collects mean ± population standard deviation per row. The loops are
//! sequential; each expressibility estimate parallelizes its fidelity
//! samples internally.

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use qfmap_core::{CircuitError, FeatureMap, LabelledCircuit, standard_circuits};
use qfmap_data::Dataset;
use qfmap_report::{ExprEntRecord, ExprQubitRecord, MetricsTable};
use qfmap_stats::{
    ExpressibilityConfig, ParameterSource, StatsError, compute_summary, entanglement_capability,
    expressibility,
};
use rand::Rng;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// Qubit counts of the uniform-parameter sweep
pub const UNIFORM_SWEEP_QUBITS: [usize; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
/// Qubit counts of the data-dependent sweep, one dataset each
pub const DATA_SWEEP_QUBITS: [usize; 3] = [4, 8, 16];

/// Which experiment a metrics run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ComputeMode {
    /// Expressibility and entanglement for the standard circuit list
    #[value(name = "expr_ent_vs_circ")]
    ExprEntVsCirc,
    /// Expressibility as a function of the qubit count
    #[value(name = "expr_vs_qubits")]
    ExprVsQubits,
    /// Kernel variance per circuit (not available)
    #[value(name = "var_kernel_vs_circ")]
    VarKernelVsCirc,
}

impl fmt::Display for ComputeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComputeMode::ExprEntVsCirc => "expr_ent_vs_circ",
            ComputeMode::ExprVsQubits => "expr_vs_qubits",
            ComputeMode::VarKernelVsCirc => "var_kernel_vs_circ",
        };
        f.write_str(name)
    }
}

/// Errors of a metrics run
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The selected experiment is not implemented
    #[error("computation run '{0}' does not exist")]
    Unsupported(ComputeMode),

    /// Wrong number of datasets for the experiment
    #[error("{mode} needs {expected} dataset(s), got {got}")]
    DatasetCount {
        /// Experiment that was requested
        mode: ComputeMode,
        /// Datasets the experiment takes
        expected: usize,
        /// Datasets given
        got: usize,
    },

    /// A sampling setting was zero
    #[error("{0} must be at least 1")]
    Zero(&'static str),

    /// Circuit construction or evaluation failed
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    /// Estimator failure
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Sampling settings for one metrics run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSettings {
    /// Register size of the circuit list
    pub n_qubits: usize,
    /// Fidelity samples per expressibility estimate
    pub n_shots: usize,
    /// Expressibility estimates per row
    pub n_exp: usize,
    /// Fidelity histogram bins
    pub n_bins: usize,
    /// Draws per entanglement estimate
    pub ent_shots: usize,
    /// Repetition depth in the qubit sweep
    pub qubit_sweep_reps: usize,
}

impl MetricsSettings {
    fn validate(&self) -> Result<(), MetricsError> {
        for (value, name) in [
            (self.n_qubits, "n_qubits"),
            (self.n_shots, "n_shots"),
            (self.n_exp, "n_exp"),
            (self.n_bins, "n_bins"),
            (self.ent_shots, "ent_shots"),
            (self.qubit_sweep_reps, "qubit_sweep_reps"),
        ] {
            if value == 0 {
                return Err(MetricsError::Zero(name));
            }
        }
        Ok(())
    }

    fn expr_config(&self) -> ExpressibilityConfig {
        ExpressibilityConfig {
            n_shots: self.n_shots,
            n_bins: self.n_bins,
        }
    }
}

/// Run the experiment selected by `mode`. `data` is empty for uniform
/// parameter sampling.
pub fn run_compute<R: Rng + ?Sized>(
    mode: ComputeMode,
    settings: &MetricsSettings,
    data: &[Dataset],
    rng: &mut R,
) -> Result<MetricsTable, MetricsError> {
    settings.validate()?;
    match mode {
        ComputeMode::ExprEntVsCirc => {
            let dataset = match data {
                [] => None,
                [single] => Some(single),
                _ => {
                    return Err(MetricsError::DatasetCount {
                        mode,
                        expected: 1,
                        got: data.len(),
                    });
                }
            };
            expr_ent_vs_circ(settings, dataset, rng)
        }
        ComputeMode::ExprVsQubits => {
            let datasets = if data.is_empty() { None } else { Some(data) };
            expr_vs_qubits(settings, datasets, rng)
        }
        ComputeMode::VarKernelVsCirc => Err(MetricsError::Unsupported(mode)),
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn source_for(dataset: Option<&Dataset>) -> ParameterSource<'_> {
    match dataset {
        Some(ds) => ParameterSource::data(ds.values(), ds.cols()),
        None => ParameterSource::Uniform,
    }
}

/// `n_exp` expressibility estimates of one circuit, as (mean, std).
fn expr_statistics<R: Rng + ?Sized>(
    map: &FeatureMap,
    source: ParameterSource<'_>,
    settings: &MetricsSettings,
    rng: &mut R,
) -> Result<(f64, f64), MetricsError> {
    let config = settings.expr_config();
    let samples = (0..settings.n_exp)
        .map(|_| expressibility(map, source, &config, rng))
        .collect::<Result<Vec<_>, _>>()?;
    let stats = compute_summary(&samples);
    Ok((stats.mean, stats.std_dev))
}

/// Expressibility and entanglement capability of every standard circuit.
pub fn expr_ent_vs_circ<R: Rng + ?Sized>(
    settings: &MetricsSettings,
    data: Option<&Dataset>,
    rng: &mut R,
) -> Result<MetricsTable, MetricsError> {
    settings.validate()?;
    let circuits = standard_circuits(settings.n_qubits)?;
    let labels: Vec<&str> = circuits.iter().map(|c| c.label.as_str()).collect();
    tracing::info!(
        n_exp = settings.n_exp,
        n_shots = settings.n_shots,
        data_dependent = data.is_some(),
        "computing expressibility and entanglement capability for {:?}",
        labels
    );

    let start = Instant::now();
    let pb = progress_bar(circuits.len());
    let mut rows = Vec::with_capacity(circuits.len());
    for LabelledCircuit { label, map } in &circuits {
        pb.set_message(label.clone());
        // Product-state circuits have zero entanglement by construction
        let ent = if map.entanglement().is_entangling() {
            entanglement_capability(map, settings.ent_shots, rng)?
        } else {
            0.0
        };
        let (expr, expr_err) = expr_statistics(map, source_for(data), settings, rng)?;
        tracing::debug!(circuit = %label, expr, expr_err, ent, "circuit done");

        rows.push(ExprEntRecord {
            circuit: label.clone(),
            expr,
            expr_err,
            ent,
            ent_err: 0.0,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    tracing::info!(
        elapsed_secs = start.elapsed().as_secs_f64(),
        "full computation completed"
    );
    Ok(MetricsTable::Circuits(rows))
}

/// Expressibility of the linear map as a function of the qubit count.
pub fn expr_vs_qubits<R: Rng + ?Sized>(
    settings: &MetricsSettings,
    data: Option<&[Dataset]>,
    rng: &mut R,
) -> Result<MetricsTable, MetricsError> {
    settings.validate()?;
    let qubits: &[usize] = match data {
        None => &UNIFORM_SWEEP_QUBITS,
        Some(sets) if sets.len() == DATA_SWEEP_QUBITS.len() => &DATA_SWEEP_QUBITS,
        Some(sets) => {
            return Err(MetricsError::DatasetCount {
                mode: ComputeMode::ExprVsQubits,
                expected: DATA_SWEEP_QUBITS.len(),
                got: sets.len(),
            });
        }
    };
    tracing::info!(
        reps = settings.qubit_sweep_reps,
        qubits = ?qubits,
        "computing expressibility as a function of the qubit number"
    );

    let start = Instant::now();
    let pb = progress_bar(qubits.len());
    let mut rows = Vec::with_capacity(qubits.len());
    for (idx, &n) in qubits.iter().enumerate() {
        pb.set_message(format!("n_qubits = {}", n));
        let map = FeatureMap::linear(n, settings.qubit_sweep_reps)?;
        let dataset = data.map(|sets| &sets[idx]);
        let (expr, expr_err) = expr_statistics(&map, source_for(dataset), settings, rng)?;
        tracing::debug!(n_qubits = n, expr, expr_err, "qubit count done");

        rows.push(ExprQubitRecord {
            n_qubits: n,
            expr,
            expr_err,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    tracing::info!(
        elapsed_secs = start.elapsed().as_secs_f64(),
        "full computation completed"
    );
    Ok(MetricsTable::Qubits(rows))
}
