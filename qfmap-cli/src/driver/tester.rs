//! k-fold Model Tester
//!
//! Scores a trained quantum-kernel model on a mixed test set of background
//! and anomalous events.
//!
//! - `kfolds == 1`: the whole test set is scored once, optionally on the
//!   hardware profile; scores and the test kernel are saved.
//! - `kfolds > 1`: signal and background are split into k folds each and
//!   every fold is scored as an independent task on the fold pool. Scores,
//!   the score distribution plot and a per-fold ROC-AUC summary are saved.
//!
//! All artifacts land in the model directory.

use super::metadata::build_report_meta;
use super::pool::FoldPool;
use anyhow::{Context, bail};
use qfmap_data::{
    Dataset, LoadOptions, TestSet, assemble_test_set, kfold_partition, load_dataset,
};
use qfmap_kernel::{HardwareProfile, ModelKind, QuantumKernelModel, load_credentials};
use qfmap_report::{
    KFoldSummary, ModelInfo, StatBlock, names, plot_score_distribution, write_fold_scores,
    write_json_summary, write_matrix, write_scores,
};
use qfmap_stats::{SeparationSummary, compute_summary, summarize_separation};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything a test run needs, resolved from flags and `qfmap.toml`
#[derive(Debug, Clone)]
pub struct TestSettings {
    /// Signal/anomaly dataset
    pub sig_path: PathBuf,
    /// Training background dataset
    pub bkg_path: PathBuf,
    /// Background test dataset
    pub test_bkg_path: PathBuf,
    /// Model directory, also the output directory
    pub model_dir: PathBuf,
    /// Events per class and fold
    pub ntest: usize,
    /// Number of folds
    pub kfolds: usize,
    /// Switch to the hardware profile (single fold only)
    pub mod_quantum_instance: bool,
    /// Expect a one-class model
    pub unsup: bool,
    /// Private IBMQ configuration
    pub config_file: Option<PathBuf>,
    /// Fold workers, `0` = available parallelism
    pub jobs: usize,
    /// Seed of the test-set shuffle
    pub shuffle_seed: u64,
    /// HDF5 dataset name
    pub dataset_name: String,
    /// Device profile used by `mod_quantum_instance`
    pub hardware: HardwareProfile,
    /// Write the score-distribution SVG
    pub write_plot: bool,
    /// Write the JSON summary
    pub write_summary: bool,
}

/// Scores and artifacts of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    /// Files written, in write order
    pub written: Vec<PathBuf>,
    /// Signal scores per fold (a single run is one mixed "fold")
    pub signal_scores: Vec<Vec<f64>>,
    /// Background scores per fold, empty for a single run
    pub background_scores: Vec<Vec<f64>>,
    /// Per-fold ROC-AUC, k-fold runs only
    pub separation: Option<SeparationSummary>,
    /// Backend that evaluated the kernels
    pub backend: String,
    /// Wall-clock duration
    pub elapsed_secs: f64,
}

/// Load inputs, score them and write every artifact.
pub fn run_kfold_test(settings: &TestSettings) -> anyhow::Result<TestOutcome> {
    if settings.kfolds == 0 {
        bail!("kfolds must be at least 1");
    }
    if settings.ntest == 0 {
        bail!("ntest must be at least 1");
    }

    let mut model = QuantumKernelModel::load(&settings.model_dir)
        .with_context(|| format!("loading model from {}", settings.model_dir.display()))?;
    model
        .expect_kind(ModelKind::from_unsupervised(settings.unsup))
        .context("model does not match --unsup")?;

    let test = load_test_set(settings, model.n_features())?;

    tracing::info!("computing model scores");
    let start = Instant::now();
    let mut outcome = if settings.kfolds == 1 {
        score_single(settings, &mut model, &test)?
    } else {
        score_kfold(settings, &mut model, &test, start)?
    };
    outcome.elapsed_secs = start.elapsed().as_secs_f64();
    tracing::info!(
        elapsed_secs = outcome.elapsed_secs,
        files = outcome.written.len(),
        "testing completed"
    );
    Ok(outcome)
}

/// Read the three datasets and build the shuffled test set.
fn load_test_set(settings: &TestSettings, n_features: usize) -> anyhow::Result<TestSet> {
    let options = LoadOptions {
        dataset_name: settings.dataset_name.clone(),
        rescale: true,
    };
    let load = |path: &Path| -> anyhow::Result<Dataset> {
        load_dataset(path, &options).with_context(|| format!("loading {}", path.display()))
    };

    let signal = load(&settings.sig_path)?;
    let test_bkg = load(&settings.test_bkg_path)?;
    let train_bkg = load(&settings.bkg_path)?;
    for ds in [&signal, &test_bkg, &train_bkg] {
        if ds.cols() != n_features {
            bail!(
                "{} has {} latent features, the model expects {}",
                ds.name(),
                ds.cols(),
                n_features
            );
        }
    }

    let per_class = settings.ntest * settings.kfolds;
    let mut test = assemble_test_set(&signal, &test_bkg, per_class)
        .context("assembling the test set")?;
    test.shuffle(settings.shuffle_seed);
    tracing::info!(
        events = test.len(),
        per_class,
        features = n_features,
        "test set ready"
    );
    Ok(test)
}

fn score_single(
    settings: &TestSettings,
    model: &mut QuantumKernelModel,
    test: &TestSet,
) -> anyhow::Result<TestOutcome> {
    tracing::info!("only one fold");
    if settings.mod_quantum_instance {
        let credentials = settings
            .config_file
            .as_deref()
            .map(load_credentials)
            .transpose()
            .context("reading the IBMQ configuration")?;
        model
            .reconfigure(settings.hardware.clone(), credentials.as_ref())
            .context("reconfiguring the quantum instance")?;
    }

    let scores = model.decision_function(&test.features)?;
    let mut written = Vec::new();

    let scores_path = settings
        .model_dir
        .join(names::scores(settings.ntest, settings.kfolds));
    write_scores(&scores_path, &scores)?;
    written.push(scores_path);

    if let Some(kernel) = &model.kernel_matrix_test {
        let kernel_path = settings.model_dir.join(names::KERNEL_MATRIX_TEST);
        write_matrix(&kernel_path, kernel)?;
        written.push(kernel_path);
    }

    Ok(TestOutcome {
        written,
        signal_scores: vec![scores],
        background_scores: Vec::new(),
        separation: None,
        backend: model.backend.name().to_string(),
        elapsed_secs: 0.0,
    })
}

fn score_kfold(
    settings: &TestSettings,
    model: &mut QuantumKernelModel,
    test: &TestSet,
    start: Instant,
) -> anyhow::Result<TestOutcome> {
    let k = settings.kfolds;
    tracing::info!(k, "multiple folds");
    if settings.mod_quantum_instance {
        tracing::warn!("--mod_quantum_instance only applies to single-fold runs, ignoring it");
    }

    let partition = kfold_partition(test, k).context("partitioning the test set")?;
    let tasks: Vec<&Dataset> = partition
        .signal
        .iter()
        .chain(&partition.background)
        .collect();

    let pool = FoldPool::new(settings.jobs)?;
    tracing::debug!(workers = pool.workers(), tasks = tasks.len(), "scoring folds");
    let support = model.encode_support()?;
    let shared: &QuantumKernelModel = model;
    // Task index doubles as the shot-noise stream
    let mut batches = pool.map(&tasks, |index, fold| {
        shared.score_with(&support, fold, index as u64)
    })?;

    let background_batches = batches.split_off(k);
    // The last submitted task's kernel is kept, matching a sequential run
    model.kernel_matrix_test = background_batches.last().map(|b| b.kernel_matrix.clone());

    let signal_scores: Vec<Vec<f64>> = batches.into_iter().map(|b| b.scores).collect();
    let background_scores: Vec<Vec<f64>> =
        background_batches.into_iter().map(|b| b.scores).collect();

    let dir = &settings.model_dir;
    tracing::info!(dir = %dir.display(), "saving the signal and background k-fold scores");
    let mut written = Vec::new();

    let sig_path = dir.join(names::sig_scores(settings.ntest, k));
    write_fold_scores(&sig_path, &signal_scores)?;
    written.push(sig_path);

    let bkg_path = dir.join(names::bkg_scores(settings.ntest, k));
    write_fold_scores(&bkg_path, &background_scores)?;
    written.push(bkg_path);

    if model.kind == ModelKind::OneClass {
        if let Some(kernel) = &model.kernel_matrix_test {
            let kernel_path = dir.join(names::KERNEL_MATRIX_TEST);
            write_matrix(&kernel_path, kernel)?;
            written.push(kernel_path);
        }
    }

    let all_sig: Vec<f64> = signal_scores.iter().flatten().copied().collect();
    let all_bkg: Vec<f64> = background_scores.iter().flatten().copied().collect();
    if settings.write_plot {
        let plot_path = dir.join(names::score_plot(settings.ntest));
        plot_score_distribution(
            &plot_path,
            &all_bkg,
            &all_sig,
            &format!("{} model, {} folds", model.kind, k),
        )?;
        written.push(plot_path);
    }

    // AUC treats larger as more anomalous
    let sign = model.kind.anomaly_sign();
    let oriented = |folds: &[Vec<f64>]| -> Vec<Vec<f64>> {
        folds
            .iter()
            .map(|f| f.iter().map(|s| s * sign).collect())
            .collect()
    };
    let separation = summarize_separation(&oriented(&background_scores), &oriented(&signal_scores))?;
    tracing::info!(
        auc = separation.auc.mean,
        auc_std = separation.auc.std_dev,
        "fold separation"
    );

    if settings.write_summary {
        let summary = KFoldSummary {
            meta: build_report_meta(),
            model: ModelInfo {
                path: dir.display().to_string(),
                kind: model.kind.to_string(),
                circuit: model.feature_map.to_string(),
                n_support_vectors: model.support_vectors.len(),
                backend: model.backend.name().to_string(),
            },
            ntest: settings.ntest,
            kfolds: k,
            fold_auc: separation.fold_auc.clone(),
            auc: StatBlock::from(&separation.auc),
            signal_scores: StatBlock::from(&compute_summary(&all_sig)),
            background_scores: StatBlock::from(&compute_summary(&all_bkg)),
            duration_secs: start.elapsed().as_secs_f64(),
        };
        let summary_path = dir.join(names::kfold_summary(settings.ntest, k));
        write_json_summary(&summary, &summary_path)?;
        written.push(summary_path);
    }

    Ok(TestOutcome {
        written,
        signal_scores,
        background_scores,
        separation: Some(separation),
        backend: model.backend.name().to_string(),
        elapsed_secs: 0.0,
    })
}
