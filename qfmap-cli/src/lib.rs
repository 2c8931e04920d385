#![warn(missing_docs)]
//! qfmap CLI Library
//!
//! Command-line front end for the feature-map diagnostics:
//!
//! - `qfmap metrics`: expressibility and entanglement capability of the
//!   standard circuit list, or expressibility versus qubit count, written to
//!   `<out_path>.csv`
//! - `qfmap test`: k-fold testing of a trained quantum-kernel model, written
//!   to the model directory
//! - `qfmap init`: write a default `qfmap.toml`
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     qfmap_cli::run()
//! }
//! ```

mod config;
mod driver;

pub use config::*;
pub use driver::{
    ComputeMode, DATA_SWEEP_QUBITS, FoldPool, MetricsError, MetricsSettings, PoolError,
    TestOutcome, TestSettings, UNIFORM_SWEEP_QUBITS, build_report_meta, default_jobs,
    expr_ent_vs_circ, expr_vs_qubits, format_metrics_table, format_test_summary, run_compute,
    run_kfold_test,
};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use qfmap_data::{LoadOptions, load_latent};
use qfmap_report::write_csv_report;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

/// qfmap CLI arguments
#[derive(Parser, Debug)]
#[command(name = "qfmap")]
#[command(
    author,
    version,
    about = "qfmap - quantum feature-map diagnostics and quantum-kernel model testing"
)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (default: qfmap.toml discovered from the current directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute expressibility and entanglement capability statistics
    Metrics(MetricsArgs),
    /// k-fold testing of a trained quantum-kernel model
    Test(TestArgs),
    /// Write a default qfmap.toml
    Init {
        /// Destination file
        #[arg(default_value = CONFIG_FILE_NAME)]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments of `qfmap metrics`
#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    /// Number of qubits of the feature-map circuits
    #[arg(long = "n_qubits", default_value_t = 8)]
    pub n_qubits: usize,

    /// Fidelity samples per expressibility estimate
    #[arg(long = "n_shots")]
    pub n_shots: usize,

    /// Expressibility estimates per circuit
    #[arg(long = "n_exp")]
    pub n_exp: usize,

    /// Output path; `.csv` is appended
    #[arg(long = "out_path")]
    pub out_path: String,

    /// Latent-space dataset(s) for data-dependent expressibility
    #[arg(long = "data_path", num_args = 1..)]
    pub data_path: Vec<PathBuf>,

    /// Experiment to run
    #[arg(long, value_enum)]
    pub compute: ComputeMode,

    /// Sample parameters from the datasets instead of uniformly
    #[arg(long = "data_dependent")]
    pub data_dependent: bool,

    /// RNG seed (overrides qfmap.toml)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments of `qfmap test`
#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    /// Signal/anomaly dataset
    #[arg(long = "sig_path")]
    pub sig_path: PathBuf,

    /// Background dataset the model was trained on
    #[arg(long = "bkg_path")]
    pub bkg_path: PathBuf,

    /// Background test dataset
    #[arg(long = "test_bkg_path")]
    pub test_bkg_path: PathBuf,

    /// Model directory
    #[arg(long)]
    pub model: PathBuf,

    /// Test events per class and fold
    #[arg(long, default_value_t = 720)]
    pub ntest: usize,

    /// Number of test folds
    #[arg(long, default_value_t = 5)]
    pub kfolds: usize,

    /// Reconfigure the quantum instance and backend (single fold only)
    #[arg(long = "mod_quantum_instance")]
    pub mod_quantum_instance: bool,

    /// The model is an unsupervised (one-class) model
    #[arg(long)]
    pub unsup: bool,

    /// Private configuration file with the IBMQ API token
    #[arg(long = "config_file")]
    pub config_file: Option<PathBuf>,

    /// Fold workers (default: qfmap.toml, then all cores)
    #[arg(long)]
    pub jobs: Option<usize>,
}

/// Run the qfmap CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the qfmap CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    let config = match &cli.settings {
        Some(path) => QfmapConfig::load(path)
            .with_context(|| format!("reading settings from {}", path.display()))?,
        None => QfmapConfig::discover().unwrap_or_default(),
    };

    match &cli.command {
        Commands::Metrics(args) => {
            run_metrics(args, &config)?;
        }
        Commands::Test(args) => {
            let outcome = run_kfold_test(&test_settings(args, &config))?;
            println!(
                "{}",
                format_test_summary(
                    &outcome.written,
                    outcome.separation.as_ref(),
                    outcome.elapsed_secs
                )
            );
        }
        Commands::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            std::fs::write(path, QfmapConfig::default_toml())
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "qfmap=debug" } else { "qfmap=info" };
    // A subscriber may already be installed when called more than once
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Sampling settings from flags layered over `qfmap.toml`.
pub fn metrics_settings(args: &MetricsArgs, config: &QfmapConfig) -> MetricsSettings {
    MetricsSettings {
        n_qubits: args.n_qubits,
        n_shots: args.n_shots,
        n_exp: args.n_exp,
        n_bins: config.metrics.n_bins,
        ent_shots: config.metrics.ent_shots,
        qubit_sweep_reps: config.metrics.qubit_sweep_reps,
    }
}

/// Run `qfmap metrics` and return the CSV path.
pub fn run_metrics(args: &MetricsArgs, config: &QfmapConfig) -> anyhow::Result<PathBuf> {
    if args.data_dependent && args.data_path.is_empty() {
        bail!("--data_dependent requires at least one --data_path");
    }
    if !args.data_dependent && !args.data_path.is_empty() {
        tracing::warn!("--data_path given without --data_dependent, sampling uniformly");
    }

    let data = if args.data_dependent {
        let options = LoadOptions {
            dataset_name: config.metrics.dataset_name.clone(),
            rescale: true,
        };
        load_latent(&args.data_path, &options)
            .context("loading the data-dependent datasets")?
            .into_vec()
    } else {
        Vec::new()
    };

    let seed = args.seed.unwrap_or(config.metrics.seed);
    let mut rng = StdRng::seed_from_u64(seed);
    tracing::debug!(seed, compute = %args.compute, "starting metrics run");

    let table = run_compute(
        args.compute,
        &metrics_settings(args, config),
        &data,
        &mut rng,
    )?;
    println!("{}", format_metrics_table(&table));

    let out = PathBuf::from(format!("{}.csv", args.out_path));
    write_csv_report(&table, &out).with_context(|| format!("writing {}", out.display()))?;
    println!("Saving in {}", out.display());
    Ok(out)
}

/// Test settings from flags layered over `qfmap.toml`.
pub fn test_settings(args: &TestArgs, config: &QfmapConfig) -> TestSettings {
    TestSettings {
        sig_path: args.sig_path.clone(),
        bkg_path: args.bkg_path.clone(),
        test_bkg_path: args.test_bkg_path.clone(),
        model_dir: args.model.clone(),
        ntest: args.ntest,
        kfolds: args.kfolds,
        mod_quantum_instance: args.mod_quantum_instance,
        unsup: args.unsup,
        config_file: args.config_file.clone(),
        jobs: args.jobs.or(config.testing.jobs).unwrap_or(0),
        shuffle_seed: config.testing.shuffle_seed,
        dataset_name: config.metrics.dataset_name.clone(),
        hardware: config.hardware.to_profile(),
        write_plot: config.output.plot,
        write_summary: config.output.summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_metrics_flags() {
        let cli = Cli::try_parse_from([
            "qfmap",
            "metrics",
            "--n_shots",
            "100",
            "--n_exp",
            "3",
            "--out_path",
            "out/expr",
            "--compute",
            "expr_vs_qubits",
            "--data_path",
            "a.h5",
            "b.h5",
            "--data_dependent",
        ])
        .unwrap();
        let Commands::Metrics(args) = cli.command else {
            panic!("expected metrics");
        };
        assert_eq!(args.n_qubits, 8);
        assert_eq!(args.compute, ComputeMode::ExprVsQubits);
        assert_eq!(args.data_path.len(), 2);
        assert!(args.data_dependent);
    }

    #[test]
    fn test_unknown_compute_rejected() {
        let parsed = Cli::try_parse_from([
            "qfmap",
            "metrics",
            "--n_shots",
            "1",
            "--n_exp",
            "1",
            "--out_path",
            "x",
            "--compute",
            "kernel_alignment",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_test_defaults() {
        let cli = Cli::try_parse_from([
            "qfmap",
            "test",
            "--sig_path",
            "sig.h5",
            "--bkg_path",
            "bkg.h5",
            "--test_bkg_path",
            "test_bkg.h5",
            "--model",
            "trained/",
        ])
        .unwrap();
        let Commands::Test(args) = cli.command else {
            panic!("expected test");
        };
        assert_eq!(args.ntest, 720);
        assert_eq!(args.kfolds, 5);
        assert!(!args.unsup);

        let mut config = QfmapConfig::default();
        config.testing.jobs = Some(3);
        let settings = test_settings(&args, &config);
        assert_eq!(settings.jobs, 3);
        assert_eq!(settings.shuffle_seed, 12345);
    }

    #[test]
    fn test_data_dependent_needs_paths() {
        let args = MetricsArgs {
            n_qubits: 2,
            n_shots: 5,
            n_exp: 1,
            out_path: "unused".to_string(),
            data_path: Vec::new(),
            compute: ComputeMode::ExprEntVsCirc,
            data_dependent: true,
            seed: None,
        };
        let err = run_metrics(&args, &QfmapConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--data_path"));
    }
}
