//! Configuration loading from qfmap.toml
//!
//! qfmap settings can be specified in a `qfmap.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.
//! Command-line flags take precedence over the file.

use qfmap_kernel::HardwareProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "qfmap.toml";

/// qfmap configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct QfmapConfig {
    /// Metric estimation settings
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// k-fold testing settings
    #[serde(default)]
    pub testing: TestingConfig,
    /// Device profile used by `--mod_quantum_instance`
    #[serde(default)]
    pub hardware: HardwareConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Metric estimation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// Seed of the parameter RNG
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Histogram bins for the fidelity distribution
    #[serde(default = "default_n_bins")]
    pub n_bins: usize,
    /// Parameter draws per entanglement-capability estimate
    #[serde(default = "default_ent_shots")]
    pub ent_shots: usize,
    /// Repetition depth held fixed in the qubit sweep
    #[serde(default = "default_qubit_sweep_reps")]
    pub qubit_sweep_reps: usize,
    /// HDF5 dataset holding the latent vectors
    #[serde(default = "default_dataset_name")]
    pub dataset_name: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            n_bins: default_n_bins(),
            ent_shots: default_ent_shots(),
            qubit_sweep_reps: default_qubit_sweep_reps(),
            dataset_name: default_dataset_name(),
        }
    }
}

fn default_seed() -> u64 {
    42
}
fn default_n_bins() -> usize {
    qfmap_stats::DEFAULT_N_BINS
}
fn default_ent_shots() -> usize {
    qfmap_stats::DEFAULT_ENT_SHOTS
}
fn default_qubit_sweep_reps() -> usize {
    3
}
fn default_dataset_name() -> String {
    qfmap_data::DEFAULT_DATASET_NAME.to_string()
}

/// k-fold testing settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestingConfig {
    /// Seed of the test-set shuffle
    #[serde(default = "default_shuffle_seed")]
    pub shuffle_seed: u64,
    /// Fold workers (unset = available parallelism)
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            shuffle_seed: default_shuffle_seed(),
            jobs: None,
        }
    }
}

fn default_shuffle_seed() -> u64 {
    qfmap_data::DEFAULT_SHUFFLE_SEED
}

/// Device profile settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HardwareConfig {
    /// Target device
    #[serde(default = "default_backend_name")]
    pub backend_name: String,
    /// Shots per kernel circuit
    #[serde(default = "default_shots")]
    pub shots: usize,
    /// Transpiler optimization level
    #[serde(default = "default_optimization_level")]
    pub optimization_level: u8,
    /// Physical qubit layout
    #[serde(default = "default_initial_layout")]
    pub initial_layout: Vec<usize>,
    /// Transpiler seed
    #[serde(default = "default_seed_transpiler")]
    pub seed_transpiler: u64,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            backend_name: default_backend_name(),
            shots: default_shots(),
            optimization_level: default_optimization_level(),
            initial_layout: default_initial_layout(),
            seed_transpiler: default_seed_transpiler(),
        }
    }
}

impl HardwareConfig {
    /// Profile handed to the model on reconfiguration
    pub fn to_profile(&self) -> HardwareProfile {
        HardwareProfile {
            backend_name: self.backend_name.clone(),
            shots: self.shots,
            optimization_level: self.optimization_level,
            initial_layout: self.initial_layout.clone(),
            seed_transpiler: self.seed_transpiler,
        }
    }
}

fn default_backend_name() -> String {
    qfmap_kernel::DEFAULT_BACKEND_NAME.to_string()
}
fn default_shots() -> usize {
    qfmap_kernel::DEFAULT_HARDWARE_SHOTS
}
fn default_optimization_level() -> u8 {
    qfmap_kernel::DEFAULT_OPTIMIZATION_LEVEL
}
fn default_initial_layout() -> Vec<usize> {
    qfmap_kernel::DEFAULT_INITIAL_LAYOUT.to_vec()
}
fn default_seed_transpiler() -> u64 {
    qfmap_kernel::DEFAULT_SEED_TRANSPILER
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Write the score-distribution SVG after a k-fold run
    #[serde(default = "default_true")]
    pub plot: bool,
    /// Write the JSON k-fold summary
    #[serde(default = "default_true")]
    pub summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plot: true,
            summary: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl QfmapConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Find `qfmap.toml` in `start` or one of its ancestors.
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let cwd = std::env::current_dir().ok()?;
        let path = Self::find_from(&cwd)?;
        match Self::load(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded configuration");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable configuration: {}", e);
                None
            }
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# qfmap Configuration

[metrics]
# Seed of the parameter RNG
seed = 42
# Histogram bins for the fidelity distribution
n_bins = 75
# Parameter draws per entanglement-capability estimate
ent_shots = 10
# Repetition depth of the qubit sweep circuit
qubit_sweep_reps = 3
# Dataset holding the latent vectors inside .h5 inputs
dataset_name = "latent_space"

[testing]
# Seed of the test-set shuffle
shuffle_seed = 12345
# Fold workers (uncomment to pin; defaults to all cores)
# jobs = 4

[hardware]
# Device profile used with --mod_quantum_instance
backend_name = "ibmq_toronto"
shots = 10000
optimization_level = 3
initial_layout = [5, 8, 11, 14, 13, 12, 10, 7]
seed_transpiler = 12345

[output]
# Score distribution SVG after k-fold runs
plot = true
# JSON summary with per-fold ROC-AUC
summary = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QfmapConfig::default();
        assert_eq!(config.metrics.seed, 42);
        assert_eq!(config.metrics.n_bins, 75);
        assert_eq!(config.metrics.ent_shots, 10);
        assert_eq!(config.testing.shuffle_seed, 12345);
        assert_eq!(config.hardware.to_profile(), HardwareProfile::default());
        assert!(config.output.plot);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [metrics]
            seed = 7

            [testing]
            jobs = 2
        "#;

        let config: QfmapConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.metrics.seed, 7);
        assert_eq!(config.testing.jobs, Some(2));
        // Defaults should still apply
        assert_eq!(config.metrics.n_bins, 75);
        assert_eq!(config.hardware.shots, 10_000);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: QfmapConfig = toml::from_str(&QfmapConfig::default_toml()).unwrap();
        assert_eq!(config, QfmapConfig::default());
    }

    #[test]
    fn test_find_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        if let Some(outside) = QfmapConfig::find_from(&nested) {
            assert!(!outside.starts_with(dir.path()));
        }

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[metrics]\nseed = 1\n").unwrap();
        let found = QfmapConfig::find_from(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE_NAME));
        assert_eq!(QfmapConfig::load(&found).unwrap().metrics.seed, 1);
    }
}
