//! Trained Quantum-kernel Models
//!
//! A model directory holds `model/model.json` with the feature map, the
//! support vectors, their dual coefficients and the intercept. Scores follow
//! the usual SVM decision function
//!
//! ```text
//! f(x) = Σ_i α_i K(sv_i, x) + b
//! ```
//!
//! For one-class models `b = −ρ`, so positive scores are inliers
//! (background) and negative scores are anomalies.

use crate::ModelError;
use crate::backend::{Backend, HardwareProfile};
use crate::credentials::IbmqCredentials;
use crate::kernel::{encode_rows, kernel_against_states};
use ndarray::Array2;
use qfmap_core::{FeatureMap, Statevector};
use qfmap_data::Dataset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Subdirectory of a model directory holding the serialized model
pub const MODEL_SUBDIR: &str = "model";
/// Serialized model file name
pub const MODEL_FILE: &str = "model.json";

/// Training regime of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// One-class SVM trained on background only
    OneClass,
    /// Binary SVM trained on background and signal
    Supervised,
}

impl ModelKind {
    /// Kind implied by the `--unsup` flag
    pub fn from_unsupervised(unsup: bool) -> Self {
        if unsup {
            ModelKind::OneClass
        } else {
            ModelKind::Supervised
        }
    }

    /// `+1` when larger scores mean more anomalous, `-1` otherwise
    pub fn anomaly_sign(self) -> f64 {
        match self {
            ModelKind::OneClass => -1.0,
            ModelKind::Supervised => 1.0,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::OneClass => write!(f, "one-class"),
            ModelKind::Supervised => write!(f, "supervised"),
        }
    }
}

/// Scores of one batch together with the kernel used to compute them
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBatch {
    /// Decision value per input row
    pub scores: Vec<f64>,
    /// `n_rows × n_support_vectors`
    pub kernel_matrix: Array2<f64>,
}

/// Trained fidelity-kernel SVM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantumKernelModel {
    /// Training regime
    pub kind: ModelKind,
    /// Circuit encoding each input row
    pub feature_map: FeatureMap,
    /// Support vectors, already rescaled to angles
    pub support_vectors: Vec<Vec<f64>>,
    /// Dual coefficient per support vector
    pub dual_coef: Vec<f64>,
    /// Decision-function offset
    pub intercept: f64,
    /// Kernel execution backend
    #[serde(default)]
    pub backend: Backend,
    /// Test kernel of the last `decision_function` call
    #[serde(skip)]
    pub kernel_matrix_test: Option<Array2<f64>>,
}

impl QuantumKernelModel {
    /// Build and validate a model.
    pub fn new(
        kind: ModelKind,
        feature_map: FeatureMap,
        support_vectors: Vec<Vec<f64>>,
        dual_coef: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, ModelError> {
        let model = Self {
            kind,
            feature_map,
            support_vectors,
            dual_coef,
            intercept,
            backend: Backend::Statevector,
            kernel_matrix_test: None,
        };
        model.validate()?;
        Ok(model)
    }

    /// Path of the model file inside a model directory
    pub fn file_path(model_dir: &Path) -> PathBuf {
        model_dir.join(MODEL_SUBDIR).join(MODEL_FILE)
    }

    /// Read `<model_dir>/model/model.json`.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let path = Self::file_path(model_dir);
        let content = std::fs::read_to_string(&path).map_err(|source| ModelError::Io {
            path: path.clone(),
            source,
        })?;
        let model: Self =
            serde_json::from_str(&content).map_err(|source| ModelError::Json {
                path: path.clone(),
                source,
            })?;
        model.validate()?;
        tracing::info!(
            path = %path.display(),
            kind = %model.kind,
            circuit = %model.feature_map,
            support_vectors = model.support_vectors.len(),
            "loaded model"
        );
        Ok(model)
    }

    /// Write `<model_dir>/model/model.json`, creating directories as needed.
    pub fn save(&self, model_dir: &Path) -> Result<PathBuf, ModelError> {
        let path = Self::file_path(model_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ModelError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ModelError::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, json).map_err(|source| ModelError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Structural checks shared by `new` and `load`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.support_vectors.is_empty() {
            return Err(ModelError::NoSupportVectors);
        }
        if self.dual_coef.len() != self.support_vectors.len() {
            return Err(ModelError::CoefficientCount {
                support_vectors: self.support_vectors.len(),
                coefficients: self.dual_coef.len(),
            });
        }
        let expected = self.feature_map.n_params();
        if let Some(sv) = self.support_vectors.iter().find(|sv| sv.len() != expected) {
            return Err(ModelError::FeatureCount {
                expected,
                got: sv.len(),
            });
        }
        if let Backend::Hardware(profile) = &self.backend {
            profile.validate(self.feature_map.n_qubits())?;
        }
        Ok(())
    }

    /// Fail unless the model was trained the way the caller expects.
    pub fn expect_kind(&self, expected: ModelKind) -> Result<(), ModelError> {
        if self.kind != expected {
            return Err(ModelError::KindMismatch {
                expected,
                found: self.kind,
            });
        }
        Ok(())
    }

    /// Input features the model expects per row
    pub fn n_features(&self) -> usize {
        self.feature_map.n_params()
    }

    /// Switch kernel evaluation to a device profile.
    pub fn reconfigure(
        &mut self,
        profile: HardwareProfile,
        credentials: Option<&IbmqCredentials>,
    ) -> Result<(), ModelError> {
        profile.validate(self.feature_map.n_qubits())?;
        match credentials {
            Some(c) => tracing::info!(
                backend = %profile.backend_name,
                provider = %c.provider(),
                "hardware profile configured"
            ),
            None => tracing::warn!(
                backend = %profile.backend_name,
                "no IBMQ credentials given"
            ),
        }
        tracing::info!(
            shots = profile.shots,
            optimization_level = profile.optimization_level,
            layout = ?profile.initial_layout,
            "device access unavailable, emulating with the local sampler"
        );
        self.backend = Backend::Hardware(profile);
        Ok(())
    }

    /// Feature-map states of the support vectors.
    ///
    /// Encode once and hand the states to [`score_with`](Self::score_with)
    /// when scoring many batches.
    pub fn encode_support(&self) -> Result<Vec<Statevector>, ModelError> {
        let sv = Dataset::from_rows("support_vectors", &self.support_vectors)?;
        encode_rows(&self.feature_map, &sv)
    }

    /// Score `data` without touching the model.
    pub fn score(&self, data: &Dataset) -> Result<ScoredBatch, ModelError> {
        self.score_with(&self.encode_support()?, data, 0)
    }

    /// Score `data` against pre-encoded support vectors. `stream` selects
    /// the shot-noise stream of sampled backends.
    pub fn score_with(
        &self,
        support: &[Statevector],
        data: &Dataset,
        stream: u64,
    ) -> Result<ScoredBatch, ModelError> {
        if support.len() != self.dual_coef.len() {
            return Err(ModelError::CoefficientCount {
                support_vectors: support.len(),
                coefficients: self.dual_coef.len(),
            });
        }
        let kernel_matrix =
            kernel_against_states(&self.feature_map, data, support, &self.backend, stream)?;

        let scores = kernel_matrix
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .zip(&self.dual_coef)
                    .map(|(k, a)| k * a)
                    .sum::<f64>()
                    + self.intercept
            })
            .collect();
        Ok(ScoredBatch {
            scores,
            kernel_matrix,
        })
    }

    /// Score `data` and keep the test kernel on the model.
    pub fn decision_function(&mut self, data: &Dataset) -> Result<Vec<f64>, ModelError> {
        let batch = self.score(data)?;
        self.kernel_matrix_test = Some(batch.kernel_matrix);
        Ok(batch.scores)
    }
}
