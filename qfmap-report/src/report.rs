//! Report Data Structures

use chrono::{DateTime, Utc};
use qfmap_stats::SummaryStatistics;
use serde::{Deserialize, Serialize};

/// Expressibility and entanglement of one labelled circuit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprEntRecord {
    /// Circuit label (`NE_0`, `L=3`, `FE`, ...)
    pub circuit: String,
    /// Mean expressibility over the experiment runs
    pub expr: f64,
    /// Population standard deviation of the expressibility
    pub expr_err: f64,
    /// Mean Meyer-Wallach entanglement
    pub ent: f64,
    /// Spread of the entanglement estimate
    pub ent_err: f64,
}

/// Expressibility at one register size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprQubitRecord {
    /// Qubit count
    pub n_qubits: usize,
    /// Mean expressibility
    pub expr: f64,
    /// Population standard deviation
    pub expr_err: f64,
}

/// Ordered statistics table produced by one metrics run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum MetricsTable {
    /// One row per labelled circuit
    Circuits(Vec<ExprEntRecord>),
    /// One row per qubit count
    Qubits(Vec<ExprQubitRecord>),
}

impl MetricsTable {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            MetricsTable::Circuits(rows) => rows.len(),
            MetricsTable::Qubits(rows) => rows.len(),
        }
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names after the index column
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            MetricsTable::Circuits(_) => &["circuit", "expr", "expr_err", "ent", "ent_err"],
            MetricsTable::Qubits(_) => &["n_qubits", "expr", "expr_err"],
        }
    }
}

/// Distribution summary of a set of values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub samples: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl From<&SummaryStatistics> for StatBlock {
    fn from(stats: &SummaryStatistics) -> Self {
        Self {
            samples: stats.sample_count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            median: stats.median,
            min: stats.min,
            max: stats.max,
        }
    }
}

/// Complete k-fold test report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KFoldSummary {
    pub meta: ReportMeta,
    pub model: ModelInfo,
    pub ntest: usize,
    pub kfolds: usize,
    /// ROC-AUC of background vs. signal, per fold
    pub fold_auc: Vec<f64>,
    pub auc: StatBlock,
    pub signal_scores: StatBlock,
    pub background_scores: StatBlock,
    pub duration_secs: f64,
}

/// Model details captured in the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub path: String,
    pub kind: String,
    pub circuit: String,
    pub n_support_vectors: usize,
    pub backend: String,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub system: SystemInfo,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu: String,
    pub cpu_cores: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfmap_stats::compute_summary;

    #[test]
    fn test_table_shape() {
        let table = MetricsTable::Qubits(vec![ExprQubitRecord {
            n_qubits: 1,
            expr: 0.2,
            expr_err: 0.01,
        }]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns(), &["n_qubits", "expr", "expr_err"]);
        assert!(MetricsTable::Circuits(vec![]).is_empty());
    }

    #[test]
    fn test_stat_block_from_summary() {
        let stats = compute_summary(&[1.0, 2.0, 3.0]);
        let block = StatBlock::from(&stats);
        assert_eq!(block.samples, 3);
        assert!((block.mean - 2.0).abs() < 1e-12);
        assert_eq!(block.max, 3.0);
    }
}
