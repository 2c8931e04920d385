//! Output Formatting
//!
//! Terminal tables for metrics runs and k-fold test runs.

use qfmap_report::MetricsTable;
use qfmap_stats::SeparationSummary;
use std::path::PathBuf;

/// Format a metrics table for terminal display
pub fn format_metrics_table(table: &MetricsTable) -> String {
    let mut output = String::new();
    output.push('\n');
    output.push_str("Results\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');

    match table {
        MetricsTable::Circuits(rows) => {
            output.push_str(&format!(
                "{:>4}  {:<8} {:>22} {:>22}\n",
                "", "circuit", "expr", "ent"
            ));
            for (i, r) in rows.iter().enumerate() {
                output.push_str(&format!(
                    "{:>4}  {:<8} {:>10.5} ± {:<9.5} {:>10.5} ± {:<9.5}\n",
                    i, r.circuit, r.expr, r.expr_err, r.ent, r.ent_err
                ));
            }
        }
        MetricsTable::Qubits(rows) => {
            output.push_str(&format!("{:>4}  {:<8} {:>22}\n", "", "n_qubits", "expr"));
            for (i, r) in rows.iter().enumerate() {
                output.push_str(&format!(
                    "{:>4}  {:<8} {:>10.5} ± {:<9.5}\n",
                    i, r.n_qubits, r.expr, r.expr_err
                ));
            }
        }
    }
    output
}

/// Format the outcome of a test run for terminal display
pub fn format_test_summary(
    written: &[PathBuf],
    separation: Option<&SeparationSummary>,
    elapsed_secs: f64,
) -> String {
    let mut output = String::new();
    output.push('\n');

    if let Some(sep) = separation {
        output.push_str("ROC-AUC per fold\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        for (i, auc) in sep.fold_auc.iter().enumerate() {
            output.push_str(&format!("  fold {:<3} {:.4}\n", i, auc));
        }
        output.push_str(&format!(
            "  mean     {:.4} ± {:.4}\n\n",
            sep.auc.mean, sep.auc.std_dev
        ));
    }

    output.push_str("Saved:\n");
    for path in written {
        output.push_str(&format!("  {}\n", path.display()));
    }
    output.push_str(&format!(
        "Completed in: {:.2e} sec. or {:.2e} min.\n",
        elapsed_secs,
        elapsed_secs / 60.0
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfmap_report::{ExprEntRecord, ExprQubitRecord};
    use qfmap_stats::compute_summary;

    #[test]
    fn test_circuit_table_lists_labels() {
        let table = MetricsTable::Circuits(vec![ExprEntRecord {
            circuit: "FE".to_string(),
            expr: 0.01,
            expr_err: 0.002,
            ent: 0.8,
            ent_err: 0.0,
        }]);
        let text = format_metrics_table(&table);
        assert!(text.contains("FE"));
        assert!(text.contains("0.80000"));
    }

    #[test]
    fn test_qubit_table() {
        let table = MetricsTable::Qubits(vec![ExprQubitRecord {
            n_qubits: 16,
            expr: 0.5,
            expr_err: 0.1,
        }]);
        assert!(format_metrics_table(&table).contains("16"));
    }

    #[test]
    fn test_summary_lists_files_and_auc() {
        let sep = SeparationSummary {
            fold_auc: vec![0.9, 0.8],
            auc: compute_summary(&[0.9, 0.8]),
        };
        let text = format_test_summary(&[PathBuf::from("out/scores.npy")], Some(&sep), 1.5);
        assert!(text.contains("out/scores.npy"));
        assert!(text.contains("0.8500"));
    }
}
