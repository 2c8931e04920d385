//! CSV Output
//!
//! Tables carry a leading unnamed index column so files line up with
//! dataframe-style readers:
//!
//! ```text
//! ,circuit,expr,expr_err,ent,ent_err
//! 0,NE_0,0.43,0.01,0.0,0.0
//! ```

use crate::ReportError;
use crate::report::MetricsTable;
use std::path::Path;

/// Render a metrics table as CSV text.
pub fn generate_csv_report(table: &MetricsTable) -> Result<String, ReportError> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    write_table(&mut writer, table)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Csv(e.to_string()))
}

/// Write a metrics table to `path`.
pub fn write_csv_report(table: &MetricsTable, path: &Path) -> Result<(), ReportError> {
    let mut writer = ::csv::Writer::from_path(path).map_err(|e| ReportError::Csv(e.to_string()))?;
    write_table(&mut writer, table)?;
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), rows = table.len(), "wrote metrics table");
    Ok(())
}

fn write_table<W: std::io::Write>(
    writer: &mut ::csv::Writer<W>,
    table: &MetricsTable,
) -> Result<(), ReportError> {
    let csv_err = |e: ::csv::Error| ReportError::Csv(e.to_string());

    let mut header = vec![""];
    header.extend_from_slice(table.columns());
    writer.write_record(&header).map_err(csv_err)?;

    match table {
        MetricsTable::Circuits(rows) => {
            for (i, r) in rows.iter().enumerate() {
                writer
                    .write_record([
                        i.to_string(),
                        r.circuit.clone(),
                        r.expr.to_string(),
                        r.expr_err.to_string(),
                        r.ent.to_string(),
                        r.ent_err.to_string(),
                    ])
                    .map_err(csv_err)?;
            }
        }
        MetricsTable::Qubits(rows) => {
            for (i, r) in rows.iter().enumerate() {
                writer
                    .write_record([
                        i.to_string(),
                        r.n_qubits.to_string(),
                        r.expr.to_string(),
                        r.expr_err.to_string(),
                    ])
                    .map_err(csv_err)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ExprEntRecord, ExprQubitRecord};

    #[test]
    fn test_circuit_table_layout() {
        let table = MetricsTable::Circuits(vec![
            ExprEntRecord {
                circuit: "NE_0".to_string(),
                expr: 0.5,
                expr_err: 0.25,
                ent: 0.0,
                ent_err: 0.0,
            },
            ExprEntRecord {
                circuit: "L=1".to_string(),
                expr: 0.125,
                expr_err: 0.0,
                ent: 0.75,
                ent_err: 0.0,
            },
        ]);
        let text = generate_csv_report(&table).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ",circuit,expr,expr_err,ent,ent_err");
        assert_eq!(lines[1], "0,NE_0,0.5,0.25,0,0");
        assert_eq!(lines[2], "1,L=1,0.125,0,0.75,0");
    }

    #[test]
    fn test_qubit_table_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expr_vs_qubits.csv");
        let table = MetricsTable::Qubits(
            (1..=3)
                .map(|n| ExprQubitRecord {
                    n_qubits: n,
                    expr: 1.0 / n as f64,
                    expr_err: 0.0,
                })
                .collect(),
        );
        write_csv_report(&table, &path).unwrap();

        let mut reader = ::csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(1), Some("n_qubits"));
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].get(1), Some("3"));
    }
}
