//! JSON Output

use crate::ReportError;
use crate::report::KFoldSummary;
use std::path::Path;

/// Generate a prettified JSON k-fold summary.
pub fn generate_json_summary(summary: &KFoldSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

/// Write the k-fold summary to `path`.
pub fn write_json_summary(summary: &KFoldSummary, path: &Path) -> Result<(), ReportError> {
    let json = generate_json_summary(summary)?;
    std::fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote k-fold summary");
    Ok(())
}
