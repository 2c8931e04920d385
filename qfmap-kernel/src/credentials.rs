//! IBMQ account settings read from a private JSON file:
//!
//! ```json
//! { "IBMQ": { "token": "...", "hub": "...", "group": "...", "project": "..." } }
//! ```

use crate::ModelError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Account used for device runs
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct IbmqCredentials {
    /// API token
    pub token: String,
    /// Provider hub
    #[serde(default)]
    pub hub: Option<String>,
    /// Provider group
    #[serde(default)]
    pub group: Option<String>,
    /// Provider project
    #[serde(default)]
    pub project: Option<String>,
}

// Keeps the token out of logs
impl fmt::Debug for IbmqCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmqCredentials")
            .field("token", &"<redacted>")
            .field("hub", &self.hub)
            .field("group", &self.group)
            .field("project", &self.project)
            .finish()
    }
}

impl IbmqCredentials {
    /// `hub/group/project`, with `-` for missing parts
    pub fn provider(&self) -> String {
        let part = |p: &Option<String>| p.clone().unwrap_or_else(|| "-".to_string());
        format!(
            "{}/{}/{}",
            part(&self.hub),
            part(&self.group),
            part(&self.project)
        )
    }
}

#[derive(Deserialize)]
struct PrivateConfig {
    #[serde(rename = "IBMQ")]
    ibmq: IbmqCredentials,
}

/// Parse the `IBMQ` section of a JSON string.
pub fn parse_credentials(content: &str) -> Result<IbmqCredentials, serde_json::Error> {
    serde_json::from_str::<PrivateConfig>(content).map(|c| c.ibmq)
}

/// Read the `IBMQ` section of a private configuration file.
pub fn load_credentials(path: &Path) -> Result<IbmqCredentials, ModelError> {
    let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let credentials = parse_credentials(&content).map_err(|source| ModelError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(provider = %credentials.provider(), "loaded IBMQ credentials");
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_section() {
        let creds = parse_credentials(
            r#"{"IBMQ": {"token": "abc", "hub": "ibm-q-cern", "group": "internal", "project": "qml"}}"#,
        )
        .unwrap();
        assert_eq!(creds.token, "abc");
        assert_eq!(creds.provider(), "ibm-q-cern/internal/qml");
    }

    #[test]
    fn test_missing_section_is_an_error() {
        assert!(parse_credentials(r#"{"token": "abc"}"#).is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let creds = parse_credentials(r#"{"IBMQ": {"token": "secret-token"}}"#).unwrap();
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("secret-token"));
        assert_eq!(creds.provider(), "-/-/-");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private.json");
        std::fs::write(&path, r#"{"IBMQ": {"token": "t", "hub": "h"}}"#).unwrap();
        let creds = load_credentials(&path).unwrap();
        assert_eq!(creds.hub.as_deref(), Some("h"));

        let missing = dir.path().join("none.json");
        assert!(matches!(
            load_credentials(&missing),
            Err(ModelError::Io { .. })
        ));
    }
}
