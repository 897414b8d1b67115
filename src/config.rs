use crate::error::{ExportError, Result};
use std::path::PathBuf;

/// Runtime configuration for one export run, assembled from CLI flags and
/// environment variables before the pipeline starts.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Grafana base URL, e.g. `http://localhost:3000`
    pub base_url: String,
    /// API key or service account token with viewer access
    pub api_key: String,
    /// Directory under which each run creates its timestamped export root
    pub output_root: PathBuf,
    /// Restrict the export to dashboards in this folder (by title)
    pub folder_filter: Option<String>,
    /// Restrict the export to dashboards carrying this tag
    pub tag_filter: Option<String>,
    pub include_permissions: bool,
    pub include_datasources: bool,
    pub include_alerts: bool,
    /// Total per-request timeout in seconds
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
    /// Maximum dashboards exported concurrently
    pub concurrency: usize,
}

impl ExportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ExportError::Config(
                "missing API key: pass --api-key or set GRAFANA_API_KEY".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(ExportError::Config(
                "missing Grafana URL: pass --url or set GRAFANA_URL".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed, ready for endpoint joining
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }
}
