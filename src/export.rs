use crate::constants::{ALERTS_FILE, DATASOURCES_FILE};
use crate::error::{ExportError, Result};
use crate::sanitize::safe_name;
use crate::types::{DashboardExport, DashboardSummary, GrafanaApi};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Writes dashboards into per-folder directories under one run's export root.
pub struct DashboardExporter {
    api: Arc<dyn GrafanaApi>,
    export_dir: PathBuf,
    include_permissions: bool,
}

impl DashboardExporter {
    pub fn new(api: Arc<dyn GrafanaApi>, export_dir: PathBuf, include_permissions: bool) -> Self {
        Self {
            api,
            export_dir,
            include_permissions,
        }
    }

    /// Export a single dashboard. A failure here affects only this dashboard;
    /// the caller tallies it and moves on.
    #[instrument(skip(self, summary), fields(uid = %summary.uid, title = %summary.title))]
    pub async fn export_one(&self, summary: &DashboardSummary) -> Result<PathBuf> {
        let folder_dir = self.export_dir.join(safe_name(&summary.folder_title));
        fs::create_dir_all(&folder_dir)?;

        let detail = self.api.dashboard_by_uid(&summary.uid).await?;
        let dashboard = match detail.get("dashboard") {
            Some(d) if !d.is_null() => d.clone(),
            _ => {
                return Err(ExportError::DataShape(format!(
                    "dashboard {} has no nested dashboard payload",
                    summary.uid
                )));
            }
        };
        let meta = detail.get("meta").cloned().unwrap_or_else(|| json!({}));

        // Permission fetches are auxiliary: a failure drops the field, not the export
        let permissions = if self.include_permissions {
            match self.api.dashboard_permissions(&summary.uid).await {
                Ok(perms) => Some(perms),
                Err(e) => {
                    warn!("Could not fetch permissions for {}: {}", summary.uid, e);
                    None
                }
            }
        } else {
            None
        };

        let record = DashboardExport {
            dashboard,
            meta,
            folder_title: summary.folder_title.clone(),
            export_time: Utc::now(),
            permissions,
        };

        let file_name = format!("{}_{}.json", safe_name(&summary.title), summary.uid);
        let path = folder_dir.join(file_name);
        write_json_file(&path, &record)?;
        debug!("Exported dashboard to {}", path.display());
        Ok(path)
    }
}

/// Persist the configured data sources as one verbatim JSON document.
/// Returns how many entries the listing held.
#[instrument(skip(api, export_dir))]
pub async fn export_datasources(api: &dyn GrafanaApi, export_dir: &Path) -> Result<usize> {
    let datasources = api.list_datasources().await?;
    let count = datasources.as_array().map_or(0, |a| a.len());
    write_json_file(&export_dir.join(DATASOURCES_FILE), &datasources)?;
    Ok(count)
}

/// Persist legacy alert rules next to the data sources.
#[instrument(skip(api, export_dir))]
pub async fn export_alerts(api: &dyn GrafanaApi, export_dir: &Path) -> Result<usize> {
    let alerts = api.list_alerts().await?;
    let count = alerts.as_array().map_or(0, |a| a.len());
    write_json_file(&export_dir.join(ALERTS_FILE), &alerts)?;
    Ok(count)
}

/// Pretty-printed JSON write used for every file this tool produces.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json_content = serde_json::to_string_pretty(value)?;
    fs::write(path, json_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn write_json_file_round_trips_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        let value = json!({"name": "Prometheus", "type": "prometheus"});

        write_json_file(&path, &value).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains('\n'), "output should be pretty-printed");
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn write_json_file_accepts_slices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        let values = [json!({"id": 1}), json!({"id": 2})];

        write_json_file(&path, values.as_slice()).unwrap();

        let parsed: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }
}
