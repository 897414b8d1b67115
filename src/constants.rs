/// Endpoint paths and well-known file names used across the export pipeline.
/// All endpoint constants are relative to the Grafana base URL.

// Grafana HTTP API endpoints
pub const USER_ENDPOINT: &str = "/api/user";
pub const FOLDERS_ENDPOINT: &str = "/api/folders";
pub const SEARCH_ENDPOINT: &str = "/api/search";
pub const DASHBOARD_UID_ENDPOINT: &str = "/api/dashboards/uid";
pub const DATASOURCES_ENDPOINT: &str = "/api/datasources";
pub const ALERTS_ENDPOINT: &str = "/api/alerts";

// File names written at the export root
pub const FOLDERS_FILE: &str = "folders.json";
pub const DATASOURCES_FILE: &str = "datasources.json";
pub const ALERTS_FILE: &str = "alerts.json";
pub const REPORT_FILE: &str = "export_report.md";

/// Title of the synthetic root folder for dashboards that live outside any folder.
pub const GENERAL_FOLDER_TITLE: &str = "General";

pub const USER_AGENT: &str = concat!("grafana-dashboard-exporter/", env!("CARGO_PKG_VERSION"));

/// Top-level files that hold instance configuration rather than per-folder
/// dashboard exports. The report lists these separately.
pub fn is_config_file(name: &str) -> bool {
    matches!(name, FOLDERS_FILE | DATASOURCES_FILE | ALERTS_FILE)
}
