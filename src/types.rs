use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque JSON payload passed through verbatim from the Grafana API
pub type JsonPayload = serde_json::Value;

fn general_title() -> String {
    crate::constants::GENERAL_FOLDER_TITLE.to_string()
}

/// A dashboard folder as listed by the API. The General root never appears
/// in the remote listing; it is synthesized locally with id 0 and an empty uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub uid: String,
    pub title: String,
}

impl Folder {
    pub fn general_root() -> Self {
        Self {
            id: 0,
            uid: String::new(),
            title: general_title(),
        }
    }
}

/// Lightweight search record driving the per-dashboard export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub uid: String,
    pub title: String,
    /// Absent in search results for dashboards outside any folder
    #[serde(rename = "folderTitle", default = "general_title")]
    pub folder_title: String,
}

/// One exported dashboard as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardExport {
    pub dashboard: JsonPayload,
    pub meta: JsonPayload,
    #[serde(rename = "folderTitle")]
    pub folder_title: String,
    #[serde(rename = "exportTime")]
    pub export_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<JsonPayload>,
}

/// Filters accepted by the dashboard search endpoint
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub folder_id: Option<i64>,
    pub tag: Option<String>,
}

/// Read-only surface of the Grafana HTTP API consumed by the pipeline.
/// The live client implements this over HTTP; tests substitute a stub.
#[async_trait::async_trait]
pub trait GrafanaApi: Send + Sync {
    /// Current authenticated user, used as the connectivity probe
    async fn current_user(&self) -> Result<JsonPayload>;

    /// All folders visible to the token, without the synthetic root
    async fn list_folders(&self) -> Result<Vec<Folder>>;

    /// Dashboards matching the query, in API order
    async fn search_dashboards(&self, query: &SearchQuery) -> Result<Vec<DashboardSummary>>;

    /// Full dashboard document for one uid
    async fn dashboard_by_uid(&self, uid: &str) -> Result<JsonPayload>;

    /// Permission list for one dashboard uid
    async fn dashboard_permissions(&self, uid: &str) -> Result<JsonPayload>;

    /// Configured data sources, passed through verbatim
    async fn list_datasources(&self) -> Result<JsonPayload>;

    /// Legacy alert rules, passed through verbatim
    async fn list_alerts(&self) -> Result<JsonPayload>;
}
