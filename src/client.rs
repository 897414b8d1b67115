use crate::config::ExportConfig;
use crate::constants::{
    ALERTS_ENDPOINT, DASHBOARD_UID_ENDPOINT, DATASOURCES_ENDPOINT, FOLDERS_ENDPOINT,
    SEARCH_ENDPOINT, USER_AGENT, USER_ENDPOINT,
};
use crate::error::{ExportError, Result};
use crate::types::{DashboardSummary, Folder, GrafanaApi, JsonPayload, SearchQuery};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Authenticated HTTP client for one Grafana instance.
///
/// Every call is a single attempt: timeouts and transport failures surface
/// immediately to the caller, which decides whether the run continues.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ExportConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| {
                ExportError::Config(
                    "API key contains characters not allowed in an HTTP header".to_string(),
                )
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
        })
    }

    /// Issue one API request and parse the response body as JSON.
    #[instrument(skip(self, body))]
    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<JsonPayload> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.http.request(method, &url);
        if let Some(body) = body {
            req = req.json(body);
        }
        self.dispatch(endpoint, req).await
    }

    async fn dispatch(&self, endpoint: &str, req: reqwest::RequestBuilder) -> Result<JsonPayload> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExportError::Protocol(format!(
                "{} returned HTTP {}",
                endpoint,
                status.as_u16()
            )));
        }

        let payload = resp.json::<Value>().await?;
        debug!("API call succeeded");
        Ok(payload)
    }

    async fn get(&self, endpoint: &str) -> Result<JsonPayload> {
        self.request(endpoint, Method::GET, None).await
    }

    /// GET with query parameters percent-encoded into the URL.
    #[instrument(skip(self, params))]
    async fn get_with_params(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<JsonPayload> {
        let url = format!("{}{}", self.base_url, endpoint);
        let req = self.http.get(&url).query(params);
        self.dispatch(endpoint, req).await
    }
}

#[async_trait::async_trait]
impl GrafanaApi for ApiClient {
    async fn current_user(&self) -> Result<JsonPayload> {
        self.get(USER_ENDPOINT).await
    }

    async fn list_folders(&self) -> Result<Vec<Folder>> {
        let payload = self.get(FOLDERS_ENDPOINT).await?;
        serde_json::from_value(payload)
            .map_err(|e| ExportError::Protocol(format!("unexpected folder listing shape: {e}")))
    }

    async fn search_dashboards(&self, query: &SearchQuery) -> Result<Vec<DashboardSummary>> {
        let payload = self
            .get_with_params(SEARCH_ENDPOINT, &search_params(query))
            .await?;
        serde_json::from_value(payload)
            .map_err(|e| ExportError::Protocol(format!("unexpected search result shape: {e}")))
    }

    async fn dashboard_by_uid(&self, uid: &str) -> Result<JsonPayload> {
        self.get(&format!("{DASHBOARD_UID_ENDPOINT}/{uid}")).await
    }

    async fn dashboard_permissions(&self, uid: &str) -> Result<JsonPayload> {
        self.get(&format!("{DASHBOARD_UID_ENDPOINT}/{uid}/permissions"))
            .await
    }

    async fn list_datasources(&self) -> Result<JsonPayload> {
        self.get(DATASOURCES_ENDPOINT).await
    }

    async fn list_alerts(&self) -> Result<JsonPayload> {
        self.get(ALERTS_ENDPOINT).await
    }
}

/// Query parameters selecting dashboard-type assets, with optional filters.
/// Values are kept raw here; the HTTP layer encodes them into the URL.
fn search_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("type", "dash-db".to_string())];
    if let Some(folder_id) = query.folder_id {
        params.push(("folderIds", folder_id.to_string()));
    }
    if let Some(tag) = &query.tag {
        params.push(("tag", tag.clone()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_with_key(api_key: &str) -> ExportConfig {
        ExportConfig {
            base_url: "http://localhost:3000".to_string(),
            api_key: api_key.to_string(),
            output_root: PathBuf::from("./grafana-exports"),
            folder_filter: None,
            tag_filter: None,
            include_permissions: false,
            include_datasources: true,
            include_alerts: true,
            timeout_secs: 5,
            connect_timeout_secs: 2,
            concurrency: 2,
        }
    }

    #[test]
    fn api_keys_with_control_characters_are_rejected() {
        let result = ApiClient::new(&config_with_key("line\nbreak"));
        assert!(matches!(result, Err(ExportError::Config(_))));
    }

    #[test]
    fn search_params_without_filters_request_dashboards_only() {
        let query = SearchQuery::default();
        assert_eq!(search_params(&query), vec![("type", "dash-db".to_string())]);
    }

    #[test]
    fn search_params_include_folder_and_tag() {
        let query = SearchQuery {
            folder_id: Some(7),
            tag: Some("prod".to_string()),
        };
        assert_eq!(
            search_params(&query),
            vec![
                ("type", "dash-db".to_string()),
                ("folderIds", "7".to_string()),
                ("tag", "prod".to_string()),
            ]
        );
    }

    #[test]
    fn search_params_folder_zero_targets_general() {
        let query = SearchQuery {
            folder_id: Some(0),
            tag: None,
        };
        assert_eq!(
            search_params(&query),
            vec![("type", "dash-db".to_string()), ("folderIds", "0".to_string())]
        );
    }

    #[test]
    fn search_urls_encode_reserved_characters_in_tags() {
        let query = SearchQuery {
            folder_id: Some(7),
            tag: Some("team=a&b".to_string()),
        };
        let request = reqwest::Client::new()
            .get("http://localhost:3000/api/search")
            .query(&search_params(&query))
            .build()
            .unwrap();
        assert_eq!(
            request.url().query(),
            Some("type=dash-db&folderIds=7&tag=team%3Da%26b")
        );
    }
}
