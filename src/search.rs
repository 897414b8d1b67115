use crate::error::{ExportError, Result};
use crate::folders::FolderSet;
use crate::types::{DashboardSummary, GrafanaApi, SearchQuery};
use tracing::{info, instrument};

/// Caller-facing enumeration filters, before folder titles are resolved to ids.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub folder_title: Option<String>,
    pub tag: Option<String>,
}

/// Build the search query, resolving a folder-title filter against the
/// resolved folder set. An unknown folder title aborts the run.
pub fn build_query(filter: &DashboardFilter, folders: &FolderSet) -> Result<SearchQuery> {
    let folder_id = match &filter.folder_title {
        Some(title) => match folders.lookup(title) {
            Some(folder) => Some(folder.id),
            None => {
                return Err(ExportError::Config(format!("folder not found: {title}")));
            }
        },
        None => None,
    };

    Ok(SearchQuery {
        folder_id,
        tag: filter.tag.clone(),
    })
}

/// Enumerate dashboards matching the filters, in the order the API returns them.
#[instrument(skip(api, folders))]
pub async fn enumerate_dashboards(
    api: &dyn GrafanaApi,
    folders: &FolderSet,
    filter: &DashboardFilter,
) -> Result<Vec<DashboardSummary>> {
    let query = build_query(filter, folders)?;
    let dashboards = api.search_dashboards(&query).await?;
    info!("Found {} dashboards", dashboards.len());
    Ok(dashboards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Folder;

    fn folders() -> FolderSet {
        FolderSet::with_listed(vec![
            Folder {
                id: 5,
                uid: "prod01".to_string(),
                title: "Production".to_string(),
            },
            Folder {
                id: 9,
                uid: "stg01".to_string(),
                title: "Staging".to_string(),
            },
        ])
    }

    #[test]
    fn no_filters_build_an_unbounded_query() {
        let query = build_query(&DashboardFilter::default(), &folders()).unwrap();
        assert_eq!(query.folder_id, None);
        assert_eq!(query.tag, None);
    }

    #[test]
    fn folder_title_resolves_to_its_id() {
        let filter = DashboardFilter {
            folder_title: Some("Staging".to_string()),
            tag: None,
        };
        let query = build_query(&filter, &folders()).unwrap();
        assert_eq!(query.folder_id, Some(9));
    }

    #[test]
    fn general_resolves_to_the_synthetic_root() {
        let filter = DashboardFilter {
            folder_title: Some("General".to_string()),
            tag: None,
        };
        let query = build_query(&filter, &folders()).unwrap();
        assert_eq!(query.folder_id, Some(0));
    }

    #[test]
    fn unknown_folder_title_is_a_config_error() {
        let filter = DashboardFilter {
            folder_title: Some("Marketing".to_string()),
            tag: None,
        };
        let err = build_query(&filter, &folders()).unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
        assert!(err.to_string().contains("Marketing"));
    }

    #[test]
    fn tag_passes_through_unchanged() {
        let filter = DashboardFilter {
            folder_title: None,
            tag: Some("ops".to_string()),
        };
        let query = build_query(&filter, &folders()).unwrap();
        assert_eq!(query.tag.as_deref(), Some("ops"));
    }
}
