use crate::error::Result;
use crate::types::{Folder, GrafanaApi};
use tracing::{info, instrument};

/// Resolved folder hierarchy for one run, including the synthetic General root.
#[derive(Debug, Clone)]
pub struct FolderSet {
    folders: Vec<Folder>,
}

impl FolderSet {
    /// Fetch the folder listing and prepend the synthetic root.
    #[instrument(skip(api))]
    pub async fn resolve(api: &dyn GrafanaApi) -> Result<Self> {
        let listed = api.list_folders().await?;
        let set = Self::with_listed(listed);
        info!("Resolved {} folders including the General root", set.all().len());
        Ok(set)
    }

    /// Build the set from an already-fetched listing.
    pub fn with_listed(listed: Vec<Folder>) -> Self {
        let mut folders = vec![Folder::general_root()];
        // The root is synthesized locally; an id 0 entry coming from the
        // API would duplicate it.
        folders.extend(listed.into_iter().filter(|f| f.id != 0));
        Self { folders }
    }

    /// First folder whose title matches, in listing order. An empty title
    /// never matches anything.
    pub fn lookup(&self, title: &str) -> Option<&Folder> {
        if title.is_empty() {
            return None;
        }
        self.folders.iter().find(|f| f.title == title)
    }

    pub fn all(&self) -> &[Folder] {
        &self.folders
    }
}
