use crate::client::ApiClient;
use crate::config::ExportConfig;
use crate::constants::FOLDERS_FILE;
use crate::error::Result;
use crate::export::{self, DashboardExporter};
use crate::folders::FolderSet;
use crate::report;
use crate::search::{self, DashboardFilter};
use crate::types::{DashboardSummary, GrafanaApi};
use chrono::Utc;
use metrics::{counter, histogram};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Result of a complete export run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub export_dir: PathBuf,
    pub folder_count: usize,
    pub total: usize,
    pub exported: usize,
    pub errors: Vec<String>,
    pub report_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.total - self.exported
    }
}

pub struct ExportPipeline {
    api: Arc<dyn GrafanaApi>,
    config: ExportConfig,
}

impl ExportPipeline {
    /// Build a pipeline backed by the live HTTP client.
    pub fn new(config: ExportConfig) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);
        Ok(Self { api, config })
    }

    /// Build a pipeline over any API implementation. Tests substitute a stub.
    pub fn with_api(api: Arc<dyn GrafanaApi>, config: ExportConfig) -> Self {
        Self { api, config }
    }

    /// Run the complete export. Connectivity, folder resolution and
    /// enumeration failures abort the run; per-dashboard failures are
    /// tallied and reported.
    #[instrument(skip(self, cancel))]
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunSummary> {
        self.config.validate()?;

        info!("🚀 Starting export from {}", self.config.base_url);
        println!("🚀 Starting export from {}", self.config.base_url);
        counter!("grafana_export_runs_total").increment(1);
        let t_run = std::time::Instant::now();

        // Step 1: Create the run's export directory
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let export_dir = self.config.output_root.join(format!("export_{timestamp}"));
        fs::create_dir_all(&export_dir)?;
        info!("📁 Export directory: {}", export_dir.display());
        println!("📁 Export directory: {}", export_dir.display());

        // Step 2: Verify connectivity before touching anything else
        self.verify_connectivity().await?;

        // Step 3: Resolve folders and persist the listing
        let folders = FolderSet::resolve(self.api.as_ref()).await?;
        export::write_json_file(&export_dir.join(FOLDERS_FILE), folders.all())?;
        println!("📂 Found {} folders (including General)", folders.all().len());

        // Step 4: Instance configuration, best effort
        if self.config.include_datasources {
            match export::export_datasources(self.api.as_ref(), &export_dir).await {
                Ok(count) => println!("✅ Exported {count} data sources"),
                Err(e) => warn!("Data source export failed: {}", e),
            }
        }
        if self.config.include_alerts {
            match export::export_alerts(self.api.as_ref(), &export_dir).await {
                Ok(count) => println!("✅ Exported {count} alert rules"),
                Err(e) => warn!("Alert export failed: {}", e),
            }
        }

        // Step 5: Enumerate dashboards
        let filter = DashboardFilter {
            folder_title: self.config.folder_filter.clone(),
            tag: self.config.tag_filter.clone(),
        };
        let t_search = std::time::Instant::now();
        let dashboards =
            search::enumerate_dashboards(self.api.as_ref(), &folders, &filter).await?;
        histogram!("grafana_search_duration_seconds").record(t_search.elapsed().as_secs_f64());
        let total = dashboards.len();
        println!("🔍 Found {total} dashboards");

        if total == 0 {
            info!("No dashboards matched the filters; nothing to export");
            println!("No dashboards matched the filters; nothing to export.");
            return Ok(RunSummary {
                export_dir,
                folder_count: folders.all().len(),
                total: 0,
                exported: 0,
                errors: Vec::new(),
                report_path: None,
            });
        }

        // Step 6: Export each dashboard on a bounded worker pool
        let t_export = std::time::Instant::now();
        let (exported, errors) = self.export_all(dashboards, &export_dir, &cancel).await;
        histogram!("grafana_export_phase_duration_seconds").record(t_export.elapsed().as_secs_f64());
        counter!("grafana_dashboards_exported_total").increment(exported as u64);
        counter!("grafana_dashboards_failed_total").increment((total - exported) as u64);
        info!("✅ Exported {}/{} dashboards", exported, total);
        println!("✅ Exported {}/{} dashboards", exported, total);

        // Step 7: Write the run report over whatever completed
        let report_path = report::generate_report(
            &export_dir,
            &self.config.base_url,
            folders.all(),
            total,
            exported,
        )?;
        println!("📄 Report written to {}", report_path.display());

        histogram!("grafana_export_duration_seconds").record(t_run.elapsed().as_secs_f64());

        Ok(RunSummary {
            export_dir,
            folder_count: folders.all().len(),
            total,
            exported,
            errors,
            report_path: Some(report_path),
        })
    }

    /// Probe the API with a current-user lookup before exporting anything.
    async fn verify_connectivity(&self) -> Result<()> {
        info!("📡 Verifying connectivity...");
        let user = self.api.current_user().await?;
        let login = user["login"].as_str().unwrap_or("unknown").to_string();
        let role = user["role"].as_str().unwrap_or("unknown").to_string();
        let org_id = user["orgId"]
            .as_i64()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!(login = %login, org_id = %org_id, role = %role, "Connected to Grafana");
        println!("✓ Connected as {login} (org {org_id}, role {role})");
        Ok(())
    }

    /// Fan the dashboards out to at most `concurrency` concurrent exports.
    /// Cancellation stops dispatch; in-flight exports run to completion and
    /// undispatched dashboards count as failed.
    async fn export_all(
        &self,
        dashboards: Vec<DashboardSummary>,
        export_dir: &Path,
        cancel: &CancellationToken,
    ) -> (usize, Vec<String>) {
        let total = dashboards.len();
        let exporter = Arc::new(DashboardExporter::new(
            self.api.clone(),
            export_dir.to_path_buf(),
            self.config.include_permissions,
        ));
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut join_set = JoinSet::new();

        for (index, summary) in dashboards.into_iter().enumerate() {
            let permit = if cancel.is_cancelled() {
                None
            } else {
                tokio::select! {
                    _ = cancel.cancelled() => None,
                    permit = semaphore.clone().acquire_owned() => permit.ok(),
                }
            };
            let Some(permit) = permit else {
                warn!(
                    "Cancellation requested; {} dashboards not dispatched",
                    total - index
                );
                println!("⚠️  Cancelled; {} dashboards not dispatched", total - index);
                break;
            };

            let exporter = exporter.clone();
            join_set.spawn(async move {
                let _permit = permit;
                let result = exporter.export_one(&summary).await;
                (summary, result)
            });
        }

        let mut exported = 0usize;
        let mut completed = 0usize;
        let mut errors = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((summary, Ok(path))) => {
                    exported += 1;
                    completed += 1;
                    println!(
                        "[{}/{}] ✓ {} -> {}",
                        completed,
                        total,
                        summary.title,
                        path.display()
                    );
                }
                Ok((summary, Err(e))) => {
                    completed += 1;
                    error!("Export failed for {}: {}", summary.uid, e);
                    println!("[{}/{}] ✗ {}: {}", completed, total, summary.title, e);
                    errors.push(format!("{} ({}): {}", summary.title, summary.uid, e));
                }
                Err(join_err) => {
                    completed += 1;
                    error!("Export worker panicked: {}", join_err);
                    errors.push(format!("export worker failure: {join_err}"));
                }
            }
        }

        (exported, errors)
    }
}
