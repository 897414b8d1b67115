use clap::Parser;
use grafana_exporter::config::ExportConfig;
use grafana_exporter::logging;
use grafana_exporter::pipeline::{ExportPipeline, RunSummary};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

#[derive(Parser)]
#[command(name = "grafana_exporter")]
#[command(about = "Exports Grafana dashboards, folders and data sources to JSON")]
#[command(version = "0.1.0")]
struct Cli {
    /// Grafana base URL (falls back to GRAFANA_URL)
    #[arg(long)]
    url: Option<String>,

    /// API key with viewer access (falls back to GRAFANA_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Directory under which each run creates its export folder
    #[arg(long, default_value = "./grafana-exports")]
    output: PathBuf,

    /// Total per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Connection establishment timeout in seconds
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,

    /// Export only dashboards in this folder (by title)
    #[arg(long)]
    folder: Option<String>,

    /// Export only dashboards carrying this tag
    #[arg(long)]
    tag: Option<String>,

    /// Include dashboard permissions in each export record
    #[arg(long)]
    include_permissions: bool,

    /// Skip the data source configuration export
    #[arg(long)]
    no_datasources: bool,

    /// Skip the alert rule export
    #[arg(long)]
    no_alerts: bool,

    /// Maximum concurrent dashboard exports
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Enable debug-level output
    #[arg(long, short)]
    verbose: bool,
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Export Results:");
    println!("   Folders: {}", summary.folder_count);
    println!("   Dashboards found: {}", summary.total);
    println!("   Exported: {}", summary.exported);
    println!("   Failed: {}", summary.failed());
    if let Some(report) = &summary.report_path {
        println!("   Report: {}", report.display());
    }

    if !summary.errors.is_empty() {
        println!("\n⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("   - {}", error);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    logging::init_logging(cli.verbose);

    let config = ExportConfig {
        base_url: cli
            .url
            .or_else(|| std::env::var("GRAFANA_URL").ok())
            .unwrap_or_else(|| "http://localhost:3000".to_string()),
        api_key: cli
            .api_key
            .or_else(|| std::env::var("GRAFANA_API_KEY").ok())
            .unwrap_or_default(),
        output_root: cli.output,
        folder_filter: cli.folder,
        tag_filter: cli.tag,
        include_permissions: cli.include_permissions,
        include_datasources: !cli.no_datasources,
        include_alerts: !cli.no_alerts,
        timeout_secs: cli.timeout,
        connect_timeout_secs: cli.connect_timeout,
        concurrency: cli.concurrency,
    };

    // Ctrl-C stops dispatching new exports; in-flight ones finish first
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing in-flight exports");
            signal_cancel.cancel();
        }
    });

    let pipeline = ExportPipeline::new(config)?;

    match pipeline.run(cancel).await {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            error!("Export run failed: {}", e);
            eprintln!("❌ Export failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}
