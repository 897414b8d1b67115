use crate::constants::{is_config_file, REPORT_FILE};
use crate::error::Result;
use crate::sanitize::safe_name;
use crate::types::Folder;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// File inventory of one export root, used only to render listings.
/// Counts in the summary table come from the pipeline, never from here.
struct TreeInventory {
    /// Folder directory name -> sorted dashboard file names
    folder_dirs: Vec<(String, Vec<String>)>,
    /// Sorted top-level configuration file names
    config_files: Vec<String>,
}

fn scan_export_tree(export_dir: &Path) -> Result<TreeInventory> {
    let mut folder_dirs = Vec::new();
    let mut config_files = Vec::new();

    for entry in fs::read_dir(export_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            let mut files: Vec<String> = fs::read_dir(entry.path())?
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n.ends_with(".json"))
                .collect();
            files.sort();
            folder_dirs.push((name, files));
        } else if is_config_file(&name) {
            config_files.push(name);
        }
    }

    folder_dirs.sort_by(|a, b| a.0.cmp(&b.0));
    config_files.sort();
    Ok(TreeInventory {
        folder_dirs,
        config_files,
    })
}

/// Render and write the run report. `total` and `exported` are the
/// pipeline's own tallies; `folders` is the resolved folder set.
#[instrument(skip(export_dir, base_url, folders))]
pub fn generate_report(
    export_dir: &Path,
    base_url: &str,
    folders: &[Folder],
    total: usize,
    exported: usize,
) -> Result<PathBuf> {
    let inventory = scan_export_tree(export_dir)?;
    let failed = total - exported;
    let success_rate = exported as f64 / total as f64 * 100.0;

    let mut out = String::new();
    out.push_str("# Grafana Export Report\n\n");
    out.push_str(&format!(
        "**Export time**: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("**Grafana URL**: {base_url}\n\n"));
    out.push_str(&format!("**Export directory**: `{}`\n\n", export_dir.display()));

    out.push_str("## Summary\n\n");
    out.push_str("| Item | Count |\n");
    out.push_str("|------|-------|\n");
    out.push_str(&format!("| Folders | {} |\n", folders.len()));
    out.push_str(&format!("| Dashboards found | {total} |\n"));
    out.push_str(&format!("| Exported | {exported} |\n"));
    out.push_str(&format!("| Failed | {failed} |\n"));
    out.push_str(&format!("| Success rate | {success_rate:.1}% |\n\n"));

    out.push_str("## Folder Structure\n\n");
    for folder in folders {
        let dir_name = safe_name(&folder.title);
        if let Some((_, files)) = inventory.folder_dirs.iter().find(|(n, _)| *n == dir_name) {
            out.push_str(&format!("- **{}** ({} dashboards)\n", folder.title, files.len()));
        }
    }
    out.push('\n');

    out.push_str("## Exported Files\n\n");
    for (dir_name, files) in &inventory.folder_dirs {
        out.push_str(&format!("### {dir_name}\n\n"));
        for file in files {
            out.push_str(&format!("- `{file}`\n"));
        }
        out.push('\n');
    }

    if !inventory.config_files.is_empty() {
        out.push_str("### Other configuration files\n\n");
        for file in &inventory.config_files {
            out.push_str(&format!("- `{file}`\n"));
        }
    }

    let report_path = export_dir.join(REPORT_FILE);
    fs::write(&report_path, out)?;
    info!("Report written to {}", report_path.display());
    Ok(report_path)
}
