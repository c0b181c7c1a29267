//! `hawk sync`.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use hawk_sync::{SyncEngine, SyncOptions, TargetStatus};

use crate::cli::Format;

pub fn sync(
    config_root: &Path,
    tool: Option<&str>,
    force: bool,
    dry_run: bool,
    global: bool,
    format: Format,
) -> Result<ExitCode> {
    let engine = SyncEngine::new(config_root)?;
    let options = SyncOptions { force, dry_run };

    let statuses = if global {
        engine.sync_global(tool, options)?
    } else {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        engine.sync(&cwd, tool, options)?
    };

    let failed = report(&statuses, format)?;
    if failed {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Print per-tool outcomes; returns whether any target failed.
pub fn report(statuses: &BTreeMap<String, TargetStatus>, format: Format) -> Result<bool> {
    let mut failed = false;

    match format {
        Format::Json => {
            let mut out = serde_json::Map::new();
            for (tool, status) in statuses {
                let value = match status {
                    TargetStatus::Disabled => serde_json::json!({"status": "disabled"}),
                    TargetStatus::UpToDate => serde_json::json!({"status": "up-to-date"}),
                    TargetStatus::WouldSync => serde_json::json!({"status": "would-sync"}),
                    TargetStatus::Synced(result) => {
                        failed |= !result.is_success();
                        serde_json::json!({
                            "status": if result.is_success() { "synced" } else { "failed" },
                            "linked": result.linked.len(),
                            "unlinked": result.unlinked.len(),
                            "skipped": result.skipped.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                            "errors": result.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                        })
                    }
                };
                out.insert(tool.clone(), value);
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Text => {
            for (tool, status) in statuses {
                match status {
                    TargetStatus::Disabled => println!("{tool}: disabled"),
                    TargetStatus::UpToDate => println!("{tool}: up to date"),
                    TargetStatus::WouldSync => println!("{tool}: would sync"),
                    TargetStatus::Synced(result) => {
                        failed |= !result.is_success();
                        println!(
                            "{tool}: {} linked, {} removed, {} skipped, {} errors",
                            result.linked.len(),
                            result.unlinked.len(),
                            result.skipped.len(),
                            result.errors.len()
                        );
                        for skip in &result.skipped {
                            println!("  skipped: {skip}");
                        }
                        for error in &result.errors {
                            println!("  error: {error}");
                        }
                    }
                }
            }
        }
    }

    Ok(failed)
}
