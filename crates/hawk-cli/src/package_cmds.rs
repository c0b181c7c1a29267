//! `hawk download` / `scan` / `update` / `package`.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use hawk_core::short_hash;
use hawk_registry::{PackageIndex, Registry, UpdateOptions, UpdateReport};
use hawk_sync::{SyncEngine, SyncOptions};

use crate::cli::Format;

fn open(config_root: &Path) -> Result<(PackageIndex, Registry)> {
    let index = PackageIndex::load(&hawk_config::paths::packages_file(config_root))?;
    let registry = Registry::new(hawk_config::paths::registry_dir(config_root));
    Ok((index, registry))
}

/// Package mutations request a sync afterwards; sync failures are
/// reported but do not fail the package operation itself.
fn request_sync(config_root: &Path) {
    match SyncEngine::new(config_root).and_then(|engine| {
        engine.sync_global(None, SyncOptions::default())
    }) {
        Ok(statuses) => {
            for (tool, status) in &statuses {
                if status.is_failure() {
                    eprintln!("warning: sync failed for {tool}; run `hawk sync` for details");
                }
            }
        }
        Err(err) => eprintln!("warning: sync after package operation failed: {err:#}"),
    }
}

pub fn download(
    config_root: &Path,
    url: &str,
    name: Option<&str>,
    replace: bool,
) -> Result<ExitCode> {
    let (mut index, registry) = open(config_root)?;
    let options = UpdateOptions {
        replace,
        ..Default::default()
    };
    let report = hawk_registry::update::install_git(&mut index, &registry, url, name, &options)?;
    println!(
        "installed package '{}' with {} component(s)",
        report.package,
        report.items.len()
    );
    request_sync(config_root);
    Ok(ExitCode::SUCCESS)
}

pub fn scan(
    config_root: &Path,
    dir: &Path,
    name: Option<&str>,
    replace: bool,
) -> Result<ExitCode> {
    let (mut index, registry) = open(config_root)?;
    let options = UpdateOptions {
        replace,
        ..Default::default()
    };
    let report = hawk_registry::install_local(&mut index, &registry, dir, name, &options)?;
    println!(
        "installed package '{}' with {} component(s)",
        report.package,
        report.items.len()
    );
    request_sync(config_root);
    Ok(ExitCode::SUCCESS)
}

pub fn update(
    config_root: &Path,
    package: Option<&str>,
    prune: bool,
    force: bool,
) -> Result<ExitCode> {
    let (mut index, registry) = open(config_root)?;
    let options = UpdateOptions {
        prune,
        force,
        ..Default::default()
    };

    let names: Vec<String> = match package {
        Some(name) => vec![name.to_string()],
        None => index.names(),
    };
    if names.is_empty() {
        println!("no packages installed");
        return Ok(ExitCode::SUCCESS);
    }

    // Per-package failures don't abort the batch; any failure yields a
    // non-zero overall status.
    let mut any_failed = false;
    let mut any_changed = false;
    for name in &names {
        match hawk_registry::update_package(&mut index, &registry, name, &options) {
            Ok(report) => {
                any_changed |= report.changed();
                print_report(&report);
            }
            Err(err) => {
                any_failed = true;
                eprintln!("error: update of '{name}' failed: {err:#}");
            }
        }
    }

    if any_changed {
        request_sync(config_root);
    }
    if any_failed {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_report(report: &UpdateReport) {
    if let Some(reason) = &report.skipped {
        println!("{}: skipped ({reason})", report.package);
        return;
    }
    println!(
        "{}: {} unchanged, {} updated, {} added, {} pruned",
        report.package,
        report.unchanged.len(),
        report.updated.len(),
        report.added.len(),
        report.pruned.len()
    );
    for (component_type, name) in &report.prune_candidates {
        println!("  kept (absent upstream): {component_type} '{name}' — use --prune to remove");
    }
    if let Some(commit) = &report.commit {
        println!("  now at {}", short_hash(commit));
    }
}

pub fn list(config_root: &Path, format: Format) -> Result<ExitCode> {
    let (index, _) = open(config_root)?;
    match format {
        Format::Json => {
            let mut out = serde_json::Map::new();
            for name in index.names() {
                if let Some(entry) = index.get(&name) {
                    out.insert(
                        name.clone(),
                        serde_json::json!({
                            "source": entry.source_kind().as_str(),
                            "installed": entry.installed,
                            "items": entry.items.len(),
                        }),
                    );
                }
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Text => {
            let names = index.names();
            if names.is_empty() {
                println!("no packages installed");
            }
            for name in names {
                if let Some(entry) = index.get(&name) {
                    println!(
                        "{name}  {}  {} item(s)  installed {}",
                        entry.source_kind(),
                        entry.items.len(),
                        entry.installed
                    );
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn remove(config_root: &Path, name: &str, keep_items: bool) -> Result<ExitCode> {
    let (mut index, registry) = open(config_root)?;
    let items = index.remove(name)?;
    index.save()?;

    let mut removed = 0;
    if !keep_items {
        for item in &items {
            if registry.remove(item.component_type, &item.name)? {
                removed += 1;
            }
        }
    }
    println!(
        "removed package '{name}' ({} component(s) {})",
        items.len(),
        if keep_items {
            "kept in registry".to_string()
        } else {
            format!("removed, {removed} present")
        }
    );
    request_sync(config_root);
    Ok(ExitCode::SUCCESS)
}
