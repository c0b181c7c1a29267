//! `hawk project` — registered directory management.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};

use hawk_config::ProjectsIndex;

use crate::cli::Format;

fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) if dir.is_absolute() => Ok(dir),
        Some(dir) => Ok(std::env::current_dir()
            .context("cannot determine current directory")?
            .join(dir)),
        None => std::env::current_dir().context("cannot determine current directory"),
    }
}

pub fn register(config_root: &Path, dir: Option<PathBuf>) -> Result<ExitCode> {
    let dir = resolve_dir(dir)?;
    let index_path = hawk_config::paths::projects_file(config_root);
    let mut index = ProjectsIndex::load(&index_path)?;

    if index.register(&dir) {
        index.save(&index_path)?;
        // Seed the scope file so the directory carries a layer even
        // before any component is enabled.
        let scope_config = hawk_config::paths::scope_config_file(&dir);
        if !scope_config.exists() {
            hawk_config::ConfigLayer::default().save(&scope_config)?;
        }
        println!("registered {}", dir.display());
    } else {
        println!("{} is already registered", dir.display());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn unregister(config_root: &Path, dir: Option<PathBuf>) -> Result<ExitCode> {
    let dir = resolve_dir(dir)?;
    let index_path = hawk_config::paths::projects_file(config_root);
    let mut index = ProjectsIndex::load(&index_path)?;

    if index.unregister(&dir) {
        index.save(&index_path)?;
        println!("unregistered {}", dir.display());
    } else {
        println!("{} was not registered", dir.display());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn list(config_root: &Path, format: Format) -> Result<ExitCode> {
    let index = ProjectsIndex::load(&hawk_config::paths::projects_file(config_root))?;
    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&index.projects)?);
        }
        Format::Text => {
            if index.projects.is_empty() {
                println!("no directories registered");
            }
            for dir in &index.projects {
                let marker = if hawk_config::paths::scope_config_file(dir).exists() {
                    ""
                } else {
                    "  (missing .hawk/config.yaml)"
                };
                println!("{}{marker}", dir.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
