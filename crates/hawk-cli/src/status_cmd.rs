//! `hawk status` — one-screen overview.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use hawk_config::ProjectsIndex;
use hawk_registry::{PackageIndex, Registry};

use crate::cli::Format;

pub fn status(config_root: &Path, format: Format) -> Result<ExitCode> {
    let registry = Registry::new(hawk_config::paths::registry_dir(config_root));
    let packages = PackageIndex::load(&hawk_config::paths::packages_file(config_root))?;
    let projects = ProjectsIndex::load(&hawk_config::paths::projects_file(config_root))?;

    let mut counts = Vec::new();
    for component_type in hawk_core::types::ALL_TYPES {
        counts.push((component_type, registry.list(component_type)?.len()));
    }

    match format {
        Format::Json => {
            let mut components = serde_json::Map::new();
            for (component_type, count) in &counts {
                components.insert(component_type.subdir().to_string(), serde_json::json!(count));
            }
            let out = serde_json::json!({
                "config_root": config_root.display().to_string(),
                "components": components,
                "packages": packages.names(),
                "projects": projects.projects,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Text => {
            println!("config root: {}", config_root.display());
            println!("components:");
            for (component_type, count) in &counts {
                println!("  {}: {count}", component_type.subdir());
            }
            println!("packages: {}", packages.names().join(", "));
            println!("registered directories: {}", projects.projects.len());
            for dir in &projects.projects {
                println!("  {}", dir.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
