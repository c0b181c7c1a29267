//! `hawk init` — bootstrap the config directory.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use hawk_config::ConfigLayer;

pub fn init(config_root: &Path, force: bool) -> Result<ExitCode> {
    let config_file = hawk_config::paths::global_config_file(config_root);
    if config_file.exists() && !force {
        println!(
            "{} already exists (use --force to overwrite)",
            config_file.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let registry = hawk_config::paths::registry_dir(config_root);
    for component_type in hawk_core::types::ALL_TYPES {
        let dir = registry.join(component_type.subdir());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    std::fs::write(&config_file, ConfigLayer::default_template())
        .with_context(|| format!("failed to write {}", config_file.display()))?;
    println!("initialized {}", config_root.display());
    Ok(ExitCode::SUCCESS)
}
