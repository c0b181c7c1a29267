//! `hawk add` / `remove` / `list`.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use hawk_core::{ComponentType, short_hash};
use hawk_registry::Registry;

use crate::cli::Format;

fn registry(config_root: &Path) -> Registry {
    Registry::new(hawk_config::paths::registry_dir(config_root))
}

/// Default component name for a source path, per type convention.
fn derive_name(component_type: ComponentType, path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("cannot derive a name from {}", path.display()))?;
    match component_type {
        // Hooks and skills keep the file name verbatim.
        ComponentType::Skill | ComponentType::Hook => Ok(file_name),
        ComponentType::Prompt | ComponentType::Agent | ComponentType::Mcp => Ok(path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(file_name)),
    }
}

pub fn add(
    config_root: &Path,
    component_type: &str,
    path: &Path,
    name: Option<&str>,
    replace: bool,
) -> Result<ExitCode> {
    let component_type: ComponentType = component_type.parse()?;
    let name = match name {
        Some(name) => name.to_string(),
        None => derive_name(component_type, path)?,
    };

    let registry = registry(config_root);
    let installed = registry.add(component_type, &name, path, replace)?;
    let hash = registry.get_hash(component_type, &name)?;
    println!(
        "added {component_type} '{name}' ({}) -> {}",
        short_hash(&hash),
        installed.display()
    );
    println!("run `hawk sync` to project it into your tools");
    Ok(ExitCode::SUCCESS)
}

pub fn remove(config_root: &Path, component_type: &str, name: &str) -> Result<ExitCode> {
    let component_type: ComponentType = component_type.parse()?;
    let registry = registry(config_root);
    if registry.remove(component_type, name)? {
        println!("removed {component_type} '{name}'");
        println!("run `hawk sync` to clean up tool projections");
    } else {
        println!("{component_type} '{name}' was not in the registry");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn list(
    config_root: &Path,
    component_type: Option<&str>,
    format: Format,
) -> Result<ExitCode> {
    let registry = registry(config_root);
    let types: Vec<ComponentType> = match component_type {
        Some(raw) => vec![raw.parse()?],
        None => hawk_core::types::ALL_TYPES.to_vec(),
    };

    match format {
        Format::Json => {
            let mut out = serde_json::Map::new();
            for component_type in types {
                let names = registry.list(component_type)?;
                out.insert(
                    component_type.subdir().to_string(),
                    serde_json::json!(names),
                );
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Text => {
            for component_type in types {
                let names = registry.list(component_type)?;
                if names.is_empty() {
                    continue;
                }
                println!("{}:", component_type.subdir());
                for name in names {
                    let hash = registry.get_hash(component_type, &name)?;
                    println!("  {name}  {}", short_hash(&hash));
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_name_conventions() {
        let derive = |t, p: &str| derive_name(t, Path::new(p)).unwrap();
        assert_eq!(derive(ComponentType::Hook, "/src/notify.py"), "notify.py");
        assert_eq!(derive(ComponentType::Skill, "/src/deploy"), "deploy");
        assert_eq!(derive(ComponentType::Prompt, "/src/review.md"), "review");
        assert_eq!(derive(ComponentType::Agent, "/src/researcher.md"), "researcher");
        assert_eq!(derive(ComponentType::Mcp, "/src/dodo.yaml"), "dodo");
    }
}
