//! Source-tree scanning: discover components in a package checkout.
//!
//! Packages lay components out in conventional subdirectories mirroring
//! the registry:
//!
//! ```text
//! <root>/skills/<name>/      (or a plain file)
//! <root>/hooks/<name>.py
//! <root>/prompts/<name>.md
//! <root>/agents/<name>.md
//! <root>/mcp/<name>.yaml
//! ```
//!
//! Unknown layouts yield an empty scan rather than guesses.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use hawk_core::{ComponentType, validate_name};

/// A component discovered in a source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedItem {
    pub component_type: ComponentType,
    pub name: String,
    /// Absolute path of the payload inside the source tree.
    pub path: PathBuf,
}

/// Discover components under `root`, in processing order, each type
/// sorted by name. Entries with invalid names are skipped with a
/// warning.
pub fn scan_tree(root: &Path) -> Result<Vec<ScannedItem>> {
    let mut items = Vec::new();
    for component_type in hawk_core::types::ALL_TYPES {
        let dir = root.join(component_type.subdir());
        if !dir.is_dir() {
            continue;
        }
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("failed to read {}", dir.display()))?
        {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with('.') {
                continue;
            }
            let Some(name) = component_type.name_from_payload(&file_name) else {
                continue;
            };
            if validate_name(&name).is_err() {
                warn!(
                    kind = component_type.as_str(),
                    name, "skipping component with invalid name"
                );
                continue;
            }
            found.push(ScannedItem {
                component_type,
                name,
                path: entry.path(),
            });
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        items.extend(found);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn populate(root: &Path) {
        std::fs::create_dir_all(root.join("hooks")).unwrap();
        std::fs::write(root.join("hooks").join("b.sh"), "true\n").unwrap();
        std::fs::write(root.join("hooks").join("a.py"), "pass\n").unwrap();
        std::fs::create_dir_all(root.join("prompts")).unwrap();
        std::fs::write(root.join("prompts").join("review.md"), "# r\n").unwrap();
        std::fs::create_dir_all(root.join("skills").join("deploy")).unwrap();
        std::fs::write(
            root.join("skills").join("deploy").join("SKILL.md"),
            "# d\n",
        )
        .unwrap();
        std::fs::create_dir_all(root.join("mcp")).unwrap();
        std::fs::write(root.join("mcp").join("dodo.yaml"), "command: dodo\n").unwrap();
    }

    #[test]
    fn test_scan_conventional_tree() {
        let dir = tempdir().unwrap();
        populate(dir.path());

        let items = scan_tree(dir.path()).unwrap();
        let summary: Vec<(ComponentType, &str)> = items
            .iter()
            .map(|i| (i.component_type, i.name.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ComponentType::Skill, "deploy"),
                (ComponentType::Hook, "a.py"),
                (ComponentType::Hook, "b.sh"),
                (ComponentType::Prompt, "review"),
                (ComponentType::Mcp, "dodo"),
            ]
        );
    }

    #[test]
    fn test_scan_unknown_layout_is_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "# hi\n").unwrap();
        assert!(scan_tree(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_skips_mismatched_extensions_and_dotfiles() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("mcp")).unwrap();
        std::fs::write(dir.path().join("mcp").join("good.yaml"), "x: 1\n").unwrap();
        std::fs::write(dir.path().join("mcp").join("bad.toml"), "x = 1\n").unwrap();
        std::fs::write(dir.path().join("mcp").join(".hidden.yaml"), "x: 1\n").unwrap();

        let items = scan_tree(dir.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "good");
    }
}
