//! Configuration layer schema (`config.yaml`).
//!
//! ```yaml
//! global:
//!   skills: [review]
//!   hooks: [notify.py]
//! tools:
//!   claude:
//!     enabled: true
//!     hooks: { extra: [], exclude: [guard.sh] }
//! profile: focus
//! profiles:          # global file only
//!   focus:
//!     global:
//!       prompts: [summarize]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hawk_core::ComponentType;

/// Per-type component name lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeLists {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp: Vec<String>,
}

impl TypeLists {
    pub fn get(&self, component_type: ComponentType) -> &[String] {
        match component_type {
            ComponentType::Skill => &self.skills,
            ComponentType::Hook => &self.hooks,
            ComponentType::Prompt => &self.prompts,
            ComponentType::Agent => &self.agents,
            ComponentType::Mcp => &self.mcp,
        }
    }

    pub fn get_mut(&mut self, component_type: ComponentType) -> &mut Vec<String> {
        match component_type {
            ComponentType::Skill => &mut self.skills,
            ComponentType::Hook => &mut self.hooks,
            ComponentType::Prompt => &mut self.prompts,
            ComponentType::Agent => &mut self.agents,
            ComponentType::Mcp => &mut self.mcp,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.hooks.is_empty()
            && self.prompts.is_empty()
            && self.agents.is_empty()
            && self.mcp.is_empty()
    }
}

/// Per-tool `extra`/`exclude` lists for one component type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListOverride {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Per-tool overrides inside a layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolOverrides {
    /// Gates the entire tool. Unset inherits the outer layer (default
    /// enabled).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "is_default_override")]
    pub skills: ListOverride,
    #[serde(default, skip_serializing_if = "is_default_override")]
    pub hooks: ListOverride,
    #[serde(default, skip_serializing_if = "is_default_override")]
    pub prompts: ListOverride,
    #[serde(default, skip_serializing_if = "is_default_override")]
    pub agents: ListOverride,
    #[serde(default, skip_serializing_if = "is_default_override")]
    pub mcp: ListOverride,
}

fn is_default_override(value: &ListOverride) -> bool {
    value.extra.is_empty() && value.exclude.is_empty()
}

impl ToolOverrides {
    pub fn get(&self, component_type: ComponentType) -> &ListOverride {
        match component_type {
            ComponentType::Skill => &self.skills,
            ComponentType::Hook => &self.hooks,
            ComponentType::Prompt => &self.prompts,
            ComponentType::Agent => &self.agents,
            ComponentType::Mcp => &self.mcp,
        }
    }
}

/// A named preset overlaying a layer's direct values.
///
/// Profiles are single-level: a profile naming another profile is a
/// configuration error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    #[serde(default)]
    pub global: TypeLists,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// One configuration layer: the global file or a directory scope file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigLayer {
    #[serde(default)]
    pub global: TypeLists,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tools: BTreeMap<String, ToolOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Named presets. Read from the global file only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, Profile>,
}

impl ConfigLayer {
    /// Load a layer from a YAML file. A missing or empty file is an
    /// empty layer — it still counts as a layer in the chain.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Commented starter config written by `hawk init`.
    pub fn default_template() -> String {
        r#"# hawk global configuration
# Location: $HAWK_HOME/config.yaml (or the platform config dir)
#
# Components enabled here apply everywhere; directory scopes
# (<dir>/.hawk/config.yaml) layer on top of this file.

global:
  skills: []
  hooks: []
  prompts: []
  agents: []
  mcp: []

# Per-tool overrides. Every known tool is enabled by default.
#
# tools:
#   claude:
#     hooks: { extra: [], exclude: [] }
#   codex:
#     enabled: false

# Named presets a layer can opt into with `profile: <name>`.
#
# profiles:
#   focus:
#     global:
#       prompts: [summarize]
"#
        .to_string()
    }

    /// Write the layer, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content =
            serde_yaml::to_string(self).context("Failed to serialize config layer")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
