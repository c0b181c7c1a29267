//! Component identity: types and name validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HawkError;

/// The five component kinds hawk manages.
///
/// `command` is accepted as a legacy alias for `prompt` on input but is
/// never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Skill,
    Hook,
    Prompt,
    Agent,
    Mcp,
}

/// Stable processing order: skills, hooks, prompts, agents, mcp.
pub const ALL_TYPES: [ComponentType; 5] = [
    ComponentType::Skill,
    ComponentType::Hook,
    ComponentType::Prompt,
    ComponentType::Agent,
    ComponentType::Mcp,
];

impl ComponentType {
    /// Registry subdirectory for this type.
    pub fn subdir(&self) -> &'static str {
        match self {
            ComponentType::Skill => "skills",
            ComponentType::Hook => "hooks",
            ComponentType::Prompt => "prompts",
            ComponentType::Agent => "agents",
            ComponentType::Mcp => "mcp",
        }
    }

    /// Singular lowercase name, as used in config files and CLI args.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Skill => "skill",
            ComponentType::Hook => "hook",
            ComponentType::Prompt => "prompt",
            ComponentType::Agent => "agent",
            ComponentType::Mcp => "mcp",
        }
    }

    /// File name the payload is stored under.
    ///
    /// Skills and hooks store the payload under the component name
    /// verbatim (hook names carry their extension). Prompts, agents and
    /// MCP definitions append a fixed extension the component name
    /// excludes.
    pub fn payload_file_name(&self, name: &str) -> String {
        match self {
            ComponentType::Skill | ComponentType::Hook => name.to_string(),
            ComponentType::Prompt | ComponentType::Agent => format!("{name}.md"),
            ComponentType::Mcp => format!("{name}.yaml"),
        }
    }

    /// Inverse of [`payload_file_name`]: component name for a payload
    /// file name, or `None` when the file does not belong to this type.
    pub fn name_from_payload(&self, file_name: &str) -> Option<String> {
        match self {
            ComponentType::Skill | ComponentType::Hook => Some(file_name.to_string()),
            ComponentType::Prompt | ComponentType::Agent => {
                file_name.strip_suffix(".md").map(str::to_string)
            }
            ComponentType::Mcp => file_name.strip_suffix(".yaml").map(str::to_string),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = HawkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skill" | "skills" => Ok(ComponentType::Skill),
            "hook" | "hooks" => Ok(ComponentType::Hook),
            "prompt" | "prompts" | "command" | "commands" => Ok(ComponentType::Prompt),
            "agent" | "agents" => Ok(ComponentType::Agent),
            "mcp" => Ok(ComponentType::Mcp),
            other => Err(HawkError::UnknownComponentType(other.to_string())),
        }
    }
}

/// Validate a component name: `^[A-Za-z0-9_][A-Za-z0-9._-]*$`, no path
/// separators, no `..`.
pub fn validate_name(name: &str) -> Result<(), HawkError> {
    let invalid = || HawkError::InvalidName(name.to_string());

    let mut chars = name.chars();
    let first = chars.next().ok_or_else(invalid)?;
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return Err(invalid());
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(invalid());
    }
    if name.contains("..") {
        return Err(invalid());
    }
    Ok(())
}

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{other}' (expected: text, json)")),
        }
    }
}
