//! MCP server definitions and config-file merge helpers.
//!
//! Definitions live in the registry as `mcp/<name>.yaml`:
//!
//! ```yaml
//! # stdio (the `command` field implies it)
//! command: npx
//! args: [-y, dodo-mcp]
//! env: { DODO_DIR: ~/.dodo }
//! ```
//! ```yaml
//! # remote
//! transport: http
//! url: https://mcp.example.com/mcp
//! headers: { Authorization: Bearer x }
//! ```
//!
//! Merging into a host tool's JSON config follows the ownership
//! contract: every entry hawk writes carries `__hawk_managed: true`;
//! user entries are preserved byte-for-byte and a user entry whose key
//! collides with a managed name is an error.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Marker key identifying entries owned by hawk.
pub const MANAGED_MARKER: &str = "__hawk_managed";

/// One MCP server definition from the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpServerDef {
    /// Transport label: stdio, http or sse. A present `command` implies
    /// stdio; a present `url` without `transport` implies http.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl McpServerDef {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read MCP definition: {}", path.display()))?;
        let def: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse MCP definition: {}", path.display()))?;
        def.validate(path)?;
        Ok(def)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.command.is_none() && self.url.is_none() {
            bail!(
                "MCP definition {} needs either 'command' (stdio) or 'url' (remote)",
                path.display()
            );
        }
        Ok(())
    }

    /// Effective transport label.
    pub fn transport_label(&self) -> &str {
        if let Some(transport) = &self.transport {
            return transport.as_str();
        }
        if self.command.is_some() { "stdio" } else { "http" }
    }

    /// Project to the common JSON object shape (`mcpServers` style).
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        match self.transport_label() {
            "stdio" => {
                if let Some(command) = &self.command {
                    object.insert("command".to_string(), json!(command));
                }
                if !self.args.is_empty() {
                    object.insert("args".to_string(), json!(self.args));
                }
                if !self.env.is_empty() {
                    object.insert("env".to_string(), json!(self.env));
                }
            }
            transport => {
                object.insert("type".to_string(), json!(transport));
                if let Some(url) = &self.url {
                    object.insert("url".to_string(), json!(url));
                }
                if !self.headers.is_empty() {
                    object.insert("headers".to_string(), json!(self.headers));
                }
            }
        }
        Value::Object(object)
    }
}

/// Outcome of one merge pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct McpMergeOutcome {
    /// Managed entries now present.
    pub written: Vec<String>,
    /// Previously managed entries removed because no longer desired.
    pub removed: Vec<String>,
    /// Desired names blocked by a user-authored entry of the same name.
    pub conflicts: Vec<String>,
}

/// Merge managed entries into the object at `section` of a JSON config
/// file, inline-marker style.
///
/// 1. read the current config (missing file reads as `{}`)
/// 2. strip entries carrying the managed marker
/// 3. insert the desired entries, marker added
/// 4. write user entries ∪ managed entries
///
/// Every other top-level key is preserved verbatim.
pub fn merge_mcp_json(
    path: &Path,
    section: &str,
    desired: &BTreeMap<String, Value>,
) -> Result<McpMergeOutcome> {
    let mut root = read_json_object(path)?;
    let mut outcome = McpMergeOutcome::default();

    let had_section = root.contains_key(section);
    let mut servers = match root.remove(section) {
        Some(Value::Object(map)) => map,
        Some(other) => {
            bail!(
                "{}: '{section}' is {} where an object was expected",
                path.display(),
                type_name(&other)
            );
        }
        None => Map::new(),
    };

    // Strip currently managed entries, remembering them for removal
    // accounting.
    let mut previously_managed = Vec::new();
    servers.retain(|name, value| {
        if is_managed(value) {
            previously_managed.push(name.clone());
            false
        } else {
            true
        }
    });

    for (name, value) in desired {
        if servers.contains_key(name) {
            // User-authored entry with the same key: hands off.
            outcome.conflicts.push(name.clone());
            continue;
        }
        let mut value = value.clone();
        if let Value::Object(object) = &mut value {
            object.insert(MANAGED_MARKER.to_string(), Value::Bool(true));
        }
        servers.insert(name.clone(), value);
        outcome.written.push(name.clone());
    }

    outcome.removed = previously_managed
        .into_iter()
        .filter(|name| !desired.contains_key(name))
        .collect();

    // Avoid touching a file (or creating one) when the pass changed
    // nothing.
    if outcome.written.is_empty() && outcome.removed.is_empty() && !path.exists() {
        return Ok(outcome);
    }

    if !servers.is_empty() || had_section {
        root.insert(section.to_string(), Value::Object(servers));
    }
    write_json_object(path, &root)?;
    Ok(outcome)
}

/// Merge into a sidecar file whose entire purpose is MCP servers
/// (`.mcp.json`, `mcp.json`, `mcp_config.json`). Same ownership
/// contract, fixed `mcpServers` section.
pub fn merge_mcp_sidecar(path: &Path, desired: &BTreeMap<String, Value>) -> Result<McpMergeOutcome> {
    merge_mcp_json(path, "mcpServers", desired)
}

/// Read the current entries of a config section, managed and user alike.
pub fn read_mcp_config(path: &Path, section: &str) -> Result<BTreeMap<String, Value>> {
    let root = read_json_object(path)?;
    match root.get(section) {
        Some(Value::Object(map)) => Ok(map.clone().into_iter().collect()),
        _ => Ok(BTreeMap::new()),
    }
}

fn is_managed(value: &Value) -> bool {
    value.get(MANAGED_MARKER).and_then(Value::as_bool) == Some(true)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn read_json_object(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "{}: expected a JSON object at the top level, found {}",
            path.display(),
            type_name(&other)
        ),
    }
}

pub(crate) fn write_json_object(path: &Path, root: &Map<String, Value>) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("config path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let content = serde_json::to_string_pretty(&Value::Object(root.clone()))
        .context("failed to serialize config")?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".config-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("failed to stage config in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .context("failed to write config")?;
    tmp.write_all(b"\n").context("failed to write config")?;
    tmp.persist(path)
        .with_context(|| format!("failed to install {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod tests;
