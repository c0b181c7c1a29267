//! Codex CLI adapter.
//!
//! - prompts → `~/.codex/prompts/<name>.md` symlinks
//! - MCP → `[mcp_servers.<name>]` tables in `config.toml`
//! - hooks → only `notification`, bridged through the `notify` array in
//!   `config.toml`; every other event is skipped
//!
//! `config.toml` is edited with `toml_edit` so user tables, comments and
//! formatting survive; managed server tables carry `_hawk_managed = true`
//! and managed notify entries are recognized by pointing into a runners
//! directory.

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use toml_edit::{DocumentMut, Item, Table, value};

use hawk_config::ResolvedState;
use hawk_core::ComponentType;
use hawk_hooks::HookEvent;

use crate::adapter::{
    EventSupport, SyncContext, SyncScope, ToolAdapter, desired_mcp_values,
    skip_unsupported_events, sync_runners, sync_symlinks,
};
use crate::result::{Artifact, ArtifactKind, SyncError, SyncResult};

/// Marker key on managed `[mcp_servers.*]` tables.
const TOML_MARKER: &str = "_hawk_managed";

pub struct CodexAdapter {
    home: PathBuf,
    hook_support: BTreeMap<HookEvent, EventSupport>,
}

impl CodexAdapter {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let mut hook_support = BTreeMap::new();
        hook_support.insert(HookEvent::Notification, EventSupport::Bridged);
        Self {
            home: home.into(),
            hook_support,
        }
    }

    /// Override the hook support table (a capability upgrade changes the
    /// fingerprint and re-attempts previously skipped artifacts).
    pub fn with_hook_support(
        home: impl Into<PathBuf>,
        hook_support: BTreeMap<HookEvent, EventSupport>,
    ) -> Self {
        Self {
            home: home.into(),
            hook_support,
        }
    }

    fn base_dir(&self, scope: &SyncScope) -> PathBuf {
        match scope {
            SyncScope::Global => self.global_dir(),
            SyncScope::Project(dir) => dir.join(self.project_marker()),
        }
    }

    fn config_path(&self, scope: &SyncScope) -> PathBuf {
        self.base_dir(scope).join("config.toml")
    }

    /// Merge managed MCP tables and/or notify entries into
    /// `config.toml`. `desired_mcp: None` leaves the MCP section alone.
    fn write_config(
        &self,
        ctx: &SyncContext,
        desired_mcp: Option<&BTreeMap<String, Value>>,
        notify_runner: Option<PathBuf>,
        result: &mut SyncResult,
    ) {
        let config_path = self.config_path(ctx.scope);
        let mut doc = match read_document(&config_path) {
            Ok(doc) => doc,
            Err(err) => {
                result.errors.push(SyncError::io(format!("{err:#}")));
                return;
            }
        };

        if let Some(desired) = desired_mcp {
            merge_mcp_tables(&mut doc, desired, &config_path, result);
        }
        merge_notify(&mut doc, notify_runner.as_deref(), &config_path, result);

        if doc.as_table().is_empty() && !config_path.exists() {
            return;
        }
        if let Err(err) = write_document(&config_path, &doc) {
            result.errors.push(SyncError::io(format!("{err:#}")));
        }
    }
}

fn read_document(path: &Path) -> Result<DocumentMut> {
    if !path.exists() {
        return Ok(DocumentMut::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    content
        .parse::<DocumentMut>()
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn write_document(path: &Path, doc: &DocumentMut) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("config path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".config-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("failed to stage config in {}", dir.display()))?;
    tmp.write_all(doc.to_string().as_bytes())
        .context("failed to write config")?;
    tmp.persist(path)
        .with_context(|| format!("failed to install {}", path.display()))?;
    Ok(())
}

fn merge_mcp_tables(
    doc: &mut DocumentMut,
    desired: &BTreeMap<String, Value>,
    config_path: &Path,
    result: &mut SyncResult,
) {
    let had_section = doc.contains_key("mcp_servers");
    if !had_section && desired.is_empty() {
        return;
    }
    let servers = doc["mcp_servers"].or_insert(Item::Table(Table::new()));
    let Some(servers) = servers.as_table_mut() else {
        result.errors.push(SyncError::io(format!(
            "{}: 'mcp_servers' is not a table",
            config_path.display()
        )));
        return;
    };
    servers.set_implicit(true);

    let mut previously_managed = Vec::new();
    let existing: Vec<String> = servers.iter().map(|(key, _)| key.to_string()).collect();
    for name in existing {
        let managed = servers
            .get(&name)
            .and_then(Item::as_table)
            .and_then(|t| t.get(TOML_MARKER))
            .and_then(Item::as_value)
            .and_then(toml_edit::Value::as_bool)
            == Some(true);
        if managed {
            servers.remove(&name);
            previously_managed.push(name);
        }
    }

    for (name, server) in desired {
        if servers.contains_key(name) {
            result
                .errors
                .push(SyncError::conflict(name.clone(), config_path));
            continue;
        }
        match json_to_table(server) {
            Ok(mut table) => {
                table.insert(TOML_MARKER, value(true));
                servers.insert(name, Item::Table(table));
                result.linked.push(Artifact::new(
                    ArtifactKind::McpEntry,
                    name.clone(),
                    config_path,
                ));
            }
            Err(err) => result.errors.push(SyncError::io(format!("{err:#}"))),
        }
    }

    for name in previously_managed {
        if !desired.contains_key(&name) {
            result
                .unlinked
                .push(Artifact::new(ArtifactKind::McpEntry, name, config_path));
        }
    }
}

/// Managed notify entries point into a runners directory.
fn is_managed_notify(entry: &str) -> bool {
    entry.contains("/runners/") && entry.ends_with(".sh")
}

fn merge_notify(
    doc: &mut DocumentMut,
    runner: Option<&Path>,
    config_path: &Path,
    result: &mut SyncResult,
) {
    let had_notify = doc.contains_key("notify");
    if !had_notify && runner.is_none() {
        return;
    }

    let mut entries: Vec<String> = doc
        .get("notify")
        .and_then(Item::as_array)
        .map(|array| {
            array
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let before: Vec<String> = entries.clone();
    entries.retain(|entry| !is_managed_notify(entry));
    if let Some(runner) = runner {
        let entry = runner.to_string_lossy().to_string();
        result.linked.push(Artifact::new(
            ArtifactKind::HookEntry,
            "notification",
            config_path,
        ));
        entries.push(entry);
    }
    for old in &before {
        if is_managed_notify(old) && runner.map(|r| r.to_string_lossy() != old.as_str()).unwrap_or(true)
        {
            result.unlinked.push(Artifact::new(
                ArtifactKind::HookEntry,
                "notification",
                config_path,
            ));
        }
    }

    if entries.is_empty() {
        doc.remove("notify");
    } else {
        let mut array = toml_edit::Array::new();
        for entry in entries {
            array.push(entry);
        }
        doc["notify"] = value(array);
    }
}

/// Convert the common JSON server shape into a TOML table.
///
/// Going through `toml_edit` values means every string — paths with
/// backslashes, quotes, anything — is escaped by the serializer.
fn json_to_table(server: &Value) -> Result<Table> {
    let Value::Object(fields) = server else {
        anyhow::bail!("MCP server value is not an object");
    };
    let mut table = Table::new();
    for (key, field) in fields {
        table.insert(key, json_to_item(field)?);
    }
    Ok(table)
}

fn json_to_item(field: &Value) -> Result<Item> {
    Ok(match field {
        Value::String(s) => value(s.as_str()),
        Value::Bool(b) => value(*b),
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                value(int)
            } else {
                value(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::Array(items) => {
            let mut array = toml_edit::Array::new();
            for item in items {
                match item {
                    Value::String(s) => array.push(s.as_str()),
                    other => anyhow::bail!("unsupported array element: {other}"),
                }
            }
            value(array)
        }
        Value::Object(map) => {
            let mut inline = toml_edit::InlineTable::new();
            for (key, val) in map {
                match val {
                    Value::String(s) => {
                        inline.insert(key, s.as_str().into());
                    }
                    other => anyhow::bail!("unsupported table value: {other}"),
                }
            }
            value(inline)
        }
        Value::Null => anyhow::bail!("null is not representable in TOML"),
    })
}

impl ToolAdapter for CodexAdapter {
    fn tool_id(&self) -> &'static str {
        "codex"
    }

    fn display_name(&self) -> &'static str {
        "Codex CLI"
    }

    fn global_dir(&self) -> PathBuf {
        self.home.join(".codex")
    }

    fn project_marker(&self) -> &'static str {
        ".codex"
    }

    fn supports(&self, component_type: ComponentType) -> bool {
        matches!(
            component_type,
            ComponentType::Prompt | ComponentType::Mcp | ComponentType::Hook
        )
    }

    fn event_support(&self, event: HookEvent) -> EventSupport {
        self.hook_support
            .get(&event)
            .copied()
            .unwrap_or(EventSupport::Unsupported)
    }

    fn destination(&self, component_type: ComponentType, scope: &SyncScope) -> PathBuf {
        let base = self.base_dir(scope);
        match component_type {
            ComponentType::Prompt => base.join("prompts"),
            ComponentType::Mcp | ComponentType::Hook => self.config_path(scope),
            _ => base,
        }
    }

    fn sync(&self, ctx: &SyncContext, state: &ResolvedState) -> SyncResult {
        let mut result = SyncResult::default();

        // Fixed processing order: skills, hooks, prompts, agents, mcp.
        sync_symlinks(self, ctx, state, ComponentType::Skill, &mut result);
        let buckets = sync_runners(self, ctx, state.get(ComponentType::Hook), &mut result);
        skip_unsupported_events(self, &buckets, &mut result);
        sync_symlinks(self, ctx, state, ComponentType::Prompt, &mut result);
        sync_symlinks(self, ctx, state, ComponentType::Agent, &mut result);

        let notify_runner = buckets
            .keys()
            .find(|event| self.event_support(**event).is_supported())
            .map(|event| ctx.runners_dir().join(event.runner_file_name()));

        let desired = desired_mcp_values(ctx, state, &mut result);
        self.write_config(ctx, Some(&desired), notify_runner, &mut result);

        result
    }

    fn register_hooks(
        &self,
        ctx: &SyncContext,
        hook_names: &[String],
        result: &mut SyncResult,
    ) -> Vec<String> {
        let buckets = sync_runners(self, ctx, hook_names, result);
        skip_unsupported_events(self, &buckets, result);
        let notify_runner = buckets
            .keys()
            .find(|event| self.event_support(**event).is_supported())
            .map(|event| ctx.runners_dir().join(event.runner_file_name()));
        self.write_config(ctx, None, notify_runner, result);

        let hooks_dir = ctx.registry.type_dir(ComponentType::Hook);
        hook_names
            .iter()
            .filter(|name| {
                hawk_hooks::parse(&hooks_dir.join(name.as_str()))
                    .events
                    .iter()
                    .any(|event| self.event_support(*event).is_supported())
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "codex_tests.rs"]
mod tests;
