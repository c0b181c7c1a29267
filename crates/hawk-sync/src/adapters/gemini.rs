//! Gemini CLI adapter.
//!
//! - prompts → projected TOML command files under `commands/`
//! - MCP → `settings.json` (`mcpServers`)
//! - skills, agents, hooks → unsupported (skipped)
//!
//! Gemini commands are not symlinks: the prompt body is projected into
//! the tool's native TOML shape. Serialization goes through the `toml`
//! crate so quotes, backslashes and triple-quote sequences in bodies are
//! escaped correctly. Projected files carry a marker comment on their
//! first line; files without it are user property.

use std::collections::BTreeSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use hawk_config::ResolvedState;
use hawk_core::ComponentType;
use hawk_hooks::HookEvent;

use crate::adapter::{
    EventSupport, SyncContext, SyncScope, ToolAdapter, apply_mcp_outcome, desired_mcp_values,
    sync_symlinks,
};
use crate::mcp;
use crate::result::{Artifact, ArtifactKind, SyncError, SyncResult};

/// First line of every projected command file.
const MANAGED_HEADER: &str = "# managed by hawk";

pub struct GeminiAdapter {
    home: PathBuf,
}

#[derive(Serialize)]
struct CommandFile<'a> {
    description: &'a str,
    prompt: &'a str,
}

impl GeminiAdapter {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    fn base_dir(&self, scope: &SyncScope) -> PathBuf {
        match scope {
            SyncScope::Global => self.global_dir(),
            SyncScope::Project(dir) => dir.join(self.project_marker()),
        }
    }

    fn settings_path(&self, scope: &SyncScope) -> PathBuf {
        self.base_dir(scope).join("settings.json")
    }

    /// Render one prompt into the native TOML command shape.
    fn render_command(name: &str, body: &str) -> Result<String> {
        let description = first_heading(body).unwrap_or(name);
        let file = CommandFile {
            description,
            prompt: body,
        };
        let toml_body = toml::to_string(&file).context("failed to serialize command TOML")?;
        Ok(format!("{MANAGED_HEADER}\n{toml_body}"))
    }

    fn sync_prompts(&self, ctx: &SyncContext, state: &ResolvedState, result: &mut SyncResult) {
        let names = state.get(ComponentType::Prompt);
        let dest = self.destination(ComponentType::Prompt, ctx.scope);
        let mut keep: BTreeSet<String> = BTreeSet::new();

        if !names.is_empty() {
            if let Err(err) = std::fs::create_dir_all(&dest) {
                result.errors.push(SyncError::io(format!(
                    "failed to create {}: {err}",
                    dest.display()
                )));
                return;
            }
        }

        for name in names {
            let payload = ctx.registry.payload_path(ComponentType::Prompt, name);
            let Ok(body) = std::fs::read_to_string(&payload) else {
                result
                    .errors
                    .push(SyncError::missing(ComponentType::Prompt, name));
                continue;
            };
            let file_name = format!("{name}.toml");
            let target = dest.join(&file_name);
            keep.insert(file_name);

            if target.exists() && !is_managed_file(&target) {
                result.errors.push(SyncError::conflict(name.clone(), target));
                continue;
            }
            match Self::render_command(name, &body)
                .and_then(|content| write_atomic(&target, &content))
            {
                Ok(()) => result.linked.push(Artifact::new(
                    ArtifactKind::Projection,
                    name.clone(),
                    target,
                )),
                Err(err) => result.errors.push(SyncError::io(format!("{err:#}"))),
            }
        }

        // Stale cleanup: managed command files no longer desired.
        if dest.is_dir() {
            match prune_managed_files(&dest, &keep) {
                Ok(removed) => {
                    for path in removed {
                        let name = path
                            .file_stem()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        result
                            .unlinked
                            .push(Artifact::new(ArtifactKind::Projection, name, path));
                    }
                }
                Err(err) => result.errors.push(SyncError::io(format!("{err:#}"))),
            }
        }
    }
}

fn first_heading(body: &str) -> Option<&str> {
    body.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
}

fn is_managed_file(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .map(|content| content.lines().next() == Some(MANAGED_HEADER))
        .unwrap_or(false)
}

fn prune_managed_files(dir: &Path, keep: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !file_name.ends_with(".toml") || keep.contains(&file_name) {
            continue;
        }
        let path = entry.path();
        if is_managed_file(&path) {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove stale command {}", path.display()))?;
            removed.push(path);
        }
    }
    Ok(removed)
}

fn write_atomic(target: &Path, content: &str) -> Result<()> {
    let dir = target
        .parent()
        .with_context(|| format!("command path has no parent: {}", target.display()))?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".command-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("failed to stage command in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .context("failed to write command file")?;
    tmp.persist(target)
        .with_context(|| format!("failed to install {}", target.display()))?;
    Ok(())
}

impl ToolAdapter for GeminiAdapter {
    fn tool_id(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Gemini CLI"
    }

    fn global_dir(&self) -> PathBuf {
        self.home.join(".gemini")
    }

    fn project_marker(&self) -> &'static str {
        ".gemini"
    }

    fn supports(&self, component_type: ComponentType) -> bool {
        matches!(component_type, ComponentType::Prompt | ComponentType::Mcp)
    }

    fn event_support(&self, _event: HookEvent) -> EventSupport {
        EventSupport::Unsupported
    }

    fn destination(&self, component_type: ComponentType, scope: &SyncScope) -> PathBuf {
        let base = self.base_dir(scope);
        match component_type {
            ComponentType::Prompt => base.join("commands"),
            ComponentType::Mcp => self.settings_path(scope),
            _ => base,
        }
    }

    fn sync(&self, ctx: &SyncContext, state: &ResolvedState) -> SyncResult {
        let mut result = SyncResult::default();

        // Unsupported types become skips, not errors.
        sync_symlinks(self, ctx, state, ComponentType::Skill, &mut result);
        sync_symlinks(self, ctx, state, ComponentType::Agent, &mut result);
        self.register_hooks(ctx, state.get(ComponentType::Hook), &mut result);

        self.sync_prompts(ctx, state, &mut result);

        let desired = desired_mcp_values(ctx, state, &mut result);
        let settings = self.settings_path(ctx.scope);
        match mcp::merge_mcp_json(&settings, "mcpServers", &desired) {
            Ok(outcome) => apply_mcp_outcome(outcome, &settings, &mut result),
            Err(err) => result.errors.push(SyncError::io(format!("{err:#}"))),
        }

        result
    }
}

#[cfg(test)]
#[path = "gemini_tests.rs"]
mod tests;
