//! Claude Code adapter.
//!
//! - skills → `~/.claude/skills/<name>` symlinks
//! - prompts → `~/.claude/commands/<name>.md` symlinks
//! - agents → `~/.claude/agents/<name>.md` symlinks
//! - hooks → per-event runners plus managed entries in `settings.json`
//! - MCP → `~/.claude.json` (`mcpServers`) globally, `<project>/.mcp.json`
//!   at project scope
//!
//! Claude understands every canonical event natively.

use std::path::PathBuf;

use serde_json::{Value, json};

use hawk_config::ResolvedState;
use hawk_core::ComponentType;
use hawk_hooks::HookEvent;

use crate::adapter::{
    EventSupport, SyncContext, SyncScope, ToolAdapter, apply_mcp_outcome, desired_mcp_values,
    event_timeout, skip_unsupported_events, sync_runners, sync_symlinks,
};
use crate::mcp::{self, MANAGED_MARKER};
use crate::result::{Artifact, ArtifactKind, SyncError, SyncResult};

pub struct ClaudeAdapter {
    home: PathBuf,
}

impl ClaudeAdapter {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Claude's native name for a canonical event.
    pub fn native_event_name(event: HookEvent) -> &'static str {
        match event {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PostToolUse => "PostToolUse",
            HookEvent::Stop => "Stop",
            HookEvent::SubagentStop => "SubagentStop",
            HookEvent::Notification => "Notification",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::SessionStart => "SessionStart",
            HookEvent::SessionEnd => "SessionEnd",
            HookEvent::PreCompact => "PreCompact",
        }
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

    fn mcp_target(&self, scope: &SyncScope) -> (PathBuf, &'static str) {
        match scope {
            // Global MCP lives in ~/.claude.json, not under ~/.claude/.
            SyncScope::Global => (self.home.join(".claude.json"), "mcpServers"),
            SyncScope::Project(dir) => (dir.join(".mcp.json"), "mcpServers"),
        }
    }

    /// Rewrite the managed hook entries in `settings.json`.
    ///
    /// Each supported event gets one managed matcher group pointing at
    /// the scope's runner. User groups are preserved; events whose array
    /// ends up empty are dropped.
    fn write_hook_settings(
        &self,
        ctx: &SyncContext,
        buckets: &std::collections::BTreeMap<HookEvent, Vec<String>>,
        result: &mut SyncResult,
    ) {
        let settings_path = self.settings_path(ctx.scope);
        let mut root = match mcp::read_json_object(&settings_path) {
            Ok(root) => root,
            Err(err) => {
                result.errors.push(SyncError::io(format!("{err:#}")));
                return;
            }
        };

        let mut hooks = match root.remove("hooks") {
            Some(Value::Object(map)) => map,
            Some(other) => {
                root.insert("hooks".to_string(), other);
                result.errors.push(SyncError::io(format!(
                    "{}: 'hooks' is not an object",
                    settings_path.display()
                )));
                return;
            }
            None => serde_json::Map::new(),
        };

        // Strip managed groups everywhere, remembering which events had
        // one.
        let mut previously_managed = Vec::new();
        for (event_name, groups) in hooks.iter_mut() {
            if let Value::Array(items) = groups {
                let before = items.len();
                items.retain(|group| {
                    group.get(MANAGED_MARKER).and_then(Value::as_bool) != Some(true)
                });
                if items.len() != before {
                    previously_managed.push(event_name.clone());
                }
            }
        }

        let runners_dir = ctx.runners_dir();
        let hooks_dir = ctx.registry.type_dir(ComponentType::Hook);
        let mut registered_events = Vec::new();
        for (event, event_hooks) in buckets {
            if !self.event_support(*event).is_supported() {
                continue;
            }
            let native = Self::native_event_name(*event);
            let runner = runners_dir.join(event.runner_file_name());
            let mut command = json!({
                "type": "command",
                "command": runner.to_string_lossy(),
            });
            if let Some(timeout) = event_timeout(event_hooks, &hooks_dir) {
                command["timeout"] = json!(timeout);
            }
            let group = json!({
                "matcher": "",
                MANAGED_MARKER: true,
                "hooks": [command],
            });
            hooks
                .entry(native.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(Value::Array(items)) = hooks.get_mut(native) {
                items.push(group);
            }
            registered_events.push(native.to_string());
            result.linked.push(Artifact::new(
                ArtifactKind::HookEntry,
                native,
                settings_path.clone(),
            ));
        }

        for event_name in previously_managed {
            if !registered_events.contains(&event_name) {
                result.unlinked.push(Artifact::new(
                    ArtifactKind::HookEntry,
                    event_name,
                    settings_path.clone(),
                ));
            }
        }

        // Drop events whose array is now empty.
        hooks.retain(|_, groups| !matches!(groups, Value::Array(items) if items.is_empty()));

        let nothing_to_write =
            hooks.is_empty() && root.is_empty() && !settings_path.exists();
        if nothing_to_write {
            return;
        }
        if !hooks.is_empty() {
            root.insert("hooks".to_string(), Value::Object(hooks));
        }
        if let Err(err) = mcp::write_json_object(&settings_path, &root) {
            result.errors.push(SyncError::io(format!("{err:#}")));
        }
    }
}

impl ToolAdapter for ClaudeAdapter {
    fn tool_id(&self) -> &'static str {
        "claude"
    }

    fn display_name(&self) -> &'static str {
        "Claude Code"
    }

    fn global_dir(&self) -> PathBuf {
        self.home.join(".claude")
    }

    fn project_marker(&self) -> &'static str {
        ".claude"
    }

    fn supports(&self, _component_type: ComponentType) -> bool {
        true
    }

    fn event_support(&self, _event: HookEvent) -> EventSupport {
        EventSupport::Native
    }

    fn wants_env_injection(&self) -> bool {
        true
    }

    fn destination(&self, component_type: ComponentType, scope: &SyncScope) -> PathBuf {
        let base = self.base_dir(scope);
        match component_type {
            ComponentType::Skill => base.join("skills"),
            ComponentType::Prompt => base.join("commands"),
            ComponentType::Agent => base.join("agents"),
            ComponentType::Hook => self.settings_path(scope),
            ComponentType::Mcp => self.mcp_target(scope).0,
        }
    }

    fn sync(&self, ctx: &SyncContext, state: &ResolvedState) -> SyncResult {
        let mut result = SyncResult::default();

        // Fixed processing order: skills, hooks, prompts, agents, mcp.
        sync_symlinks(self, ctx, state, ComponentType::Skill, &mut result);
        self.register_hooks(ctx, state.get(ComponentType::Hook), &mut result);
        sync_symlinks(self, ctx, state, ComponentType::Prompt, &mut result);
        sync_symlinks(self, ctx, state, ComponentType::Agent, &mut result);

        let desired = desired_mcp_values(ctx, state, &mut result);
        let (mcp_path, section) = self.mcp_target(ctx.scope);
        match mcp::merge_mcp_json(&mcp_path, section, &desired) {
            Ok(outcome) => apply_mcp_outcome(outcome, &mcp_path, &mut result),
            Err(err) => result.errors.push(SyncError::io(format!("{err:#}"))),
        }

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
        self.write_hook_settings(ctx, &buckets, result);

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
#[path = "claude_tests.rs"]
mod tests;
