//! Cursor adapter.
//!
//! - prompts → `~/.cursor/commands/<name>.md` symlinks
//! - MCP → `mcp.json` sidecar
//! - skills, agents, hooks → unsupported

use std::path::PathBuf;

use hawk_config::ResolvedState;
use hawk_core::ComponentType;
use hawk_hooks::HookEvent;

use crate::adapter::{
    EventSupport, SyncContext, SyncScope, ToolAdapter, apply_mcp_outcome, desired_mcp_values,
    sync_symlinks,
};
use crate::mcp;
use crate::result::{SyncError, SyncResult};

pub struct CursorAdapter {
    home: PathBuf,
}

impl CursorAdapter {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    fn base_dir(&self, scope: &SyncScope) -> PathBuf {
        match scope {
            SyncScope::Global => self.global_dir(),
            SyncScope::Project(dir) => dir.join(self.project_marker()),
        }
    }
}

impl ToolAdapter for CursorAdapter {
    fn tool_id(&self) -> &'static str {
        "cursor"
    }

    fn display_name(&self) -> &'static str {
        "Cursor"
    }

    fn global_dir(&self) -> PathBuf {
        self.home.join(".cursor")
    }

    fn project_marker(&self) -> &'static str {
        ".cursor"
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
            ComponentType::Mcp => base.join("mcp.json"),
            _ => base,
        }
    }

    fn sync(&self, ctx: &SyncContext, state: &ResolvedState) -> SyncResult {
        let mut result = SyncResult::default();

        sync_symlinks(self, ctx, state, ComponentType::Skill, &mut result);
        self.register_hooks(ctx, state.get(ComponentType::Hook), &mut result);
        sync_symlinks(self, ctx, state, ComponentType::Prompt, &mut result);
        sync_symlinks(self, ctx, state, ComponentType::Agent, &mut result);

        let desired = desired_mcp_values(ctx, state, &mut result);
        let sidecar = self.destination(ComponentType::Mcp, ctx.scope);
        match mcp::merge_mcp_sidecar(&sidecar, &desired) {
            Ok(outcome) => apply_mcp_outcome(outcome, &sidecar, &mut result),
            Err(err) => result.errors.push(SyncError::io(format!("{err:#}"))),
        }

        result
    }
}
