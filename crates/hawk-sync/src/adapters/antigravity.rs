//! Antigravity adapter.
//!
//! - skills → `skills/<name>` symlinks
//! - MCP → `mcp_config.json` sidecar
//! - prompts, agents, hooks → unsupported

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

pub struct AntigravityAdapter {
    home: PathBuf,
}

impl AntigravityAdapter {
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

impl ToolAdapter for AntigravityAdapter {
    fn tool_id(&self) -> &'static str {
        "antigravity"
    }

    fn display_name(&self) -> &'static str {
        "Antigravity"
    }

    fn global_dir(&self) -> PathBuf {
        self.home.join(".antigravity")
    }

    fn project_marker(&self) -> &'static str {
        ".antigravity"
    }

    fn supports(&self, component_type: ComponentType) -> bool {
        matches!(component_type, ComponentType::Skill | ComponentType::Mcp)
    }

    fn event_support(&self, _event: HookEvent) -> EventSupport {
        EventSupport::Unsupported
    }

    fn destination(&self, component_type: ComponentType, scope: &SyncScope) -> PathBuf {
        let base = self.base_dir(scope);
        match component_type {
            ComponentType::Skill => base.join("skills"),
            ComponentType::Mcp => base.join("mcp_config.json"),
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

#[cfg(test)]
mod tests {
    use hawk_config::TypeLists;
    use hawk_core::ComponentType;

    use super::*;
    use crate::testutil::{fixture, state};

    #[test]
    fn test_skill_symlinked_prompt_skipped() {
        let fx = fixture();
        fx.add_dir(ComponentType::Skill, "deploy", &[("SKILL.md", "# d\n")]);
        fx.add_file(ComponentType::Prompt, "fix", "# Fix\n");

        let adapter = AntigravityAdapter::new(&fx.home);
        let scope = SyncScope::Global;
        let ctx = fx.ctx(&scope);
        let lists = TypeLists {
            skills: vec!["deploy".to_string()],
            prompts: vec!["fix".to_string()],
            ..Default::default()
        };
        let result = adapter.sync(&ctx, &state(lists));
        assert!(result.is_success(), "errors: {:?}", result.errors);

        assert!(fx
            .home
            .join(".antigravity")
            .join("skills")
            .join("deploy")
            .join("SKILL.md")
            .is_file());
        assert_eq!(result.skipped.len(), 1);
    }

    #[test]
    fn test_mcp_sidecar() {
        let fx = fixture();
        fx.add_file(ComponentType::Mcp, "dodo", "command: npx\n");

        let adapter = AntigravityAdapter::new(&fx.home);
        let scope = SyncScope::Global;
        let ctx = fx.ctx(&scope);
        let lists = TypeLists {
            mcp: vec!["dodo".to_string()],
            ..Default::default()
        };
        let result = adapter.sync(&ctx, &state(lists));
        assert!(result.is_success());

        let sidecar: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(
                fx.home.join(".antigravity").join("mcp_config.json"),
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(sidecar["mcpServers"]["dodo"]["command"], "npx");
    }
}
