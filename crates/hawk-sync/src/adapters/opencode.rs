//! OpenCode adapter.
//!
//! - prompts → `command/<name>.md` symlinks
//! - agents → `agent/<name>.md` symlinks
//! - MCP → `opencode.json` under the `mcp` key
//! - skills, hooks → unsupported
//!
//! The global base is `~/.config/opencode`; project scope anchors at
//! `<dir>/.opencode`.

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

pub struct OpencodeAdapter {
    home: PathBuf,
}

impl OpencodeAdapter {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    fn base_dir(&self, scope: &SyncScope) -> PathBuf {
        match scope {
            SyncScope::Global => self.global_dir(),
            SyncScope::Project(dir) => dir.join(self.project_marker()),
        }
    }

    fn config_path(&self, scope: &SyncScope) -> PathBuf {
        self.base_dir(scope).join("opencode.json")
    }
}

impl ToolAdapter for OpencodeAdapter {
    fn tool_id(&self) -> &'static str {
        "opencode"
    }

    fn display_name(&self) -> &'static str {
        "OpenCode"
    }

    fn global_dir(&self) -> PathBuf {
        self.home.join(".config").join("opencode")
    }

    fn project_marker(&self) -> &'static str {
        ".opencode"
    }

    fn supports(&self, component_type: ComponentType) -> bool {
        matches!(
            component_type,
            ComponentType::Prompt | ComponentType::Agent | ComponentType::Mcp
        )
    }

    fn event_support(&self, _event: HookEvent) -> EventSupport {
        EventSupport::Unsupported
    }

    fn destination(&self, component_type: ComponentType, scope: &SyncScope) -> PathBuf {
        let base = self.base_dir(scope);
        match component_type {
            ComponentType::Prompt => base.join("command"),
            ComponentType::Agent => base.join("agent"),
            ComponentType::Mcp => self.config_path(scope),
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
        let config = self.config_path(ctx.scope);
        match mcp::merge_mcp_json(&config, "mcp", &desired) {
            Ok(outcome) => apply_mcp_outcome(outcome, &config, &mut result),
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
    fn test_agent_and_prompt_dirs() {
        let fx = fixture();
        fx.add_file(ComponentType::Prompt, "fix", "# Fix\n");
        fx.add_file(ComponentType::Agent, "researcher", "# Researcher\n");

        let adapter = OpencodeAdapter::new(&fx.home);
        let scope = SyncScope::Global;
        let ctx = fx.ctx(&scope);
        let lists = TypeLists {
            prompts: vec!["fix".to_string()],
            agents: vec!["researcher".to_string()],
            ..Default::default()
        };
        let result = adapter.sync(&ctx, &state(lists));
        assert!(result.is_success(), "errors: {:?}", result.errors);

        let base = fx.home.join(".config").join("opencode");
        assert!(base.join("command").join("fix.md").exists());
        assert!(base.join("agent").join("researcher.md").exists());
    }

    #[test]
    fn test_mcp_under_mcp_key() {
        let fx = fixture();
        fx.add_file(ComponentType::Mcp, "dodo", "command: npx\n");

        let adapter = OpencodeAdapter::new(&fx.home);
        let scope = SyncScope::Global;
        let ctx = fx.ctx(&scope);
        let lists = TypeLists {
            mcp: vec!["dodo".to_string()],
            ..Default::default()
        };
        let result = adapter.sync(&ctx, &state(lists));
        assert!(result.is_success());

        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(
                fx.home.join(".config").join("opencode").join("opencode.json"),
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(config["mcp"]["dodo"]["command"], "npx");
    }

    #[test]
    fn test_user_config_keys_preserved() {
        let fx = fixture();
        fx.add_file(ComponentType::Mcp, "dodo", "command: npx\n");
        let base = fx.home.join(".config").join("opencode");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(
            base.join("opencode.json"),
            r#"{"theme": "tokyonight", "mcp": {"mine": {"command": "/bin/mine"}}}"#,
        )
        .unwrap();

        let adapter = OpencodeAdapter::new(&fx.home);
        let scope = SyncScope::Global;
        let ctx = fx.ctx(&scope);
        let lists = TypeLists {
            mcp: vec!["dodo".to_string()],
            ..Default::default()
        };
        let result = adapter.sync(&ctx, &state(lists));
        assert!(result.is_success());

        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(base.join("opencode.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(config["theme"], "tokyonight");
        assert_eq!(config["mcp"]["mine"]["command"], "/bin/mine");
        assert_eq!(config["mcp"]["dodo"]["command"], "npx");
    }
}
