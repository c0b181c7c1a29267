use std::path::{Path, PathBuf};

use hawk_core::ComponentType;
use hawk_hooks::HookEvent;

use super::*;
use crate::adapter::{EventSupport, SyncContext, SyncScope, ToolAdapter};
use crate::adapters::ClaudeAdapter;
use crate::result::{Artifact, ArtifactKind, Skip, SkipReason};
use crate::testutil::fixture;

fn write_global_config(config_root: &Path, yaml: &str) {
    std::fs::create_dir_all(config_root).unwrap();
    std::fs::write(config_root.join("config.yaml"), yaml).unwrap();
}

/// Minimal adapter with a switchable capability, for cache-behavior
/// tests. Links each enabled pre_tool_use hook as a file under
/// `~/.harness/hooks/` when capable, skips it otherwise.
struct HarnessAdapter {
    home: PathBuf,
    pre_tool: bool,
}

impl ToolAdapter for HarnessAdapter {
    fn tool_id(&self) -> &'static str {
        "harness"
    }
    fn display_name(&self) -> &'static str {
        "Harness"
    }
    fn global_dir(&self) -> PathBuf {
        self.home.join(".harness")
    }
    fn project_marker(&self) -> &'static str {
        ".harness"
    }
    fn supports(&self, component_type: ComponentType) -> bool {
        component_type == ComponentType::Hook
    }
    fn event_support(&self, event: HookEvent) -> EventSupport {
        if event == HookEvent::PreToolUse && self.pre_tool {
            EventSupport::Bridged
        } else {
            EventSupport::Unsupported
        }
    }
    fn destination(&self, _: ComponentType, _: &SyncScope) -> PathBuf {
        self.global_dir().join("hooks")
    }
    fn sync(&self, ctx: &SyncContext, state: &hawk_config::ResolvedState) -> SyncResult {
        let mut result = SyncResult::default();
        let dest = self.global_dir().join("hooks");
        for name in state.get(ComponentType::Hook) {
            let meta =
                hawk_hooks::parse(&ctx.registry.payload_path(ComponentType::Hook, name));
            for event in meta.events {
                if self.event_support(event).is_supported() {
                    std::fs::create_dir_all(&dest).unwrap();
                    let path = dest.join(name);
                    std::fs::write(&path, "registered").unwrap();
                    result
                        .linked
                        .push(Artifact::new(ArtifactKind::HookEntry, name.clone(), path));
                } else {
                    result.skipped.push(Skip {
                        name: name.clone(),
                        reason: SkipReason::UnsupportedEvent(event),
                    });
                }
            }
        }
        result
    }
}

#[test]
fn test_global_sync_end_to_end() {
    // S1 through the engine: runners materialize, settings carry two
    // managed entries, the cache advances.
    let fx = fixture();
    fx.add_hook("notify.py", "# hawk-hook: events=stop,notification\n");
    write_global_config(&fx.config_root, "global:\n  hooks: [notify.py]\n");

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();

    match &statuses["claude"] {
        TargetStatus::Synced(result) => assert!(result.is_success()),
        other => panic!("expected Synced, got {other:?}"),
    }
    let runners = fx.config_root.join("runners");
    assert!(runners.join("stop.sh").is_file());
    assert!(runners.join("notification.sh").is_file());

    let settings: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(fx.home.join(".claude").join("settings.json")).unwrap(),
    )
    .unwrap();
    assert!(settings["hooks"].get("Stop").is_some());
    assert!(settings["hooks"].get("Notification").is_some());
}

#[test]
fn test_second_sync_hits_cache_and_is_idempotent() {
    let fx = fixture();
    fx.add_hook("notify.py", "# hawk-hook: events=stop\n");
    write_global_config(&fx.config_root, "global:\n  hooks: [notify.py]\n");

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    engine.sync_global(None, SyncOptions::default()).unwrap();
    let settings_path = fx.home.join(".claude").join("settings.json");
    let settings_before = std::fs::read_to_string(&settings_path).unwrap();
    let runner_before =
        std::fs::read_to_string(fx.config_root.join("runners").join("stop.sh")).unwrap();

    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::UpToDate));
    assert_eq!(
        std::fs::read_to_string(&settings_path).unwrap(),
        settings_before
    );
    assert_eq!(
        std::fs::read_to_string(fx.config_root.join("runners").join("stop.sh")).unwrap(),
        runner_before
    );
}

#[test]
fn test_force_resyncs_fresh_target() {
    let fx = fixture();
    fx.add_hook("notify.py", "# hawk-hook: events=stop\n");
    write_global_config(&fx.config_root, "global:\n  hooks: [notify.py]\n");

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    engine.sync_global(None, SyncOptions::default()).unwrap();

    let statuses = engine
        .sync_global(
            None,
            SyncOptions {
                force: true,
                dry_run: false,
            },
        )
        .unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::Synced(_)));
}

#[test]
fn test_content_change_invalidates_cache() {
    // Same names, new bytes — a re-download must re-sync.
    let fx = fixture();
    fx.add_hook("notify.py", "# hawk-hook: events=stop\nprint(1)\n");
    write_global_config(&fx.config_root, "global:\n  hooks: [notify.py]\n");

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    engine.sync_global(None, SyncOptions::default()).unwrap();

    fx.add_hook("notify.py", "# hawk-hook: events=stop\nprint(2)\n");
    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::Synced(_)));
}

#[test]
fn test_capability_upgrade_reattempts_skipped() {
    // S2: a pre-tool hook is skipped, the cache advances; after a
    // capability bump alone — no config change — the same target is
    // stale and the hook links.
    let fx = fixture();
    fx.add_hook("guard.py", "# hawk-hook: events=pre_tool_use\n");
    write_global_config(&fx.config_root, "global:\n  hooks: [guard.py]\n");

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(HarnessAdapter {
            home: fx.home.clone(),
            pre_tool: false,
        })],
    );
    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();
    match &statuses["harness"] {
        TargetStatus::Synced(result) => {
            assert!(result.is_success());
            assert_eq!(result.skipped.len(), 1);
            assert!(result.linked.is_empty());
        }
        other => panic!("expected Synced, got {other:?}"),
    }
    // Skipped-only run advanced the cache.
    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();
    assert!(matches!(statuses["harness"], TargetStatus::UpToDate));

    // Capability bump: new engine, upgraded adapter, same config.
    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(HarnessAdapter {
            home: fx.home.clone(),
            pre_tool: true,
        })],
    );
    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();
    match &statuses["harness"] {
        TargetStatus::Synced(result) => {
            assert_eq!(result.linked.len(), 1);
            assert!(result.skipped.is_empty());
        }
        other => panic!("expected Synced after capability bump, got {other:?}"),
    }
    assert!(fx.home.join(".harness").join("hooks").join("guard.py").exists());
}

#[test]
fn test_disabled_tool_not_synced() {
    let fx = fixture();
    write_global_config(
        &fx.config_root,
        "global:\n  hooks: []\ntools:\n  claude:\n    enabled: false\n",
    );

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::Disabled));
    assert!(!fx.home.join(".claude").exists());
}

#[test]
fn test_dry_run_reports_without_writing() {
    let fx = fixture();
    fx.add_hook("notify.py", "# hawk-hook: events=stop\n");
    write_global_config(&fx.config_root, "global:\n  hooks: [notify.py]\n");

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    let statuses = engine
        .sync_global(
            None,
            SyncOptions {
                force: false,
                dry_run: true,
            },
        )
        .unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::WouldSync));
    assert!(!fx.config_root.join("runners").exists());
    assert!(!fx.home.join(".claude").exists());

    // Still stale afterwards: dry run must not advance the cache.
    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::Synced(_)));
}

#[test]
fn test_errors_freeze_cache() {
    let fx = fixture();
    // Enabled prompt that does not exist in the registry.
    write_global_config(&fx.config_root, "global:\n  prompts: [ghost]\n");

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();
    assert!(statuses["claude"].is_failure());

    // No cache advance: the next run attempts again instead of
    // reporting UpToDate.
    let statuses = engine.sync_global(None, SyncOptions::default()).unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::Synced(_)));
}

#[test]
fn test_unknown_tool_filter_is_error() {
    let fx = fixture();
    write_global_config(&fx.config_root, "{}");
    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    let err = engine
        .sync_global(Some("emacs"), SyncOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("emacs"));
}

#[test]
fn test_tool_filter_limits_targets() {
    let fx = fixture();
    write_global_config(&fx.config_root, "{}");
    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![
            Box::new(ClaudeAdapter::new(&fx.home)),
            Box::new(HarnessAdapter {
                home: fx.home.clone(),
                pre_tool: false,
            }),
        ],
    );
    let statuses = engine
        .sync_global(Some("harness"), SyncOptions::default())
        .unwrap();
    assert_eq!(statuses.len(), 1);
    assert!(statuses.contains_key("harness"));
}

#[test]
fn test_project_scope_sync() {
    let fx = fixture();
    fx.add_file(ComponentType::Prompt, "review", "# Review\n");
    write_global_config(&fx.config_root, "{}");

    let project = fx.root.path().join("proj");
    let scope_dir = project.join(".hawk");
    std::fs::create_dir_all(&scope_dir).unwrap();
    std::fs::write(scope_dir.join("config.yaml"), "global:\n  prompts: [review]\n").unwrap();

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    let statuses = engine
        .sync(&project, None, SyncOptions::default())
        .unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::Synced(_)));

    // Artifacts and cache land under the project, not the home dir.
    assert!(project.join(".claude").join("commands").join("review.md").exists());
    assert!(scope_dir.join("sync_cache").is_dir());
    assert!(!fx.home.join(".claude").join("commands").exists());

    let statuses = engine.sync(&project, None, SyncOptions::default()).unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::UpToDate));
}

#[test]
fn test_cwd_without_project_scope_syncs_global() {
    let fx = fixture();
    fx.add_file(ComponentType::Prompt, "review", "# Review\n");
    write_global_config(&fx.config_root, "global:\n  prompts: [review]\n");

    let plain = fx.root.path().join("plain");
    std::fs::create_dir_all(&plain).unwrap();

    let engine = SyncEngine::with_adapters(
        &fx.config_root,
        vec![Box::new(ClaudeAdapter::new(&fx.home))],
    );
    let statuses = engine.sync(&plain, None, SyncOptions::default()).unwrap();
    assert!(matches!(statuses["claude"], TargetStatus::Synced(_)));
    assert!(fx.home.join(".claude").join("commands").join("review.md").exists());
}
