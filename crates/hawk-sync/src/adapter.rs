//! The tool adapter protocol and shared projection helpers.
//!
//! An adapter owns everything tool-specific: where artifacts land, which
//! component types and hook events the tool understands, and how MCP
//! servers map into its native config. The engine stays
//! capability-agnostic; adapters convert unsupported features into
//! `skipped` diagnostics instead of errors.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde_json::Value;

use hawk_config::ResolvedState;
use hawk_core::{ComponentType, hash_str};
use hawk_hooks::{HookEvent, RunnerOptions};
use hawk_registry::Registry;

use crate::linkfs::{self, LinkConflict};
use crate::mcp::{McpMergeOutcome, McpServerDef};
use crate::result::{Artifact, ArtifactKind, Skip, SkipReason, SyncError, SyncResult};

/// How a tool supports one hook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSupport {
    /// The tool has a native notion of this event.
    Native,
    /// Mapped onto a related native mechanism.
    Bridged,
    Unsupported,
}

impl EventSupport {
    pub fn is_supported(&self) -> bool {
        !matches!(self, EventSupport::Unsupported)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventSupport::Native => "native",
            EventSupport::Bridged => "bridged",
            EventSupport::Unsupported => "unsupported",
        }
    }
}

/// Which scope a sync target belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncScope {
    Global,
    Project(PathBuf),
}

impl SyncScope {
    pub fn is_global(&self) -> bool {
        matches!(self, SyncScope::Global)
    }

    /// The path identifying this scope in cache keys.
    pub fn identity_path<'a>(&'a self, config_root: &'a Path) -> &'a Path {
        match self {
            SyncScope::Global => config_root,
            SyncScope::Project(dir) => dir,
        }
    }

    /// Where generated runners live for this scope.
    pub fn runners_dir(&self, config_root: &Path) -> PathBuf {
        match self {
            SyncScope::Global => hawk_config::paths::global_runners_dir(config_root),
            SyncScope::Project(dir) => hawk_config::paths::scope_runners_dir(dir),
        }
    }

    /// Where the sync cache lives for this scope.
    pub fn cache_dir(&self, config_root: &Path) -> PathBuf {
        match self {
            SyncScope::Global => hawk_config::paths::global_sync_cache_dir(config_root),
            SyncScope::Project(dir) => hawk_config::paths::scope_sync_cache_dir(dir),
        }
    }
}

/// Everything an adapter needs for one sync pass.
pub struct SyncContext<'a> {
    pub config_root: &'a Path,
    pub scope: &'a SyncScope,
    pub registry: &'a Registry,
}

impl SyncContext<'_> {
    pub fn runners_dir(&self) -> PathBuf {
        self.scope.runners_dir(self.config_root)
    }
}

/// A host tool integration.
pub trait ToolAdapter {
    fn tool_id(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    /// The tool's global configuration directory (e.g. `~/.claude`).
    fn global_dir(&self) -> PathBuf;
    /// Directory name anchoring a project scope (e.g. `.claude`).
    fn project_marker(&self) -> &'static str;

    fn supports(&self, component_type: ComponentType) -> bool;
    fn event_support(&self, event: HookEvent) -> EventSupport;

    /// Whether generated runners should export the hooks' declared env
    /// defaults.
    fn wants_env_injection(&self) -> bool {
        false
    }

    /// Opaque token covering the support matrix. Must change whenever
    /// the adapter becomes able to emit a previously skipped artifact,
    /// so cached targets are re-attempted.
    fn capability_fingerprint(&self) -> String {
        let mut desc = format!("{};", self.tool_id());
        for component_type in hawk_core::types::ALL_TYPES {
            desc.push_str(&format!(
                "{}={};",
                component_type,
                self.supports(component_type)
            ));
        }
        for event in hawk_hooks::ALL_EVENTS {
            desc.push_str(&format!("{}={};", event, self.event_support(event).label()));
        }
        hash_str(&desc)[..16].to_string()
    }

    /// Where artifacts of one component type land for a scope.
    fn destination(&self, component_type: ComponentType, scope: &SyncScope) -> PathBuf;

    /// Project the resolved state into the tool's on-disk config.
    fn sync(&self, ctx: &SyncContext, state: &ResolvedState) -> SyncResult;

    /// Generate runners and wire them into the tool's settings.
    /// Returns the hooks that got at least one event registered.
    ///
    /// The default implementation is for tools without hook support: it
    /// only emits capability skips.
    fn register_hooks(
        &self,
        ctx: &SyncContext,
        hook_names: &[String],
        result: &mut SyncResult,
    ) -> Vec<String> {
        let hooks_dir = ctx.registry.type_dir(ComponentType::Hook);
        let buckets = hawk_hooks::group_by_event(hook_names, &hooks_dir);
        skip_unsupported_events(self, &buckets, result);
        Vec::new()
    }
}

/// Emit an `UnsupportedEvent` skip for every (hook, event) pair the tool
/// cannot honor.
pub fn skip_unsupported_events<A: ToolAdapter + ?Sized>(
    adapter: &A,
    buckets: &BTreeMap<HookEvent, Vec<String>>,
    result: &mut SyncResult,
) {
    for (event, names) in buckets {
        if adapter.event_support(*event).is_supported() {
            continue;
        }
        for name in names {
            result.skipped.push(Skip {
                name: name.clone(),
                reason: SkipReason::UnsupportedEvent(*event),
            });
        }
    }
}

/// Symlink every enabled component of one type into the adapter's
/// destination, then prune stale managed links.
pub fn sync_symlinks<A: ToolAdapter + ?Sized>(
    adapter: &A,
    ctx: &SyncContext,
    state: &ResolvedState,
    component_type: ComponentType,
    result: &mut SyncResult,
) {
    let names = state.get(component_type);
    if !adapter.supports(component_type) {
        for name in names {
            result.skipped.push(Skip {
                name: name.clone(),
                reason: SkipReason::UnsupportedType(component_type),
            });
        }
        return;
    }

    let dest = adapter.destination(component_type, ctx.scope);
    let managed_root = ctx.registry.type_dir(component_type);
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
        let payload = ctx.registry.payload_path(component_type, name);
        if !payload.exists() {
            result.errors.push(SyncError::missing(component_type, name));
            continue;
        }
        let file_name = component_type.payload_file_name(name);
        let link = dest.join(&file_name);
        keep.insert(file_name);

        match linkfs::ensure_symlink(&payload, &link, &managed_root) {
            Ok(_) => result
                .linked
                .push(Artifact::new(ArtifactKind::Symlink, name.clone(), link)),
            Err(LinkConflict::NotASymlink(path)) => {
                result.errors.push(SyncError::not_a_symlink(path));
            }
            Err(LinkConflict::Foreign { path, .. }) => {
                result.errors.push(SyncError::conflict(name.clone(), path));
            }
            Err(LinkConflict::Io(message)) => result.errors.push(SyncError::io(message)),
        }
    }

    // Stale cleanup failures are errors, not skips.
    match linkfs::prune_managed_links(&dest, &managed_root, &keep) {
        Ok(removed) => {
            for path in removed {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                result
                    .unlinked
                    .push(Artifact::new(ArtifactKind::Symlink, name, path));
            }
        }
        Err(err) => result.errors.push(SyncError::io(format!("{err:#}"))),
    }
}

/// Load the enabled MCP definitions and project them to the common JSON
/// object shape. Missing or unparsable definitions become errors.
pub fn desired_mcp_values(
    ctx: &SyncContext,
    state: &ResolvedState,
    result: &mut SyncResult,
) -> BTreeMap<String, Value> {
    let mut desired = BTreeMap::new();
    for name in state.get(ComponentType::Mcp) {
        let payload = ctx.registry.payload_path(ComponentType::Mcp, name);
        if !payload.exists() {
            result
                .errors
                .push(SyncError::missing(ComponentType::Mcp, name));
            continue;
        }
        match McpServerDef::load(&payload) {
            Ok(def) => {
                desired.insert(name.clone(), def.to_json());
            }
            Err(err) => result.errors.push(SyncError::io(format!("{err:#}"))),
        }
    }
    desired
}

/// Fold a merge outcome into the sync result.
pub fn apply_mcp_outcome(outcome: McpMergeOutcome, config_path: &Path, result: &mut SyncResult) {
    for name in outcome.written {
        result
            .linked
            .push(Artifact::new(ArtifactKind::McpEntry, name, config_path));
    }
    for name in outcome.removed {
        result
            .unlinked
            .push(Artifact::new(ArtifactKind::McpEntry, name, config_path));
    }
    for name in outcome.conflicts {
        result.errors.push(SyncError::conflict(name, config_path));
    }
}

/// Generate the scope's per-event runners from the effective hook list
/// and fold the outcome into the result. Returns the event buckets.
pub fn sync_runners<A: ToolAdapter + ?Sized>(
    adapter: &A,
    ctx: &SyncContext,
    hook_names: &[String],
    result: &mut SyncResult,
) -> BTreeMap<HookEvent, Vec<String>> {
    let hooks_dir = ctx.registry.type_dir(ComponentType::Hook);
    let buckets = hawk_hooks::group_by_event(hook_names, &hooks_dir);

    let mut options = RunnerOptions::default();
    if adapter.wants_env_injection() {
        for name in hook_names {
            let meta = hawk_hooks::parse(&hooks_dir.join(name));
            options.env.extend(meta.env_pairs());
        }
    }

    match hawk_hooks::generate_runners(hook_names, &hooks_dir, &ctx.runners_dir(), &options) {
        Ok(generated) => {
            for (event, path) in generated.written {
                result
                    .linked
                    .push(Artifact::new(ArtifactKind::Runner, event.as_str(), path));
            }
            for path in generated.removed {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                result
                    .unlinked
                    .push(Artifact::new(ArtifactKind::Runner, name, path));
            }
        }
        Err(err) => result.errors.push(SyncError::io(format!("{err:#}"))),
    }

    buckets
}

/// Largest advisory timeout declared by the hooks of one event, if any.
pub fn event_timeout(
    event_hooks: &[String],
    hooks_dir: &Path,
) -> Option<u64> {
    event_hooks
        .iter()
        .filter_map(|name| hawk_hooks::parse(&hooks_dir.join(name)).timeout)
        .max()
}
