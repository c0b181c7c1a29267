//! The sync engine: per-target staleness, adapter dispatch, cache
//! maintenance.
//!
//! For every enabled adapter the engine resolves the effective state,
//! computes the desired-state hash (component names *and* content
//! hashes — mtime or size would miss re-downloads) and the adapter's
//! capability fingerprint, consults the cache, and only calls
//! `adapter.sync()` for stale targets. The cache advances only when the
//! result carries no errors; skipped-only runs advance it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use sha2::{Digest, Sha256};
use tracing::debug;

use hawk_config::resolver::{ScopeChain, build_chain, build_global_chain, resolve_chain};
use hawk_config::ResolvedState;
use hawk_core::HawkError;
use hawk_registry::Registry;

use crate::adapter::{SyncContext, SyncScope, ToolAdapter};
use crate::adapters::default_adapters;
use crate::cache::{CacheEntry, SyncCache};
use crate::result::SyncResult;

/// Options for a sync pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Ignore the cache and re-apply everything.
    pub force: bool,
    /// Report staleness without touching the filesystem.
    pub dry_run: bool,
}

/// Outcome for one `(scope, tool)` target.
#[derive(Debug)]
pub enum TargetStatus {
    /// Tool disabled in the resolved configuration.
    Disabled,
    /// Cache fast-path: desired state and capabilities unchanged.
    UpToDate,
    /// Dry run: the target is stale and would be synced.
    WouldSync,
    Synced(SyncResult),
}

impl TargetStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, TargetStatus::Synced(result) if !result.is_success())
    }
}

pub struct SyncEngine {
    config_root: PathBuf,
    registry: Registry,
    adapters: Vec<Box<dyn ToolAdapter>>,
}

impl SyncEngine {
    /// Engine with the default adapter set, anchored at the user's home
    /// directory.
    pub fn new(config_root: impl Into<PathBuf>) -> Result<Self> {
        let home = directories::BaseDirs::new()
            .context("cannot determine home directory")?
            .home_dir()
            .to_path_buf();
        Ok(Self::with_adapters(config_root, default_adapters(&home)))
    }

    /// Engine with an explicit adapter set (tests, custom installs).
    pub fn with_adapters(
        config_root: impl Into<PathBuf>,
        adapters: Vec<Box<dyn ToolAdapter>>,
    ) -> Self {
        let config_root = config_root.into();
        let registry = Registry::new(hawk_config::paths::registry_dir(&config_root));
        Self {
            config_root,
            registry,
            adapters,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tool_ids(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.tool_id()).collect()
    }

    /// Sync the scope that applies to `cwd` — the innermost directory
    /// scope when one exists, the global scope otherwise.
    pub fn sync(
        &self,
        cwd: &Path,
        tool_filter: Option<&str>,
        options: SyncOptions,
    ) -> Result<BTreeMap<String, TargetStatus>> {
        let chain = build_chain(&self.config_root, cwd)?;
        let scope = match chain.project_dir() {
            Some(dir) => SyncScope::Project(dir.to_path_buf()),
            None => SyncScope::Global,
        };
        self.sync_chain(&chain, scope, tool_filter, options)
    }

    /// Sync the global scope only.
    pub fn sync_global(
        &self,
        tool_filter: Option<&str>,
        options: SyncOptions,
    ) -> Result<BTreeMap<String, TargetStatus>> {
        let chain = build_global_chain(&self.config_root)?;
        self.sync_chain(&chain, SyncScope::Global, tool_filter, options)
    }

    fn sync_chain(
        &self,
        chain: &ScopeChain,
        scope: SyncScope,
        tool_filter: Option<&str>,
        options: SyncOptions,
    ) -> Result<BTreeMap<String, TargetStatus>> {
        if let Some(filter) = tool_filter {
            if !self.adapters.iter().any(|a| a.tool_id() == filter) {
                bail!(HawkError::UnknownTool(filter.to_string()));
            }
        }

        let cache = SyncCache::new(scope.cache_dir(&self.config_root));
        let mut statuses = BTreeMap::new();

        for adapter in &self.adapters {
            let tool_id = adapter.tool_id();
            if tool_filter.is_some_and(|filter| filter != tool_id) {
                continue;
            }

            let state = resolve_chain(chain, tool_id)?;
            if !state.enabled {
                statuses.insert(tool_id.to_string(), TargetStatus::Disabled);
                continue;
            }

            let entry = CacheEntry {
                desired_hash: self.desired_hash(&state),
                capability_fingerprint: adapter.capability_fingerprint(),
            };
            let key = SyncCache::key(scope.identity_path(&self.config_root), tool_id);

            if !options.force && cache.is_fresh(&key, &entry) {
                debug!(tool = tool_id, "target in sync, skipping");
                statuses.insert(tool_id.to_string(), TargetStatus::UpToDate);
                continue;
            }
            if options.dry_run {
                statuses.insert(tool_id.to_string(), TargetStatus::WouldSync);
                continue;
            }

            let ctx = SyncContext {
                config_root: &self.config_root,
                scope: &scope,
                registry: &self.registry,
            };
            let result = adapter.sync(&ctx, &state);
            if result.is_success() {
                cache.write(&key, &entry)?;
            }
            statuses.insert(tool_id.to_string(), TargetStatus::Synced(result));
        }

        Ok(statuses)
    }

    /// Digest of the resolved component names and their registry content
    /// hashes, in processing order.
    fn desired_hash(&self, state: &ResolvedState) -> String {
        let mut hasher = Sha256::new();
        for (component_type, name) in state.entries() {
            hasher.update(component_type.as_str().as_bytes());
            hasher.update(b"/");
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            match self.registry.get_hash(component_type, name) {
                Ok(hash) => hasher.update(hash.as_bytes()),
                Err(_) => hasher.update(b"absent"),
            }
            hasher.update(b"\n");
        }
        let digest = hasher.finalize();
        let mut out = String::with_capacity(64);
        for byte in digest {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
