//! Capability-aware sync cache.
//!
//! One YAML file per `(scope, tool)` target under the scope's
//! `sync_cache/` directory. A target is in sync iff both the desired
//! hash and the adapter's capability fingerprint match the recomputed
//! values — including the fingerprint means a tool gaining a capability
//! invalidates targets that previously skipped features.
//!
//! The key hashes the scope path string; it is never character-replaced,
//! so `/proj/a` and `\proj\a` produce distinct keys.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hawk_core::hash_str;

/// Stored per-target state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub desired_hash: String,
    pub capability_fingerprint: String,
}

/// Cache directory handle for one scope.
#[derive(Debug, Clone)]
pub struct SyncCache {
    dir: PathBuf,
}

impl SyncCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache key for a `(scope path, tool)` target.
    pub fn key(scope_path: &Path, tool_id: &str) -> String {
        let hashed = hash_str(&scope_path.to_string_lossy());
        format!("{}-{tool_id}", &hashed[..16])
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.yaml"))
    }

    /// Read a target's entry; absent or unreadable entries read as a
    /// miss.
    pub fn read(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let content = std::fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&content).ok()
    }

    /// Write a target's entry atomically.
    pub fn write(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let content = serde_yaml::to_string(entry).context("failed to serialize cache entry")?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".cache-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .with_context(|| format!("failed to stage cache entry in {}", self.dir.display()))?;
        tmp.write_all(content.as_bytes())
            .context("failed to write cache entry")?;
        let path = self.entry_path(key);
        tmp.persist(&path)
            .with_context(|| format!("failed to install {}", path.display()))?;
        Ok(())
    }

    /// True when the stored entry matches both recomputed values.
    pub fn is_fresh(&self, key: &str, entry: &CacheEntry) -> bool {
        self.read(key).as_ref() == Some(entry)
    }
}
