//! Sync engine: projects resolved configuration into each host tool's
//! native on-disk format.

pub mod adapter;
pub mod adapters;
pub mod cache;
pub mod engine;
pub mod linkfs;
pub mod mcp;
pub mod result;

#[cfg(test)]
pub(crate) mod testutil;

pub use adapter::{EventSupport, SyncContext, SyncScope, ToolAdapter};
pub use cache::{CacheEntry, SyncCache};
pub use engine::{SyncEngine, SyncOptions, TargetStatus};
pub use result::{Artifact, ArtifactKind, Skip, SkipReason, SyncError, SyncErrorKind, SyncResult};
