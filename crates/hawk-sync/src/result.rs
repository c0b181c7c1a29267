//! Typed sync diagnostics.
//!
//! A sync outcome is four buckets. `skipped` is a capability diagnostic
//! and non-fatal: a run whose only non-linked outcomes are skips is
//! successful and advances the cache. `errors` are operational or
//! ownership failures and freeze the cache for that target.

use std::fmt;
use std::path::PathBuf;

use hawk_core::ComponentType;
use hawk_hooks::HookEvent;

/// What kind of on-disk artifact an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Symlink into the registry.
    Symlink,
    /// Generated per-event runner script.
    Runner,
    /// Hook entry in a tool settings file.
    HookEntry,
    /// MCP server record in a tool config file.
    McpEntry,
    /// Projected file (e.g. a TOML command file).
    Projection,
}

/// An artifact that was materialized or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub name: String,
    pub path: PathBuf,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Why an item was declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The tool does not support this component type at all.
    UnsupportedType(ComponentType),
    /// The tool does not support this hook event.
    UnsupportedEvent(HookEvent),
}

/// A non-fatal capability skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub name: String,
    pub reason: SkipReason,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::UnsupportedType(component_type) => {
                write!(f, "{} '{}': type not supported", component_type, self.name)
            }
            SkipReason::UnsupportedEvent(event) => {
                write!(f, "hook '{}': event '{event}' not supported", self.name)
            }
        }
    }
}

/// What went wrong for a single artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncErrorKind {
    /// A resolved component has no payload in the registry.
    MissingComponent {
        component_type: ComponentType,
        name: String,
    },
    /// A user-authored entry collides with a would-be managed key.
    OwnershipConflict { key: String, path: PathBuf },
    /// Destination exists and is a regular file or directory, not a
    /// managed symlink.
    NotASymlink { path: PathBuf },
    /// I/O or serialization failure.
    Io(String),
}

/// One operational failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncError {
    pub kind: SyncErrorKind,
}

impl SyncError {
    pub fn missing(component_type: ComponentType, name: impl Into<String>) -> Self {
        Self {
            kind: SyncErrorKind::MissingComponent {
                component_type,
                name: name.into(),
            },
        }
    }

    pub fn conflict(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            kind: SyncErrorKind::OwnershipConflict {
                key: key.into(),
                path: path.into(),
            },
        }
    }

    pub fn not_a_symlink(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: SyncErrorKind::NotASymlink { path: path.into() },
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: SyncErrorKind::Io(message.into()),
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SyncErrorKind::MissingComponent {
                component_type,
                name,
            } => write!(f, "{component_type} '{name}' not found in registry"),
            SyncErrorKind::OwnershipConflict { key, path } => write!(
                f,
                "user-authored entry '{key}' in {} collides with a managed entry; \
                 rename or remove it",
                path.display()
            ),
            SyncErrorKind::NotASymlink { path } => write!(
                f,
                "{} exists and is not a managed symlink; remove it manually",
                path.display()
            ),
            SyncErrorKind::Io(message) => f.write_str(message),
        }
    }
}

/// Aggregated outcome for one `(scope, tool)` target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub linked: Vec<Artifact>,
    pub unlinked: Vec<Artifact>,
    pub skipped: Vec<Skip>,
    pub errors: Vec<SyncError>,
}

impl SyncResult {
    /// Skipped-only runs are successful; only errors fail a target.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_noop(&self) -> bool {
        self.linked.is_empty()
            && self.unlinked.is_empty()
            && self.skipped.is_empty()
            && self.errors.is_empty()
    }

    pub fn merge(&mut self, other: SyncResult) {
        self.linked.extend(other.linked);
        self.unlinked.extend(other.unlinked);
        self.skipped.extend(other.skipped);
        self.errors.extend(other.errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_only_is_success() {
        let mut result = SyncResult::default();
        result.skipped.push(Skip {
            name: "guard.py".to_string(),
            reason: SkipReason::UnsupportedEvent(HookEvent::PreToolUse),
        });
        assert!(result.is_success());
        assert!(!result.is_noop());
    }

    #[test]
    fn test_errors_fail_target() {
        let mut result = SyncResult::default();
        result.errors.push(SyncError::io("disk full"));
        assert!(!result.is_success());
    }

    #[test]
    fn test_merge_accumulates() {
        let mut a = SyncResult::default();
        a.linked.push(Artifact::new(ArtifactKind::Symlink, "s", "/x"));
        let mut b = SyncResult::default();
        b.errors.push(SyncError::missing(ComponentType::Mcp, "dodo"));

        a.merge(b);
        assert_eq!(a.linked.len(), 1);
        assert_eq!(a.errors.len(), 1);
        assert!(!a.is_success());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::conflict("dodo", "/home/u/.claude.json");
        let msg = err.to_string();
        assert!(msg.contains("dodo"));
        assert!(msg.contains(".claude.json"));

        let err = SyncError::missing(ComponentType::Skill, "review");
        assert_eq!(err.to_string(), "skill 'review' not found in registry");
    }

    #[test]
    fn test_skip_display() {
        let skip = Skip {
            name: "pre.py".to_string(),
            reason: SkipReason::UnsupportedEvent(HookEvent::PreToolUse),
        };
        assert!(skip.to_string().contains("pre_tool_use"));
    }
}
