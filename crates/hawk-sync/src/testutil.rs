//! Shared fixtures for adapter and engine tests.

use std::path::PathBuf;

use tempfile::tempdir;

use hawk_config::{ResolvedState, TypeLists};
use hawk_core::ComponentType;
use hawk_registry::Registry;

use crate::adapter::{SyncContext, SyncScope};

pub(crate) struct Fixture {
    pub root: tempfile::TempDir,
    pub config_root: PathBuf,
    pub home: PathBuf,
    pub registry: Registry,
}

pub(crate) fn fixture() -> Fixture {
    let root = tempdir().unwrap();
    let config_root = root.path().join("hawk");
    let home = root.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    let registry = Registry::new(config_root.join("registry"));
    Fixture {
        config_root,
        home,
        registry,
        root,
    }
}

impl Fixture {
    pub fn add_hook(&self, name: &str, content: &str) {
        self.add_file(ComponentType::Hook, name, content);
    }

    pub fn add_file(&self, component_type: ComponentType, name: &str, content: &str) {
        let dir = self.root.path().join("stage");
        std::fs::create_dir_all(&dir).unwrap();
        let src = dir.join("payload");
        std::fs::write(&src, content).unwrap();
        self.registry.add(component_type, name, &src, true).unwrap();
    }

    pub fn add_dir(&self, component_type: ComponentType, name: &str, files: &[(&str, &str)]) {
        let dir = self.root.path().join("stage-dir");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        for (rel, content) in files {
            let path = dir.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        self.registry.add(component_type, name, &dir, true).unwrap();
    }

    pub fn ctx<'a>(&'a self, scope: &'a SyncScope) -> SyncContext<'a> {
        SyncContext {
            config_root: &self.config_root,
            scope,
            registry: &self.registry,
        }
    }
}

pub(crate) fn state(lists: TypeLists) -> ResolvedState {
    ResolvedState::from_lists(true, lists)
}
