//! Configuration layers, scope chain construction and effective-state
//! resolution.

pub mod layer;
pub mod paths;
pub mod projects;
pub mod resolver;

pub use layer::{ConfigLayer, ListOverride, Profile, ToolOverrides, TypeLists};
pub use paths::{APP_NAME, ENV_HOME, config_root, scope_dir};
pub use projects::ProjectsIndex;
pub use resolver::{ResolvedState, build_chain, resolve, resolve_global};
