//! Shared types for the hawk component manager.

pub mod error;
pub mod hash;
pub mod types;

pub use error::HawkError;
pub use hash::{content_hash, hash_str, short_hash};
pub use types::{ComponentType, OutputFormat, validate_name};
