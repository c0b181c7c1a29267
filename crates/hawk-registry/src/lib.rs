//! Content-addressed component registry and package lifecycle.

pub mod git;
pub mod index;
pub mod registry;
pub mod scan;
pub mod update;

pub use index::{PackageEntry, PackageIndex, PackageItem, SourceKind, package_name_from_url};
pub use registry::Registry;
pub use scan::{ScannedItem, scan_tree};
pub use update::{InstallReport, UpdateOptions, UpdateReport, install_local, update_package};
