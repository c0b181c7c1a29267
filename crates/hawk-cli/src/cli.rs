use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// hawk — multi-tool AI-assistant component manager.
#[derive(Parser)]
#[command(name = "hawk", version, about)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config directory with a commented starter config
    Init {
        /// Overwrite an existing config.yaml
        #[arg(long)]
        force: bool,
    },

    /// Add a component to the registry
    Add {
        /// Component type: skill, hook, prompt, agent, mcp
        #[arg(value_name = "TYPE")]
        component_type: String,

        /// Source file or directory
        path: PathBuf,

        /// Component name (defaults to the source file name)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing component
        #[arg(long)]
        replace: bool,
    },

    /// Remove a component from the registry
    Remove {
        #[arg(value_name = "TYPE")]
        component_type: String,
        name: String,
    },

    /// List registry components
    List {
        /// Restrict to one component type
        #[arg(value_name = "TYPE")]
        component_type: Option<String>,
    },

    /// Synchronize resolved configuration into host tools
    Sync {
        /// Sync a single tool
        #[arg(long)]
        tool: Option<String>,

        /// Ignore the sync cache
        #[arg(long)]
        force: bool,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Sync the global scope instead of the current directory's
        #[arg(long)]
        global: bool,
    },

    /// Install a package from a git URL
    Download {
        url: String,

        /// Package name (defaults to the last URL segment)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite clashing components
        #[arg(long)]
        replace: bool,
    },

    /// Install a package by scanning a local directory
    Scan {
        dir: PathBuf,

        /// Package name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite clashing components
        #[arg(long)]
        replace: bool,
    },

    /// Update packages against their upstream sources
    Update {
        /// Package to update (all when omitted)
        package: Option<String>,

        /// Remove items that disappeared upstream
        #[arg(long)]
        prune: bool,

        /// Re-apply even when upstream is unchanged
        #[arg(long)]
        force: bool,
    },

    /// Manage installed packages
    Package {
        #[command(subcommand)]
        cmd: PackageCommands,
    },

    /// Manage registered directories
    Project {
        #[command(subcommand)]
        cmd: ProjectCommands,
    },

    /// Show registry, package and scope overview
    Status,
}

#[derive(Subcommand)]
pub enum PackageCommands {
    /// List installed packages
    List,

    /// Remove a package and its components
    Remove {
        name: String,

        /// Keep the components in the registry (drop only the package
        /// entry)
        #[arg(long)]
        keep_items: bool,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Register a directory as a scope anchor
    Register {
        /// Directory (defaults to the current directory)
        dir: Option<PathBuf>,
    },

    /// Unregister a directory
    Unregister {
        dir: Option<PathBuf>,
    },

    /// List registered directories
    List,
}
