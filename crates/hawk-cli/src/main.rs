use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod cli;
mod component_cmds;
mod init_cmd;
mod package_cmds;
mod project_cmds;
mod status_cmd;
mod sync_cmd;

use cli::{Cli, Commands, PackageCommands, ProjectCommands};
use hawk_core::HawkError;

/// CLI exit codes: 0 success, 1 general failure, 2 validation error.
const EXIT_FAILURE: u8 = 1;
const EXIT_VALIDATION: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(classify(&err))
        }
    }
}

/// Validation errors exit 2; everything else exits 1.
fn classify(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<HawkError>() {
        Some(
            HawkError::InvalidName(_)
            | HawkError::UnknownComponentType(_)
            | HawkError::UnknownTool(_)
            | HawkError::AlreadyExists { .. }
            | HawkError::SourceTypeConflict { .. }
            | HawkError::ProfileNotFound(_)
            | HawkError::ProfileCycle { .. },
        ) => EXIT_VALIDATION,
        _ => EXIT_FAILURE,
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_root = hawk_config::config_root()?;
    tracing::debug!(root = %config_root.display(), "resolved config root");
    let format = cli.format;

    match cli.command {
        Commands::Init { force } => init_cmd::init(&config_root, force),
        Commands::Add {
            component_type,
            path,
            name,
            replace,
        } => component_cmds::add(&config_root, &component_type, &path, name.as_deref(), replace),
        Commands::Remove {
            component_type,
            name,
        } => component_cmds::remove(&config_root, &component_type, &name),
        Commands::List { component_type } => {
            component_cmds::list(&config_root, component_type.as_deref(), format)
        }
        Commands::Sync {
            tool,
            force,
            dry_run,
            global,
        } => sync_cmd::sync(&config_root, tool.as_deref(), force, dry_run, global, format),
        Commands::Download { url, name, replace } => {
            package_cmds::download(&config_root, &url, name.as_deref(), replace)
        }
        Commands::Scan { dir, name, replace } => {
            package_cmds::scan(&config_root, &dir, name.as_deref(), replace)
        }
        Commands::Update {
            package,
            prune,
            force,
        } => package_cmds::update(&config_root, package.as_deref(), prune, force),
        Commands::Package { cmd } => match cmd {
            PackageCommands::List => package_cmds::list(&config_root, format),
            PackageCommands::Remove { name, keep_items } => {
                package_cmds::remove(&config_root, &name, keep_items)
            }
        },
        Commands::Project { cmd } => match cmd {
            ProjectCommands::Register { dir } => project_cmds::register(&config_root, dir),
            ProjectCommands::Unregister { dir } => project_cmds::unregister(&config_root, dir),
            ProjectCommands::List => project_cmds::list(&config_root, format),
        },
        Commands::Status => status_cmd::status(&config_root, format),
    }
}
