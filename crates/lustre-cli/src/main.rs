#![deny(unsafe_code)]

// Use mimalloc for reduced allocation latency (enabled by default).
#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod config;
mod exit_code;
mod output;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lustre_fs::Llapi;
use lustre_lnet::NidError;

use crate::commands::{Context, fid, id, mdt, mount_id, nid, relpath, root, version};
use crate::config::Config;

/// Locate Lustre mount roots and query Lustre file metadata
#[derive(Parser)]
#[command(name = "lroot")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Which Lustre mount holds this directory?
    lroot root /lustre/scratch/project

    # Split a path into mount root and relative path
    lroot relpath /lustre/scratch/project/run1/output.h5

    # Which MDT owns this file's metadata?
    lroot mdt /lustre/scratch/project/run1/output.h5

EXIT STATUS:
    0 success, 1 error, 2 not on Lustre, 3 path not found,
    4 permission denied, 64 usage error
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Lustre sysfs directory
    #[arg(long, env = "LUSTRE_SYS_ROOT", value_name = "DIR", global = true)]
    sys_root: Option<PathBuf>,

    /// Lustre procfs directory
    #[arg(long, env = "LUSTRE_PROC_ROOT", value_name = "DIR", global = true)]
    proc_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Lustre mount root containing a path
    Root(root::Args),

    /// Print the mount root and the path relative to it
    Relpath(relpath::Args),

    /// Print the filesystem id of the Lustre filesystem holding a path
    Id(id::Args),

    /// Print the FID of a path
    Fid(fid::Args),

    /// Print the index of the MDT owning a file
    Mdt(mdt::Args),

    /// Print the Lustre client version
    Version(version::Args),

    /// Show the Lustre client instance serving a path
    MountId(mount_id::Args),

    /// Parse an LNet network identifier
    Nid(nid::Args),
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(exit_code::USAGE_ERROR)
            } else {
                ExitCode::from(exit_code::SUCCESS)
            };
        }
    };
    let quiet = cli.quiet;

    match run(cli) {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            let code = categorize_error(&e);
            if !quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up tracing based on verbosity (skip if quiet)
    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    let config = Config::load()?;
    let llapi = Llapi::new(config.llapi_config(cli.sys_root, cli.proc_root));
    tracing::debug!(config = ?llapi.config(), "client configuration");
    let ctx = Context::new(llapi);

    match cli.command {
        Commands::Root(args) => root::execute(&ctx, &args),
        Commands::Relpath(args) => relpath::execute(&ctx, &args),
        Commands::Id(args) => id::execute(&ctx, &args),
        Commands::Fid(args) => fid::execute(&ctx, &args),
        Commands::Mdt(args) => mdt::execute(&ctx, &args),
        Commands::Version(args) => version::execute(&ctx, &args),
        Commands::MountId(args) => mount_id::execute(&ctx, &args),
        Commands::Nid(args) => nid::execute(&args),
    }
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

/// Categorize an error into an exit code using typed error downcasting
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(fs_err) = cause.downcast_ref::<lustre_fs::Error>() {
            if matches!(fs_err, lustre_fs::Error::NotLustre(_)) {
                return exit_code::NOT_LUSTRE;
            }
            match fs_err.io_kind() {
                Some(io::ErrorKind::NotFound) => return exit_code::NOT_FOUND,
                Some(io::ErrorKind::PermissionDenied) => return exit_code::PERMISSION_DENIED,
                _ => {}
            }
        }

        if cause.downcast_ref::<NidError>().is_some() {
            return exit_code::USAGE_ERROR;
        }

        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::NotFound => return exit_code::NOT_FOUND,
                io::ErrorKind::PermissionDenied => return exit_code::PERMISSION_DENIED,
                _ => {}
            }
        }
    }

    exit_code::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_not_lustre_exit_code() {
        let err = anyhow::Error::new(lustre_fs::Error::NotLustre(PathBuf::from("/tmp")));
        assert_eq!(categorize_error(&err), exit_code::NOT_LUSTRE);
    }

    #[test]
    fn test_stat_errors_map_by_kind() {
        let missing = anyhow::Error::new(lustre_fs::Error::Stat {
            path: PathBuf::from("/nope"),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert_eq!(categorize_error(&missing), exit_code::NOT_FOUND);

        let denied = anyhow::Error::new(lustre_fs::Error::Stat {
            path: PathBuf::from("/root/x"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        });
        assert_eq!(categorize_error(&denied), exit_code::PERMISSION_DENIED);
    }

    #[test]
    fn test_context_wrapped_io_error() {
        let err = anyhow::Error::new(io::Error::from(io::ErrorKind::PermissionDenied))
            .context("Failed to look up FID");
        assert_eq!(categorize_error(&err), exit_code::PERMISSION_DENIED);
    }

    #[test]
    fn test_other_errors_are_general() {
        let err = anyhow::anyhow!("Lustre client version unavailable");
        assert_eq!(categorize_error(&err), exit_code::GENERAL_ERROR);

        let ioctl = anyhow::Error::new(lustre_fs::Error::Io(io::Error::from_raw_os_error(25)));
        assert_eq!(categorize_error(&ioctl), exit_code::GENERAL_ERROR);
    }
}
