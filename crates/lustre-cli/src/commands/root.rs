//! Root command - print the Lustre mount root containing a path.
//!
//! # Examples
//!
//! ```bash
//! lroot root /lustre/scratch/project/run1
//! lroot root --json .
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use super::Context;
use crate::output::print_json;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Path to inspect
    pub path: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RootInfo {
    path: String,
    root: String,
}

#[instrument(level = "info", name = "cmd::root", skip_all, fields(path = %args.path.display()))]
pub fn execute(ctx: &Context, args: &Args) -> Result<()> {
    let root = ctx.walker().mount_root(&args.path)?;

    if args.json {
        print_json(&RootInfo {
            path: args.path.display().to_string(),
            root: root.to_string(),
        })
    } else {
        println!("{root}");
        Ok(())
    }
}
