//! Relpath command - split a path into its Lustre mount root and the rest.
//!
//! # Examples
//!
//! ```bash
//! # Prints "/lustre/scratch<TAB>project/run1"
//! lroot relpath /lustre/scratch/project/run1
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
struct RelPathInfo {
    root: String,
    relative: String,
}

#[instrument(level = "info", name = "cmd::relpath", skip_all, fields(path = %args.path.display()))]
pub fn execute(ctx: &Context, args: &Args) -> Result<()> {
    let (root, rel) = ctx.walker().mount_rel_path(&args.path)?;

    if args.json {
        print_json(&RelPathInfo {
            root: root.to_string(),
            relative: rel.display().to_string(),
        })
    } else {
        println!("{root}\t{}", rel.display());
        Ok(())
    }
}
