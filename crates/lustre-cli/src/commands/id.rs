//! Id command - print the filesystem id of the Lustre filesystem holding a path.

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
struct IdInfo {
    id: String,
}

#[instrument(level = "info", name = "cmd::id", skip_all, fields(path = %args.path.display()))]
pub fn execute(ctx: &Context, args: &Args) -> Result<()> {
    let id = ctx.walker().fs_id(&args.path)?;

    if args.json {
        print_json(&IdInfo { id: id.to_string() })
    } else {
        println!("{id}");
        Ok(())
    }
}
