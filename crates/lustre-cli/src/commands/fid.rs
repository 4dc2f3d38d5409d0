//! Fid command - print the Lustre file identifier of a path.
//!
//! # Examples
//!
//! ```bash
//! lroot fid /lustre/scratch/project/run1/output.h5
//! # [0x200000401:0x1c:0x0]
//! ```

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use lustre_fs::LustreClient;

use super::Context;
use crate::output::print_json;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Path to inspect (a final symlink is not followed)
    pub path: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct FidInfo {
    path: String,
    fid: String,
    seq: u64,
    oid: u32,
    ver: u32,
}

#[instrument(level = "info", name = "cmd::fid", skip_all, fields(path = %args.path.display()))]
pub fn execute(ctx: &Context, args: &Args) -> Result<()> {
    let fid = ctx
        .llapi
        .lookup_fid(&args.path)
        .with_context(|| format!("Failed to look up FID of {}", args.path.display()))?;

    if args.json {
        print_json(&FidInfo {
            path: args.path.display().to_string(),
            fid: fid.to_string(),
            seq: fid.seq,
            oid: fid.oid,
            ver: fid.ver,
        })
    } else {
        println!("{fid}");
        Ok(())
    }
}
