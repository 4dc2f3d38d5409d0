//! Mdt command - print which MDT owns a file's metadata.
//!
//! # Examples
//!
//! ```bash
//! # FID looked up from the path
//! lroot mdt /lustre/scratch/project/run1
//!
//! # Explicit FID, path only used to locate the mount
//! lroot mdt /lustre/scratch --fid '[0x200000401:0x1c:0x0]'
//! ```

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use lustre_fs::{Fid, LustreClient};

use super::Context;
use crate::output::print_json;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Path on the Lustre filesystem
    pub path: PathBuf,

    /// Query this FID instead of the path's own
    #[arg(long, value_name = "FID")]
    pub fid: Option<Fid>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct MdtInfo {
    root: String,
    fid: String,
    mdt_index: u32,
}

#[instrument(level = "info", name = "cmd::mdt", skip_all, fields(path = %args.path.display()))]
pub fn execute(ctx: &Context, args: &Args) -> Result<()> {
    let root = ctx.walker().mount_root(&args.path)?;
    let fid = match args.fid {
        Some(fid) => fid,
        None => ctx
            .llapi
            .lookup_fid(&args.path)
            .with_context(|| format!("Failed to look up FID of {}", args.path.display()))?,
    };

    let index = lustre_fs::get_mdt(&root, &fid)
        .with_context(|| format!("Failed to query MDT index of {fid} on {root}"))?;

    if args.json {
        print_json(&MdtInfo {
            root: root.to_string(),
            fid: fid.to_string(),
            mdt_index: index,
        })
    } else {
        println!("{index}");
        Ok(())
    }
}
