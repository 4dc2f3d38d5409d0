//! Mount-id command - show the Lustre client instance serving a path.
//!
//! The instance names the client's directory under
//! `/proc/fs/lustre/llite`, where its tunables and stats live.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use lustre_fs::{ClientStatus, status};

use super::Context;
use crate::output::{print_json, property_table};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Path on the Lustre filesystem (usually the mount point)
    pub path: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct MountIdInfo {
    #[serde(flatten)]
    client: ClientStatus,
    proc_path: String,
}

#[instrument(level = "info", name = "cmd::mount_id", skip_all, fields(path = %args.path.display()))]
pub fn execute(ctx: &Context, args: &Args) -> Result<()> {
    let client = status::mount_id(&ctx.llapi, &args.path)?;
    let proc_path = client
        .proc_path(&ctx.llapi.config().proc_root)
        .display()
        .to_string();

    if args.json {
        print_json(&MountIdInfo { client, proc_path })
    } else {
        let table = property_table([
            ("Filesystem", client.fs_name.clone()),
            ("Client ID", client.client_id.clone()),
            ("Proc Path", proc_path),
        ]);
        println!("{table}");
        Ok(())
    }
}
