//! Version command - print the Lustre client version.

use anyhow::Result;
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use lustre_fs::status;

use super::Context;
use crate::output::print_json;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct VersionInfo {
    version: String,
}

#[instrument(level = "info", name = "cmd::version", skip_all)]
pub fn execute(ctx: &Context, args: &Args) -> Result<()> {
    let Some(version) = status::version(&ctx.llapi) else {
        anyhow::bail!(
            "Lustre client version unavailable (looked in {} and {})",
            ctx.llapi.config().sys_root.display(),
            ctx.llapi.config().proc_root.display()
        );
    };

    if args.json {
        print_json(&VersionInfo { version })
    } else {
        println!("{version}");
        Ok(())
    }
}
