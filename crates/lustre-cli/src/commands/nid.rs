//! Nid command - parse an LNet network identifier.
//!
//! # Examples
//!
//! ```bash
//! lroot nid 10.0.0.1@tcp1
//! ```

use anyhow::{Context as _, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use lustre_lnet::parse_nid;

use crate::output::{print_json, property_table};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// NID in address@network form
    pub nid: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct NidInfo {
    nid: String,
    address: String,
    driver: String,
    network: String,
}

#[instrument(level = "info", name = "cmd::nid", skip_all, fields(nid = %args.nid))]
pub fn execute(args: &Args) -> Result<()> {
    let nid = parse_nid(&args.nid).with_context(|| format!("Invalid NID {:?}", args.nid))?;
    let info = NidInfo {
        nid: nid.to_string(),
        address: nid.address().to_string(),
        driver: nid.driver().to_string(),
        network: nid.lnet(),
    };

    if args.json {
        print_json(&info)
    } else {
        let table = property_table([
            ("NID", info.nid),
            ("Address", info.address),
            ("Driver", info.driver),
            ("Network", info.network),
        ]);
        println!("{table}");
        Ok(())
    }
}
