//! Client version and client instance helpers.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::client::LustreClient;
use crate::error::{Error, Result};

/// A Lustre client instance: one mount of one filesystem on this host.
///
/// The pair names the client's directory under `/proc/fs/lustre/llite`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClientStatus {
    /// Filesystem name, e.g. `lustre`
    pub fs_name: String,
    /// Client instance, e.g. `ffff88003e1b7000`
    pub client_id: String,
}

impl ClientStatus {
    /// `<proc_root>/llite/<fs_name>-<client_id>`.
    pub fn proc_path(&self, proc_root: &Path) -> PathBuf {
        proc_root.join("llite").join(self.to_string())
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.fs_name, self.client_id)
    }
}

/// The client version, or `None` (with a warning) if it cannot be read.
pub fn version<C: LustreClient + ?Sized>(client: &C) -> Option<String> {
    match client.version() {
        Ok(version) => Some(version),
        Err(e) => {
            warn!(error = %e, "failed to read Lustre client version");
            None
        }
    }
}

/// The client instance for the mount containing `path`.
pub fn mount_id<C: LustreClient + ?Sized>(client: &C, path: &Path) -> Result<ClientStatus> {
    let name = client.instance_name(path)?;
    let Some((fs_name, client_id)) = name.split_once('-') else {
        return Err(Error::InstanceName(name));
    };
    if fs_name.is_empty() || client_id.is_empty() {
        return Err(Error::InstanceName(name));
    }
    Ok(ClientStatus {
        fs_name: fs_name.to_string(),
        client_id: client_id.to_string(),
    })
}
