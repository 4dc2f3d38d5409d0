//! Error types for root discovery and MDT lookups.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by root discovery, the mount cache and the status helpers.
///
/// "Not on a Lustre filesystem" is not an error for [`find_root`] and
/// [`find_relative_path`]; they return `Ok(None)`. Only the `mount_*`
/// wrappers turn it into [`Error::NotLustre`].
///
/// [`find_root`]: crate::find_root
/// [`find_relative_path`]: crate::find_relative_path
#[derive(Debug, Error)]
pub enum Error {
    /// The path is not on a Lustre filesystem.
    #[error("{} not a Lustre filesystem", .0.display())]
    NotLustre(PathBuf),

    /// The input path or one of its ancestors could not be stat'ed.
    #[error("failed to stat {}: {source}", path.display())]
    Stat {
        /// Path whose metadata lookup failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A relative input could not be resolved against the working directory.
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] io::Error),

    /// The client library failed (mount open, FID lookup, MDT query).
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The client reported an instance name without a `-` separator.
    #[error("unexpected Lustre client instance name {0:?}")]
    InstanceName(String),
}

impl Error {
    /// The underlying I/O error kind, if this error wraps one.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Stat { source, .. } | Error::CurrentDir(source) | Error::Io(source) => {
                Some(source.kind())
            }
            Error::NotLustre(_) | Error::InstanceName(_) => None,
        }
    }
}
