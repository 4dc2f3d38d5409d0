//! Lustre mount-root discovery and per-mount metadata lookups.
//!
//! This crate answers two questions about an arbitrary path:
//!
//! 1. Does it live on a Lustre filesystem, and if so, where is the mount root?
//! 2. Where is the path relative to that root?
//!
//! It does not parse the mount table. Instead it walks up the directory tree
//! comparing `st_dev` values until the device changes (or `/` is reached) and
//! then proves the boundary by looking for the reserved `.lustre` directory.
//!
//! # Components
//!
//! - [`RootWalker`] - the upward device-boundary walk ([`find_root`],
//!   [`find_relative_path`], [`mount_root`], [`mount_rel_path`], [`fs_id`])
//! - [`MountCache`] - one lazily opened handle per mount root, used to ask
//!   which MDT owns a [`Fid`] ([`get_mdt`])
//! - [`LustreClient`] - the client library boundary, with [`Llapi`] as the
//!   Linux implementation
//! - [`status`] - client version and client instance helpers
//!
//! # Example
//!
//! ```no_run
//! use lustre_fs::find_relative_path;
//!
//! match find_relative_path("/mnt/lustre/project/data.h5")? {
//!     Some((root, rel)) => println!("{} + {}", root, rel.display()),
//!     None => println!("not on Lustre"),
//! }
//! # Ok::<(), lustre_fs::Error>(())
//! ```
//!
//! # Testing
//!
//! The walker is generic over [`FsProbe`] and the cache over [`LustreClient`],
//! so the [`testing`] module can drive both without a Lustre mount.

#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(not(unix))]
compile_error!("lustre-fs needs st_dev from POSIX stat and only builds on Unix targets");

mod client;
mod device;
mod error;
mod fid;
mod llapi;
mod mount_cache;
mod root;
pub mod status;

/// Test doubles for the filesystem probe and the client library.
///
/// Used by this crate's tests and benchmarks, and by downstream crates that
/// want to exercise root discovery without a Lustre mount.
pub mod testing;

pub use client::LustreClient;
pub use device::{EntryStat, FsProbe, HostFs, device_id};
pub use error::{Error, Result};
pub use fid::{FID_OID_DOT_LUSTRE, FID_SEQ_DOT_LUSTRE, Fid, FidParseError};
pub use llapi::{DEFAULT_PROC_ROOT, DEFAULT_SYS_ROOT, Llapi, LlapiConfig};
pub use mount_cache::{MountCache, MountDir, get_mdt};
pub use root::{
    DOT_LUSTRE, FsId, RootDir, RootWalker, find_relative_path, find_root, fs_id, mount_rel_path,
    mount_root,
};
pub use status::ClientStatus;
