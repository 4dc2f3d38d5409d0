//! Subcommand implementations.
//!
//! Each module exposes an `Args` struct and an `execute` function taking the
//! shared [`Context`].

pub mod fid;
pub mod id;
pub mod mdt;
pub mod mount_id;
pub mod nid;
pub mod relpath;
pub mod root;
pub mod version;

use lustre_fs::{HostFs, Llapi, RootWalker};

/// State shared by all commands
pub struct Context {
    pub llapi: Llapi,
}

impl Context {
    pub fn new(llapi: Llapi) -> Self {
        Self { llapi }
    }

    /// Root walker over the host filesystem using the configured client
    pub fn walker(&self) -> RootWalker<&Llapi, HostFs> {
        RootWalker::new(&self.llapi, HostFs)
    }
}
