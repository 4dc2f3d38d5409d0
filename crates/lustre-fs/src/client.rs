//! The Lustre client library boundary.

use std::io;
use std::path::Path;

use crate::fid::Fid;

/// Operations this crate needs from the Lustre client library.
///
/// Implementations must be callable from any thread. Once a mount handle is
/// open, [`mdt_index_by_fid`](Self::mdt_index_by_fid) is called concurrently
/// on it without extra locking.
pub trait LustreClient: Send + Sync {
    /// Handle to an opened mount root, passed back to MDT queries.
    type Mount: Send + Sync;

    /// Resolve a path to its FID without following a final symlink.
    fn lookup_fid(&self, path: &Path) -> io::Result<Fid>;

    /// Open the mount root directory.
    fn open_mount(&self, root: &Path) -> io::Result<Self::Mount>;

    /// Index of the MDT that owns `fid`, asked through an open mount root.
    fn mdt_index_by_fid(&self, mount: &Self::Mount, fid: &Fid) -> io::Result<u32>;

    /// The client version string, e.g. `2.15.4`.
    fn version(&self) -> io::Result<String>;

    /// The client instance name for the mount containing `path`, e.g.
    /// `lustre-ffff88003e1b7000`.
    fn instance_name(&self, path: &Path) -> io::Result<String>;
}

impl<C: LustreClient + ?Sized> LustreClient for &C {
    type Mount = C::Mount;

    fn lookup_fid(&self, path: &Path) -> io::Result<Fid> {
        (**self).lookup_fid(path)
    }

    fn open_mount(&self, root: &Path) -> io::Result<Self::Mount> {
        (**self).open_mount(root)
    }

    fn mdt_index_by_fid(&self, mount: &Self::Mount, fid: &Fid) -> io::Result<u32> {
        (**self).mdt_index_by_fid(mount, fid)
    }

    fn version(&self) -> io::Result<String> {
        (**self).version()
    }

    fn instance_name(&self, path: &Path) -> io::Result<String> {
        (**self).instance_name(path)
    }
}
