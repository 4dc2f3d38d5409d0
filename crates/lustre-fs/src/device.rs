//! Device identifiers and the metadata probe used by the root walker.

use std::fs::Metadata;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// The parts of an `lstat` result the walker cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    /// `st_dev` of the entry
    pub dev: u64,
    /// Whether the entry is a directory (symlinks are not followed)
    pub is_dir: bool,
}

impl From<&Metadata> for EntryStat {
    fn from(meta: &Metadata) -> Self {
        Self {
            dev: device_id(meta),
            is_dir: meta.file_type().is_dir(),
        }
    }
}

/// Return `st_dev` from the platform stat structure.
pub fn device_id(meta: &Metadata) -> u64 {
    meta.dev()
}

/// Source of non-dereferencing metadata lookups.
///
/// [`HostFs`] asks the kernel. Tests use [`FakeFs`](crate::testing::FakeFs).
pub trait FsProbe {
    /// `lstat(2)` the path.
    fn lstat(&self, path: &Path) -> io::Result<EntryStat>;
}

impl<P: FsProbe + ?Sized> FsProbe for &P {
    fn lstat(&self, path: &Path) -> io::Result<EntryStat> {
        (**self).lstat(path)
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl FsProbe for HostFs {
    fn lstat(&self, path: &Path) -> io::Result<EntryStat> {
        std::fs::symlink_metadata(path).map(|meta| EntryStat::from(&meta))
    }
}
