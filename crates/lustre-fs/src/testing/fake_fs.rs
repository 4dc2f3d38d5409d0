use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::device::{EntryStat, FsProbe};
use crate::root::DOT_LUSTRE;

/// In-memory directory tree keyed by absolute path.
///
/// Entries are not linked to their parents; every ancestor a test walks
/// through must be added explicitly, which keeps device layouts obvious.
#[derive(Debug, Clone, Default)]
pub struct FakeFs {
    entries: HashMap<PathBuf, EntryStat>,
    failures: HashMap<PathBuf, io::ErrorKind>,
}

impl FakeFs {
    /// Empty tree. Every `lstat` fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory on device `dev`.
    #[must_use]
    pub fn dir(mut self, path: impl AsRef<Path>, dev: u64) -> Self {
        self.entries
            .insert(path.as_ref().to_path_buf(), EntryStat { dev, is_dir: true });
        self
    }

    /// Add a non-directory entry on device `dev`.
    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>, dev: u64) -> Self {
        self.entries
            .insert(path.as_ref().to_path_buf(), EntryStat { dev, is_dir: false });
        self
    }

    /// Add a mount root and its `.lustre` directory on device `dev`.
    ///
    /// The client still has to confirm the FID, see
    /// [`StubClient::with_dot_lustre`](super::StubClient::with_dot_lustre).
    #[must_use]
    pub fn lustre_root(self, root: impl AsRef<Path>, dev: u64) -> Self {
        let root = root.as_ref();
        self.dir(root, dev).dir(root.join(DOT_LUSTRE), dev)
    }

    /// Make `lstat` of `path` fail with `kind`, even if the entry exists.
    #[must_use]
    pub fn failing(mut self, path: impl AsRef<Path>, kind: io::ErrorKind) -> Self {
        self.failures.insert(path.as_ref().to_path_buf(), kind);
        self
    }

    /// Number of entries in the tree.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FsProbe for FakeFs {
    fn lstat(&self, path: &Path) -> io::Result<EntryStat> {
        if let Some(kind) = self.failures.get(path) {
            return Err(io::Error::from(*kind));
        }
        self.entries
            .get(path)
            .copied()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}
