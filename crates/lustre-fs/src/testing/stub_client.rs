use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::client::LustreClient;
use crate::fid::Fid;
use crate::root::DOT_LUSTRE;

/// Mount handle issued by [`StubClient::open_mount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubMount {
    /// Root the handle was opened for
    pub root: PathBuf,
    /// 1 for the first open, 2 for the second, ...
    pub serial: usize,
}

/// Table-driven [`LustreClient`] that counts every call.
///
/// Paths without a registered FID behave like non-Lustre files and fail
/// with `ENOTTY`, the error the real ioctls return.
#[derive(Debug, Default)]
pub struct StubClient {
    fids: HashMap<PathBuf, Fid>,
    mdts: HashMap<Fid, u32>,
    instances: HashMap<PathBuf, String>,
    version: Option<String>,
    open_failure: Option<io::ErrorKind>,
    open_delay: Option<Duration>,
    lookups: AtomicUsize,
    opens: AtomicUsize,
    queries: AtomicUsize,
}

fn not_lustre() -> io::Error {
    io::Error::from_raw_os_error(libc::ENOTTY)
}

impl StubClient {
    /// Client that knows nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the FID returned for `path`.
    #[must_use]
    pub fn with_fid(mut self, path: impl AsRef<Path>, fid: Fid) -> Self {
        self.fids.insert(path.as_ref().to_path_buf(), fid);
        self
    }

    /// Register `root/.lustre` with the `.lustre` FID.
    #[must_use]
    pub fn with_dot_lustre(self, root: impl AsRef<Path>) -> Self {
        let sentinel = root.as_ref().join(DOT_LUSTRE);
        self.with_fid(sentinel, Fid::dot_lustre())
    }

    /// Register the MDT index owning `fid`.
    #[must_use]
    pub fn with_mdt(mut self, fid: Fid, index: u32) -> Self {
        self.mdts.insert(fid, index);
        self
    }

    /// Register the instance name reported for `path`.
    #[must_use]
    pub fn with_instance_name(mut self, path: impl AsRef<Path>, name: impl Into<String>) -> Self {
        self.instances
            .insert(path.as_ref().to_path_buf(), name.into());
        self
    }

    /// Set the reported client version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Make every `open_mount` fail with `kind`.
    #[must_use]
    pub fn failing_open(mut self, kind: io::ErrorKind) -> Self {
        self.open_failure = Some(kind);
        self
    }

    /// Sleep inside `open_mount`, widening races between first callers.
    #[must_use]
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    /// Number of `lookup_fid` calls so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of `open_mount` calls so far, failed ones included.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of `mdt_index_by_fid` calls so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl LustreClient for StubClient {
    type Mount = StubMount;

    fn lookup_fid(&self, path: &Path) -> io::Result<Fid> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.fids.get(path).copied().ok_or_else(not_lustre)
    }

    fn open_mount(&self, root: &Path) -> io::Result<StubMount> {
        let serial = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.open_delay {
            std::thread::sleep(delay);
        }
        if let Some(kind) = self.open_failure {
            return Err(io::Error::from(kind));
        }
        Ok(StubMount {
            root: root.to_path_buf(),
            serial,
        })
    }

    fn mdt_index_by_fid(&self, _mount: &StubMount, fid: &Fid) -> io::Result<u32> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.mdts
            .get(fid)
            .copied()
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENOENT))
    }

    fn version(&self) -> io::Result<String> {
        self.version
            .clone()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn instance_name(&self, path: &Path) -> io::Result<String> {
        self.instances.get(path).cloned().ok_or_else(not_lustre)
    }
}
