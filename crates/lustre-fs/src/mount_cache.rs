//! One lazily opened handle per Lustre mount root.
//!
//! Asking which MDT owns a FID needs an open descriptor somewhere on the
//! filesystem. Opening the mount root for every query is wasteful, so each
//! root gets a [`MountDir`] that opens the directory on first use and keeps
//! it for the life of the cache.
//!
//! # Concurrency
//!
//! - Registering a root goes through `DashMap`'s entry API, so two threads
//!   racing on a new root share one [`MountDir`].
//! - The per-handle mutex only serializes the open. Once open, queries run
//!   without locking.
//!
//! The cache never evicts. It holds one entry per Lustre mount the process
//! has asked about, which is bounded by the mounts on the host.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock, OnceLock};

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::client::LustreClient;
use crate::error::Result;
use crate::fid::Fid;
use crate::llapi::Llapi;
use crate::root::RootDir;

/// A mount root and its lazily opened handle.
pub struct MountDir<M> {
    root: RootDir,
    open_lock: Mutex<()>,
    handle: OnceLock<M>,
}

impl<M> MountDir<M> {
    /// Unopened handle for `root`.
    pub fn new(root: RootDir) -> Self {
        Self {
            root,
            open_lock: Mutex::new(()),
            handle: OnceLock::new(),
        }
    }

    /// The mount root.
    pub fn root(&self) -> &RootDir {
        &self.root
    }

    /// Whether the root has been opened.
    pub fn is_open(&self) -> bool {
        self.handle.get().is_some()
    }

    /// The open handle, opening the root on first use.
    ///
    /// Concurrent first callers wait on the open lock; exactly one of them
    /// calls [`LustreClient::open_mount`]. A failed open leaves the handle
    /// unopened so a later call can try again.
    pub fn handle<C>(&self, client: &C) -> std::io::Result<&M>
    where
        C: LustreClient<Mount = M> + ?Sized,
    {
        if let Some(handle) = self.handle.get() {
            return Ok(handle);
        }

        let _guard = self.open_lock.lock();
        if let Some(handle) = self.handle.get() {
            return Ok(handle);
        }

        debug!(root = %self.root, "opening mount root");
        let handle = client.open_mount(self.root.path())?;
        Ok(self.handle.get_or_init(|| handle))
    }

    /// Index of the MDT owning `fid`.
    pub fn mdt_index<C>(&self, client: &C, fid: &Fid) -> Result<u32>
    where
        C: LustreClient<Mount = M> + ?Sized,
    {
        let handle = self.handle(client)?;
        let index = client.mdt_index_by_fid(handle, fid)?;
        trace!(root = %self.root, %fid, index, "fid2mdtidx");
        Ok(index)
    }
}

impl<M> fmt::Debug for MountDir<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountDir")
            .field("root", &self.root)
            .field("open", &self.is_open())
            .finish()
    }
}

impl<M> fmt::Display for MountDir<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

/// Registry of [`MountDir`]s keyed by mount root.
pub struct MountCache<C: LustreClient> {
    client: C,
    mounts: DashMap<RootDir, Arc<MountDir<C::Mount>>>,
}

impl<C: LustreClient> MountCache<C> {
    /// Empty cache using `client` for opens and queries.
    pub fn new(client: C) -> Self {
        Self {
            client,
            mounts: DashMap::new(),
        }
    }

    /// The handle for `root`, registering an unopened one if needed.
    pub fn mount(&self, root: &RootDir) -> Arc<MountDir<C::Mount>> {
        if let Some(mount) = self.mounts.get(root) {
            return Arc::clone(mount.value());
        }
        let entry = self
            .mounts
            .entry(root.clone())
            .or_insert_with(|| Arc::new(MountDir::new(root.clone())));
        Arc::clone(entry.value())
    }

    /// Index of the MDT owning `fid` on the filesystem mounted at `root`.
    ///
    /// Errors from opening the root or from the query are returned as-is.
    pub fn get_mdt(&self, root: &RootDir, fid: &Fid) -> Result<u32> {
        self.mount(root).mdt_index(&self.client, fid)
    }

    /// Whether `root` has been registered.
    pub fn contains(&self, root: &Path) -> bool {
        self.mounts.contains_key(&RootDir::new(root))
    }

    /// Number of registered roots.
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    /// Whether no root has been registered.
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

impl<C: LustreClient + fmt::Debug> fmt::Debug for MountCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountCache")
            .field("client", &self.client)
            .field("mounts", &self.mounts.len())
            .finish()
    }
}

static MOUNTS: LazyLock<MountCache<Llapi>> = LazyLock::new(|| MountCache::new(Llapi::from_env()));

/// Index of the MDT owning `fid`, using the process-wide mount cache.
pub fn get_mdt(root: &RootDir, fid: &Fid) -> Result<u32> {
    MOUNTS.get_mdt(root, fid)
}
