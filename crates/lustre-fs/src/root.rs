//! Mount-root discovery by walking up device boundaries.
//!
//! Starting from a path, the walker climbs towards `/` one parent at a time.
//! As long as the parent has the same `st_dev` as the starting entry we are
//! still inside the same filesystem. The first directory whose parent lives on
//! another device is the mount point. `/` has no distinct parent, so it is
//! treated as a boundary too, which covers Lustre mounted as the root
//! filesystem.
//!
//! A device boundary alone says nothing about the filesystem type, so the
//! candidate is only accepted if it contains the reserved `.lustre`
//! directory and the client confirms its FID.

use std::ffi::OsString;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};

use crate::client::LustreClient;
use crate::device::{EntryStat, FsProbe, HostFs};
use crate::error::{Error, Result};
use crate::llapi::Llapi;

/// Name of the reserved directory present at every Lustre mount root.
pub const DOT_LUSTRE: &str = ".lustre";

/// Mount point of a Lustre filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootDir(PathBuf);

impl RootDir {
    /// Wrap a mount point path. No validation is done.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The mount point.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Append path components to the root, normalizing the result.
    ///
    /// An empty or `.` argument yields the root itself.
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        clean(&self.0.join(rel))
    }
}

impl fmt::Display for RootDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for RootDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Identifier of a Lustre filesystem.
///
/// Currently the mount root. Callers should treat it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsId(RootDir);

impl FsId {
    /// Path form of the id.
    pub fn path(&self) -> &Path {
        self.0.path()
    }
}

impl From<RootDir> for FsId {
    fn from(root: RootDir) -> Self {
        Self(root)
    }
}

impl fmt::Display for FsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lexically normalize a path: drop `.`, resolve `..` against the preceding
/// component and collapse repeated separators. `..` at `/` stays at `/`.
pub(crate) fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_in_parent = matches!(out.components().next_back(), Some(Component::ParentDir));
                if ends_in_parent || (!out.pop() && !out.has_root()) {
                    out.push("..");
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or(path)
}

/// Walks directory trees looking for Lustre mount roots.
///
/// Generic over the client (for the `.lustre` FID check) and the metadata
/// probe, so it can run against [`FakeFs`](crate::testing::FakeFs) and
/// [`StubClient`](crate::testing::StubClient) in tests.
#[derive(Debug, Clone, Default)]
pub struct RootWalker<C, P = HostFs> {
    client: C,
    probe: P,
}

impl<C: LustreClient, P: FsProbe> RootWalker<C, P> {
    /// Build a walker.
    pub fn new(client: C, probe: P) -> Self {
        Self { client, probe }
    }

    /// Mount root of the Lustre filesystem holding `path`.
    ///
    /// Returns `Ok(None)` when `path` is not on Lustre. Fails if `path` or any
    /// visited ancestor cannot be stat'ed.
    pub fn find_root(&self, path: impl AsRef<Path>) -> Result<Option<RootDir>> {
        Ok(self.walk(path.as_ref(), false)?.map(|(root, _)| root))
    }

    /// Mount root and the path of `path` relative to it.
    ///
    /// The relative part is empty when `path` is the root itself, and
    /// `root.join(rel)` equals the normalized absolute form of `path`.
    pub fn find_relative_path(&self, path: impl AsRef<Path>) -> Result<Option<(RootDir, PathBuf)>> {
        self.walk(path.as_ref(), true)
    }

    /// Like [`find_root`](Self::find_root) but "not Lustre" is an error.
    pub fn mount_root(&self, path: impl AsRef<Path>) -> Result<RootDir> {
        let path = path.as_ref();
        self.find_root(path)?
            .ok_or_else(|| Error::NotLustre(path.to_path_buf()))
    }

    /// Like [`find_relative_path`](Self::find_relative_path) but "not Lustre"
    /// is an error.
    pub fn mount_rel_path(&self, path: impl AsRef<Path>) -> Result<(RootDir, PathBuf)> {
        let path = path.as_ref();
        self.find_relative_path(path)?
            .ok_or_else(|| Error::NotLustre(path.to_path_buf()))
    }

    /// Filesystem id of the Lustre filesystem holding `path`.
    pub fn fs_id(&self, path: impl AsRef<Path>) -> Result<FsId> {
        self.mount_root(path).map(FsId::from)
    }

    fn stat(&self, path: &Path) -> Result<EntryStat> {
        self.probe.lstat(path).map_err(|source| Error::Stat {
            path: path.to_path_buf(),
            source,
        })
    }

    fn absolute(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(clean(path))
        } else {
            let cwd = std::env::current_dir().map_err(Error::CurrentDir)?;
            Ok(clean(&cwd.join(path)))
        }
    }

    fn walk(&self, path: &Path, track_suffix: bool) -> Result<Option<(RootDir, PathBuf)>> {
        let mut pathname = Self::absolute(path)?;
        let dev = self.stat(&pathname)?.dev;
        // Components below the current candidate, innermost first
        let mut suffix: Vec<OsString> = Vec::new();

        loop {
            let parent = parent_of(&pathname).to_path_buf();
            let parent_dev = self.stat(&parent)?.dev;

            // `/` is its own parent, so a Lustre root filesystem shows no device change
            if parent_dev != dev || pathname == parent {
                trace!(candidate = %pathname.display(), dev, parent_dev, "device boundary");
                if !self.is_dot_lustre(&pathname.join(DOT_LUSTRE)) {
                    debug!(path = %path.display(), boundary = %pathname.display(), "not on Lustre");
                    return Ok(None);
                }

                let rel: PathBuf = suffix.iter().rev().collect();
                debug!(path = %path.display(), root = %pathname.display(), "found Lustre root");
                return Ok(Some((RootDir(pathname), rel)));
            }

            if track_suffix && let Some(name) = pathname.file_name() {
                suffix.push(name.to_os_string());
            }
            pathname = parent;
        }
    }

    /// Whether `dir` is the `.lustre` directory of a mount root.
    ///
    /// Every failure counts as "no": missing entry, not a directory, failed
    /// FID lookup or a FID that is not `.lustre`.
    fn is_dot_lustre(&self, dir: &Path) -> bool {
        match self.probe.lstat(dir) {
            Ok(stat) if stat.is_dir => {}
            Ok(_) => {
                debug!(path = %dir.display(), "sentinel is not a directory");
                return false;
            }
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "sentinel lstat failed");
                return false;
            }
        }

        match self.client.lookup_fid(dir) {
            Ok(fid) if fid.is_dot_lustre() => true,
            Ok(fid) => {
                debug!(path = %dir.display(), %fid, "sentinel has a foreign FID");
                false
            }
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "sentinel FID lookup failed");
                false
            }
        }
    }
}

fn host_walker() -> RootWalker<Llapi, HostFs> {
    RootWalker::new(Llapi::from_env(), HostFs)
}

/// Mount root of the Lustre filesystem holding `path`, or `None`.
pub fn find_root(path: impl AsRef<Path>) -> Result<Option<RootDir>> {
    host_walker().find_root(path)
}

/// Mount root and relative path of `path`, or `None` when not on Lustre.
pub fn find_relative_path(path: impl AsRef<Path>) -> Result<Option<(RootDir, PathBuf)>> {
    host_walker().find_relative_path(path)
}

/// Mount root of `path`, failing with [`Error::NotLustre`] off Lustre.
pub fn mount_root(path: impl AsRef<Path>) -> Result<RootDir> {
    host_walker().mount_root(path)
}

/// Mount root and relative path, failing with [`Error::NotLustre`] off Lustre.
pub fn mount_rel_path(path: impl AsRef<Path>) -> Result<(RootDir, PathBuf)> {
    host_walker().mount_rel_path(path)
}

/// Filesystem id of the Lustre filesystem holding `path`.
pub fn fs_id(path: impl AsRef<Path>) -> Result<FsId> {
    host_walker().fs_id(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fid::Fid;
    use crate::testing::{FakeFs, StubClient};
    use std::io;

    const ROOT_DEV: u64 = 1;
    const LUSTRE_DEV: u64 = 2;

    /// `/` on one device, a Lustre mount at `/mnt/fs`, and `/tmp` next to it.
    fn mounted() -> (FakeFs, StubClient) {
        let fs = FakeFs::new()
            .dir("/", ROOT_DEV)
            .dir("/mnt", ROOT_DEV)
            .dir("/tmp", ROOT_DEV)
            .dir("/tmp/unrelated", ROOT_DEV)
            .lustre_root("/mnt/fs", LUSTRE_DEV)
            .dir("/mnt/fs/a", LUSTRE_DEV)
            .dir("/mnt/fs/a/b", LUSTRE_DEV)
            .file("/mnt/fs/a/b/c", LUSTRE_DEV);
        let client = StubClient::new().with_dot_lustre("/mnt/fs");
        (fs, client)
    }

    #[test]
    fn test_relative_path_example() {
        let (fs, client) = mounted();
        let walker = RootWalker::new(&client, &fs);

        let (root, rel) = walker.find_relative_path("/mnt/fs/a/b/c").unwrap().unwrap();
        assert_eq!(root, RootDir::new("/mnt/fs"));
        assert_eq!(rel, PathBuf::from("a/b/c"));
    }

    #[test]
    fn test_root_of_root_has_empty_suffix() {
        let (fs, client) = mounted();
        let walker = RootWalker::new(&client, &fs);

        let (root, rel) = walker.find_relative_path("/mnt/fs").unwrap().unwrap();
        assert_eq!(root.path(), Path::new("/mnt/fs"));
        assert_eq!(rel, PathBuf::new());
        assert_eq!(root.join(&rel), PathBuf::from("/mnt/fs"));
    }

    #[test]
    fn test_unrelated_path_is_not_found() {
        let (fs, client) = mounted();
        let walker = RootWalker::new(&client, &fs);

        assert_eq!(walker.find_root("/tmp/unrelated").unwrap(), None);
        assert_eq!(walker.find_relative_path("/tmp/unrelated").unwrap(), None);
    }

    #[test]
    fn test_parent_shares_root() {
        let (fs, client) = mounted();
        let walker = RootWalker::new(&client, &fs);

        let leaf = walker.find_root("/mnt/fs/a/b/c").unwrap();
        let parent = walker.find_root("/mnt/fs/a/b").unwrap();
        assert_eq!(leaf, parent);
        assert_eq!(leaf, Some(RootDir::new("/mnt/fs")));
    }

    #[test]
    fn test_lustre_as_os_root() {
        let fs = FakeFs::new()
            .lustre_root("/", LUSTRE_DEV)
            .dir("/home", LUSTRE_DEV)
            .file("/home/data", LUSTRE_DEV);
        let client = StubClient::new().with_dot_lustre("/");
        let walker = RootWalker::new(&client, &fs);

        assert_eq!(walker.find_root("/").unwrap(), Some(RootDir::new("/")));
        let (root, rel) = walker.find_relative_path("/home/data").unwrap().unwrap();
        assert_eq!(root, RootDir::new("/"));
        assert_eq!(rel, PathBuf::from("home/data"));
    }

    #[test]
    fn test_os_root_without_sentinel_is_not_found() {
        let fs = FakeFs::new().dir("/", ROOT_DEV).dir("/etc", ROOT_DEV);
        let client = StubClient::new();
        let walker = RootWalker::new(&client, &fs);

        assert_eq!(walker.find_root("/").unwrap(), None);
        assert_eq!(walker.find_root("/etc").unwrap(), None);
    }

    #[test]
    fn test_missing_input_is_stat_error() {
        let (fs, client) = mounted();
        let walker = RootWalker::new(&client, &fs);

        let err = walker.find_root("/mnt/fs/missing").unwrap_err();
        assert!(matches!(&err, Error::Stat { path, .. } if path == Path::new("/mnt/fs/missing")));
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn test_unreadable_ancestor_propagates() {
        let (fs, client) = mounted();
        let fs = fs.failing("/mnt/fs/a", io::ErrorKind::PermissionDenied);
        let walker = RootWalker::new(&client, &fs);

        let err = walker.find_root("/mnt/fs/a/b/c").unwrap_err();
        assert!(matches!(&err, Error::Stat { path, .. } if path == Path::new("/mnt/fs/a")));
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_sentinel_file_is_rejected() {
        let fs = FakeFs::new()
            .dir("/", ROOT_DEV)
            .dir("/mnt", ROOT_DEV)
            .dir("/mnt/fs", LUSTRE_DEV)
            .file("/mnt/fs/.lustre", LUSTRE_DEV);
        let client = StubClient::new().with_dot_lustre("/mnt/fs");
        let walker = RootWalker::new(&client, &fs);

        assert_eq!(walker.find_root("/mnt/fs").unwrap(), None);
    }

    #[test]
    fn test_sentinel_with_foreign_fid_is_rejected() {
        let fs = FakeFs::new()
            .dir("/", ROOT_DEV)
            .dir("/mnt", ROOT_DEV)
            .lustre_root("/mnt/fs", LUSTRE_DEV);
        let client = StubClient::new().with_fid("/mnt/fs/.lustre", Fid::new(0x2_0000_0007, 1, 0));
        let walker = RootWalker::new(&client, &fs);

        assert_eq!(walker.find_root("/mnt/fs").unwrap(), None);
    }

    #[test]
    fn test_sentinel_lookup_failure_is_negative() {
        let fs = FakeFs::new()
            .dir("/", ROOT_DEV)
            .dir("/mnt", ROOT_DEV)
            .lustre_root("/mnt/fs", LUSTRE_DEV);
        // No FID registered: lookup_fid fails
        let client = StubClient::new();
        let walker = RootWalker::new(&client, &fs);

        assert_eq!(walker.find_root("/mnt/fs").unwrap(), None);
    }

    #[test]
    fn test_nested_mount_stops_at_innermost() {
        let fs = FakeFs::new()
            .dir("/", ROOT_DEV)
            .lustre_root("/lustre", LUSTRE_DEV)
            .dir("/lustre/scratch", LUSTRE_DEV)
            .lustre_root("/lustre/scratch/inner", 3)
            .file("/lustre/scratch/inner/f", 3);
        let client = StubClient::new()
            .with_dot_lustre("/lustre")
            .with_dot_lustre("/lustre/scratch/inner");
        let walker = RootWalker::new(&client, &fs);

        assert_eq!(
            walker.find_root("/lustre/scratch/inner/f").unwrap(),
            Some(RootDir::new("/lustre/scratch/inner"))
        );
        assert_eq!(
            walker.find_root("/lustre/scratch").unwrap(),
            Some(RootDir::new("/lustre"))
        );
    }

    #[test]
    fn test_input_is_cleaned() {
        let (fs, client) = mounted();
        let walker = RootWalker::new(&client, &fs);

        let (root, rel) = walker
            .find_relative_path("/mnt/fs//a/./b/../b/c")
            .unwrap()
            .unwrap();
        assert_eq!(root, RootDir::new("/mnt/fs"));
        assert_eq!(rel, PathBuf::from("a/b/c"));
    }

    #[test]
    fn test_relative_input_resolves_against_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let fs = cwd
            .ancestors()
            .skip(1)
            .fold(FakeFs::new(), |fs, dir| fs.dir(dir, ROOT_DEV))
            .lustre_root(&cwd, LUSTRE_DEV)
            .dir(cwd.join("a"), LUSTRE_DEV)
            .dir(cwd.join("a/b"), LUSTRE_DEV);
        let client = StubClient::new().with_dot_lustre(&cwd);
        let walker = RootWalker::new(&client, &fs);

        let (root, rel) = walker.find_relative_path("a/./b/../b").unwrap().unwrap();
        assert_eq!(root.path(), cwd.as_path());
        assert_eq!(rel, PathBuf::from("a/b"));

        let (root, rel) = walker.find_relative_path(".").unwrap().unwrap();
        assert_eq!(root.path(), cwd.as_path());
        assert_eq!(rel, PathBuf::new());
    }

    #[test]
    fn test_mount_wrappers_report_not_lustre() {
        let (fs, client) = mounted();
        let walker = RootWalker::new(&client, &fs);

        assert!(matches!(walker.mount_root("/tmp/unrelated"), Err(Error::NotLustre(_))));
        assert!(matches!(walker.mount_rel_path("/tmp"), Err(Error::NotLustre(_))));
        assert_eq!(
            walker.fs_id("/mnt/fs/a").unwrap().path(),
            Path::new("/mnt/fs")
        );
    }

    #[test]
    fn test_find_root_only_checks_sentinel_once() {
        let (fs, client) = mounted();
        let walker = RootWalker::new(&client, &fs);

        walker.find_root("/mnt/fs/a/b/c").unwrap();
        assert_eq!(client.lookup_count(), 1);
    }

    #[test]
    fn test_host_tempdir_is_not_lustre() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("x/y");
        std::fs::create_dir_all(&nested).unwrap();

        let client = StubClient::new();
        let walker = RootWalker::new(&client, HostFs);
        assert_eq!(walker.find_root(&nested).unwrap(), None);
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(clean(Path::new("/../..")), PathBuf::from("/"));
        assert_eq!(clean(Path::new("//a//b/")), PathBuf::from("/a/b"));
        assert_eq!(clean(Path::new("a/../..")), PathBuf::from(".."));
        assert_eq!(clean(Path::new("")), PathBuf::from("."));
    }

    #[test]
    fn test_root_dir_join() {
        let root = RootDir::new("/mnt/fs");
        assert_eq!(root.join("a/b"), PathBuf::from("/mnt/fs/a/b"));
        assert_eq!(root.join(""), PathBuf::from("/mnt/fs"));
        assert_eq!(root.to_string(), "/mnt/fs");
        assert_eq!(FsId::from(root.clone()).to_string(), "/mnt/fs");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn segment() -> impl Strategy<Value = String> {
            prop_oneof![
                4 => "[a-z]{1,6}",
                1 => Just(".".to_string()),
                1 => Just(String::new()),
            ]
        }

        fn tree_with(depth_segments: &[String]) -> (FakeFs, PathBuf) {
            let mut fs = FakeFs::new()
                .dir("/", ROOT_DEV)
                .dir("/mnt", ROOT_DEV)
                .lustre_root("/mnt/fs", LUSTRE_DEV);
            let mut path = PathBuf::from("/mnt/fs");
            for name in depth_segments.iter().filter(|s| !s.is_empty() && *s != ".") {
                path.push(name);
                fs = fs.dir(&path, LUSTRE_DEV);
            }
            (fs, path)
        }

        proptest! {
            #[test]
            fn relative_path_rejoins(segments in prop::collection::vec(segment(), 0..8)) {
                let (fs, _) = tree_with(&segments);
                let client = StubClient::new().with_dot_lustre("/mnt/fs");
                let walker = RootWalker::new(&client, &fs);

                let raw = format!("/mnt/fs/{}", segments.join("/"));
                let (root, rel) = walker.find_relative_path(&raw).unwrap().unwrap();
                prop_assert_eq!(root.path(), Path::new("/mnt/fs"));
                prop_assert_eq!(root.join(&rel), clean(Path::new(&raw)));
            }

            #[test]
            fn root_is_ancestor_and_stable(segments in prop::collection::vec("[a-z]{1,6}", 1..8)) {
                let (fs, leaf) = tree_with(&segments);
                let client = StubClient::new().with_dot_lustre("/mnt/fs");
                let walker = RootWalker::new(&client, &fs);

                let root = walker.find_root(&leaf).unwrap().unwrap();
                prop_assert!(leaf.starts_with(root.path()));
                let parent = leaf.parent().unwrap();
                prop_assert_eq!(walker.find_root(parent).unwrap(), Some(root));
            }

            #[test]
            fn off_lustre_is_never_an_error(segments in prop::collection::vec("[a-z]{1,6}", 1..8)) {
                let mut fs = FakeFs::new().dir("/", ROOT_DEV);
                let mut path = PathBuf::from("/");
                for name in &segments {
                    path.push(name);
                    fs = fs.dir(&path, ROOT_DEV);
                }
                let client = StubClient::new();
                let walker = RootWalker::new(&client, &fs);
                prop_assert_eq!(walker.find_root(&path).unwrap(), None);
            }
        }
    }
}
