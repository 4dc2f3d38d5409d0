//! Linux Lustre client calls.
//!
//! FID lookups, MDT queries and the instance name go through the llite
//! ioctls on an open descriptor. The version comes from sysfs, falling back
//! to the older procfs file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::trace;

use crate::client::LustreClient;
use crate::fid::Fid;

/// Default sysfs directory of the Lustre client.
pub const DEFAULT_SYS_ROOT: &str = "/sys/fs/lustre";

/// Default procfs directory of the Lustre client.
pub const DEFAULT_PROC_ROOT: &str = "/proc/fs/lustre";

/// Where the client publishes its status files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LlapiConfig {
    /// Usually `/sys/fs/lustre`
    pub sys_root: PathBuf,
    /// Usually `/proc/fs/lustre`
    pub proc_root: PathBuf,
}

impl Default for LlapiConfig {
    fn default() -> Self {
        Self {
            sys_root: PathBuf::from(DEFAULT_SYS_ROOT),
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }
}

impl LlapiConfig {
    /// Defaults, overridden by `LUSTRE_SYS_ROOT` and `LUSTRE_PROC_ROOT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(sys_root) = std::env::var_os("LUSTRE_SYS_ROOT") {
            config.sys_root = PathBuf::from(sys_root);
        }
        if let Some(proc_root) = std::env::var_os("LUSTRE_PROC_ROOT") {
            config.proc_root = PathBuf::from(proc_root);
        }
        config
    }
}

/// The Linux Lustre client.
#[derive(Debug, Clone, Default)]
pub struct Llapi {
    config: LlapiConfig,
}

impl Llapi {
    /// Client reading status files from the given locations.
    pub fn new(config: LlapiConfig) -> Self {
        Self { config }
    }

    /// Client configured from the environment.
    pub fn from_env() -> Self {
        Self::new(LlapiConfig::from_env())
    }

    /// The active configuration.
    pub fn config(&self) -> &LlapiConfig {
        &self.config
    }
}

/// Open without following a final symlink and without blocking on FIFOs or
/// device nodes, like `llapi_path2fid`.
fn open_for_ioctl(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK | libc::O_NOFOLLOW)
        .open(path)
}

/// `/proc/fs/lustre/version` holds `lustre: 2.15.4` among other lines.
fn parse_proc_version(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.trim()
            .strip_prefix("lustre:")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// `OBD_IOC_GETDTNAME` answers `<fsname>-clilov-<instance>`.
fn instance_from_lov_name(lov: &str) -> Option<String> {
    let (fs_name, instance) = lov.split_once("-clilov-")?;
    if fs_name.is_empty() || instance.is_empty() {
        return None;
    }
    Some(format!("{fs_name}-{instance}"))
}

#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
mod ioctl {
    use crate::fid::Fid;

    /// `MAX_OBD_NAME` in `lustre_cfg.h`.
    pub const MAX_OBD_NAME: usize = 128;

    // LL_IOC_PATH2FID is _IOR('f', 173, long)
    nix::ioctl_read_bad!(
        path2fid,
        nix::request_code_read!(b'f', 173, size_of::<libc::c_long>()),
        Fid
    );

    // LL_IOC_FID2MDTIDX is _IOWR('f', 248, struct lu_fid); the index is the return value
    nix::ioctl_readwrite!(fid2mdtidx, b'f', 248, Fid);

    // OBD_IOC_GETDTNAME is _IOR('f', 127, char *)
    nix::ioctl_read_bad!(
        getdtname,
        nix::request_code_read!(b'f', 127, size_of::<*const libc::c_char>()),
        [u8; MAX_OBD_NAME]
    );
}

#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
impl LustreClient for Llapi {
    type Mount = File;

    fn lookup_fid(&self, path: &Path) -> io::Result<Fid> {
        use std::os::fd::AsRawFd;

        let file = open_for_ioctl(path)?;
        let mut fid = Fid::default();
        // SAFETY: the descriptor is open for the duration of the call and
        // `fid` is a valid, writable `struct lu_fid`.
        unsafe { ioctl::path2fid(file.as_raw_fd(), &raw mut fid) }.map_err(io::Error::from)?;
        trace!(path = %path.display(), %fid, "path2fid");
        Ok(fid)
    }

    fn open_mount(&self, root: &Path) -> io::Result<File> {
        File::open(root)
    }

    fn mdt_index_by_fid(&self, mount: &File, fid: &Fid) -> io::Result<u32> {
        use std::os::fd::AsRawFd;

        let mut arg = *fid;
        // SAFETY: `mount` is an open descriptor and `arg` is a local copy the
        // kernel may overwrite.
        let index = unsafe { ioctl::fid2mdtidx(mount.as_raw_fd(), &raw mut arg) }
            .map_err(io::Error::from)?;
        u32::try_from(index).map_err(|_| io::Error::other(format!("invalid MDT index {index}")))
    }

    fn version(&self) -> io::Result<String> {
        let sys_version = self.config.sys_root.join("version");
        match fs::read_to_string(&sys_version) {
            Ok(content) if !content.trim().is_empty() => return Ok(content.trim().to_string()),
            Ok(_) => {}
            Err(e) => trace!(path = %sys_version.display(), error = %e, "no sysfs version"),
        }

        let proc_version = self.config.proc_root.join("version");
        let content = fs::read_to_string(&proc_version)?;
        parse_proc_version(&content).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("no lustre version in {}", proc_version.display()),
            )
        })
    }

    fn instance_name(&self, path: &Path) -> io::Result<String> {
        use std::os::fd::AsRawFd;

        let file = File::open(path)?;
        let mut buf = [0u8; ioctl::MAX_OBD_NAME];
        // SAFETY: the descriptor is open and `buf` is MAX_OBD_NAME bytes, the
        // size the kernel copies out.
        unsafe { ioctl::getdtname(file.as_raw_fd(), &raw mut buf) }.map_err(io::Error::from)?;

        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        let lov = String::from_utf8_lossy(&buf[..len]);
        instance_from_lov_name(&lov).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unexpected lov name {lov:?}"),
            )
        })
    }
}

#[cfg(not(target_os = "linux"))]
impl LustreClient for Llapi {
    type Mount = File;

    fn lookup_fid(&self, _path: &Path) -> io::Result<Fid> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn open_mount(&self, root: &Path) -> io::Result<File> {
        File::open(root)
    }

    fn mdt_index_by_fid(&self, _mount: &File, _fid: &Fid) -> io::Result<u32> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn version(&self) -> io::Result<String> {
        let content = fs::read_to_string(self.config.proc_root.join("version"))?;
        parse_proc_version(&content).ok_or_else(|| io::ErrorKind::InvalidData.into())
    }

    fn instance_name(&self, _path: &Path) -> io::Result<String> {
        Err(io::ErrorKind::Unsupported.into())
    }
}
