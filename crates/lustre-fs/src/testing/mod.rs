//! Test doubles for root discovery and the mount cache.
//!
//! - [`FakeFs`]: an in-memory `lstat` table implementing [`FsProbe`](crate::FsProbe)
//! - [`StubClient`]: a [`LustreClient`](crate::LustreClient) backed by lookup
//!   tables, counting every call
//!
//! # Usage
//!
//! ```
//! use lustre_fs::testing::{FakeFs, StubClient};
//! use lustre_fs::{RootDir, RootWalker};
//!
//! let fs = FakeFs::new()
//!     .dir("/", 1)
//!     .dir("/mnt", 1)
//!     .lustre_root("/mnt/fs", 2)
//!     .file("/mnt/fs/data", 2);
//! let client = StubClient::new().with_dot_lustre("/mnt/fs");
//!
//! let walker = RootWalker::new(&client, &fs);
//! assert_eq!(walker.find_root("/mnt/fs/data")?, Some(RootDir::new("/mnt/fs")));
//! # Ok::<(), lustre_fs::Error>(())
//! ```

mod fake_fs;
mod stub_client;

pub use fake_fs::FakeFs;
pub use stub_client::{StubClient, StubMount};
