//! Mount configuration for the networkfs filesystem.
//!
//! The remote service carries no ownership or permission metadata, so every
//! node reports the identity and mode configured here.

use netfs_core::ROOT_INODE;
use serde::{Deserialize, Serialize};

/// Default permission bits for files and directories (`S_IRWXUGO`).
pub const DEFAULT_PERM: u16 = 0o777;

/// Configuration options for a networkfs mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Inode number of the remote root directory.
    ///
    /// Default: 1000.
    pub root_inode: u64,

    /// Owner reported for every node. Default: 0.
    pub uid: u32,

    /// Group reported for every node. Default: 0.
    pub gid: u32,

    /// Permission bits reported for files. Default: `0o777`.
    pub file_perm: u16,

    /// Permission bits reported for directories. Default: `0o777`.
    pub dir_perm: u16,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            root_inode: ROOT_INODE,
            uid: 0,
            gid: 0,
            file_perm: DEFAULT_PERM,
            dir_perm: DEFAULT_PERM,
        }
    }
}

impl MountConfig {
    /// Sets the root inode number.
    #[must_use]
    pub fn root_inode(mut self, ino: u64) -> Self {
        self.root_inode = ino;
        self
    }

    /// Sets the reported owner.
    #[must_use]
    pub fn uid(mut self, uid: u32) -> Self {
        self.uid = uid;
        self
    }

    /// Sets the reported group.
    #[must_use]
    pub fn gid(mut self, gid: u32) -> Self {
        self.gid = gid;
        self
    }

    /// Sets the permission bits reported for files.
    #[must_use]
    pub fn file_perm(mut self, perm: u16) -> Self {
        self.file_perm = perm;
        self
    }

    /// Sets the permission bits reported for directories.
    #[must_use]
    pub fn dir_perm(mut self, perm: u16) -> Self {
        self.dir_perm = perm;
        self
    }
}
