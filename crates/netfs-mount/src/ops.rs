//! Capability interfaces through which a host dispatches node operations.
//!
//! A host resolves a node with [`NetworkFs::operations`](crate::NetworkFs::operations)
//! and receives a [`NodeOps`] tagged by node kind. Directory nodes expose
//! the namespace operations, file nodes the content operations.

use crate::dir_iter::DirRecord;
use crate::error::MountResult;
use netfs_core::EntryKind;

/// Attributes of a node as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeAttr {
    /// Inode number.
    pub ino: u64,
    /// Directory or file.
    pub kind: EntryKind,
    /// Size in bytes (zero for directories).
    pub size: u64,
    /// Number of local names linking the node.
    pub nlink: u64,
    /// Permission bits.
    pub perm: u16,
    /// Owner.
    pub uid: u32,
    /// Group.
    pub gid: u32,
}

/// A freshly opened file handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFile {
    /// Handle id for subsequent content operations.
    pub fh: u64,
    /// Initial file position: the content length for `O_APPEND`, else zero.
    pub offset: u64,
}

/// Operations on directory nodes.
pub trait DirectoryOperations {
    /// Resolves `name` under `parent`.
    fn lookup(&self, parent: u64, name: &[u8]) -> MountResult<NodeAttr>;

    /// Creates a file `name` under `parent`.
    fn create(&self, parent: u64, name: &[u8]) -> MountResult<NodeAttr>;

    /// Creates a directory `name` under `parent`.
    fn mkdir(&self, parent: u64, name: &[u8]) -> MountResult<NodeAttr>;

    /// Removes the file `name` from `parent`.
    fn unlink(&self, parent: u64, name: &[u8]) -> MountResult<()>;

    /// Removes the empty directory `name` from `parent`.
    fn rmdir(&self, parent: u64, name: &[u8]) -> MountResult<()>;

    /// Adds `name` under `parent` as another name for `ino`.
    fn link(&self, ino: u64, parent: u64, name: &[u8]) -> MountResult<NodeAttr>;

    /// Enumerates `ino` from cursor `*pos`; see [`crate::dir_iter::iterate`].
    fn readdir(
        &self,
        ino: u64,
        pos: &mut u64,
        emit: &mut dyn FnMut(DirRecord<'_>) -> bool,
    ) -> MountResult<usize>;
}

/// Operations on file nodes.
pub trait FileOperations {
    /// Opens `ino` with the host's open `flags`.
    fn open(&self, ino: u64, flags: i32) -> MountResult<OpenFile>;

    /// Reads up to `size` bytes at `offset`.
    fn read(&self, ino: u64, fh: u64, offset: u64, size: usize) -> MountResult<Vec<u8>>;

    /// Writes `data` at `offset`, returning the number of bytes taken.
    fn write(&self, ino: u64, fh: u64, offset: u64, data: &[u8]) -> MountResult<usize>;

    /// Persists the handle's content remotely.
    fn flush(&self, ino: u64, fh: u64) -> MountResult<()>;

    /// Same as [`flush`](Self::flush).
    fn fsync(&self, ino: u64, fh: u64) -> MountResult<()> {
        self.flush(ino, fh)
    }

    /// Frees the handle. Unknown handles are ignored.
    fn release(&self, ino: u64, fh: u64) -> MountResult<()>;
}

/// Operations of one node, selected by its kind.
#[derive(Clone, Copy)]
pub enum NodeOps<'a> {
    /// The node is a directory.
    Directory(&'a dyn DirectoryOperations),
    /// The node is a file.
    File(&'a dyn FileOperations),
}

impl NodeOps<'_> {
    /// Kind of the node.
    pub fn kind(&self) -> EntryKind {
        match self {
            NodeOps::Directory(_) => EntryKind::Directory,
            NodeOps::File(_) => EntryKind::File,
        }
    }
}
