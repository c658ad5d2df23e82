//! The mounted networkfs filesystem.
//!
//! [`NetworkFs`] owns everything one mount needs: the token-bound API, the
//! table of resolved nodes, and the open content sessions. It implements
//! [`DirectoryOperations`] and [`FileOperations`]; the host dispatches into
//! it through [`NetworkFs::operations`].

use crate::config::MountConfig;
use crate::dir_iter::{self, DirRecord};
use crate::error::{MountError, MountResult};
use crate::handles::{SessionHandle, SessionTable};
use crate::node::NodeTable;
use crate::ops::{DirectoryOperations, FileOperations, NodeAttr, NodeOps, OpenFile};
use crate::session::ContentSession;
use netfs_core::{EntryKind, NetworkFsApi, Token, Transport, MAX_FILE_SIZE};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// One networkfs mount.
#[derive(Debug)]
pub struct NetworkFs {
    api: NetworkFsApi,
    config: MountConfig,
    nodes: NodeTable,
    sessions: SessionTable,
}

impl NetworkFs {
    /// Mounts the remote namespace named by `source`.
    ///
    /// The source string is used verbatim as the token for every call. An
    /// empty source aborts the mount.
    pub fn mount(
        source: &str,
        transport: Arc<dyn Transport>,
        config: MountConfig,
    ) -> MountResult<Self> {
        let token = Token::new(source).inspect_err(|e| error!(error = %e, "Refusing to mount"))?;
        info!(token = %token, root = config.root_inode, "Mounting networkfs");
        Ok(Self {
            api: NetworkFsApi::new(transport, token),
            nodes: NodeTable::new(config.root_inode),
            sessions: SessionTable::new(),
            config,
        })
    }

    /// Unmounts, releasing any sessions still open without flushing them.
    pub fn unmount(self) {
        drop(self);
    }

    /// The mount token.
    pub fn token(&self) -> &Token {
        self.api.token()
    }

    /// The mount configuration.
    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// The remote API bound to this mount.
    pub fn api(&self) -> &NetworkFsApi {
        &self.api
    }

    /// Inode number of the root directory.
    pub fn root(&self) -> u64 {
        self.nodes.root()
    }

    /// The table of resolved nodes.
    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    /// Number of open file handles.
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Selects the operations of `ino` by its kind.
    pub fn operations(&self, ino: u64) -> MountResult<NodeOps<'_>> {
        match self.nodes.kind(ino) {
            Some(EntryKind::Directory) => Ok(NodeOps::Directory(self)),
            Some(EntryKind::File) => Ok(NodeOps::File(self)),
            None => Err(MountError::InvalidInode(ino)),
        }
    }

    /// Returns the attributes of a resolved node.
    pub fn getattr(&self, ino: u64) -> MountResult<NodeAttr> {
        trace!(inode = ino, "getattr");
        let node = self.nodes.get(ino).ok_or(MountError::InvalidInode(ino))?;
        let (size, perm) = match node.kind {
            EntryKind::Directory => (0, self.config.dir_perm),
            EntryKind::File => (node.size(), self.config.file_perm),
        };
        Ok(NodeAttr {
            ino,
            kind: node.kind,
            size,
            nlink: node.nlink(),
            perm,
            uid: self.config.uid,
            gid: self.config.gid,
        })
    }

    /// Sets the size of file `ino`.
    ///
    /// The buffer of every session open on `ino` is truncated or
    /// zero-extended and becomes dirty, so the next flush persists the new
    /// size. A given `fh` must be a session of `ino`.
    pub fn set_size(&self, ino: u64, fh: Option<u64>, size: u64) -> MountResult<NodeAttr> {
        trace!(inode = ino, fh = ?fh, size, "set_size");
        self.require_file(ino)?;
        if size > MAX_FILE_SIZE as u64 {
            warn!(inode = ino, size, "Size beyond file limit rejected");
            return Err(MountError::FileTooLarge { size });
        }
        if let Some(fh) = fh {
            self.session(ino, fh)?;
        }
        let sessions = self.sessions.for_inode(ino);
        for handle in &sessions {
            handle.lock().set_size(size)?;
        }
        self.nodes.set_size(ino, size);
        debug!(inode = ino, size, sessions = sessions.len(), "Resized file");
        self.getattr(ino)
    }

    fn require_directory(&self, ino: u64) -> MountResult<()> {
        let checked = match self.nodes.kind(ino) {
            Some(EntryKind::Directory) => Ok(()),
            Some(EntryKind::File) => Err(MountError::NotADirectory(ino)),
            None => Err(MountError::InvalidInode(ino)),
        };
        checked.inspect_err(|e| debug!(inode = ino, error = %e, "Directory required"))
    }

    fn require_file(&self, ino: u64) -> MountResult<()> {
        let checked = match self.nodes.kind(ino) {
            Some(EntryKind::File) => Ok(()),
            Some(EntryKind::Directory) => Err(MountError::IsADirectory(ino)),
            None => Err(MountError::InvalidInode(ino)),
        };
        checked.inspect_err(|e| debug!(inode = ino, error = %e, "File required"))
    }

    fn session(&self, ino: u64, fh: u64) -> MountResult<SessionHandle> {
        let handle = self.sessions.get(fh).filter(|handle| handle.lock().ino() == ino);
        handle.ok_or_else(|| {
            debug!(inode = ino, fh, "No session for handle");
            MountError::InvalidHandle(fh)
        })
    }

    fn make_node(&self, parent: u64, name: &[u8], kind: EntryKind) -> MountResult<NodeAttr> {
        self.require_directory(parent)?;
        let ino = self.api.create(parent, name, kind)?;
        self.nodes.attach(parent, name, ino, kind);
        debug!(
            parent,
            name = %name.escape_ascii(),
            inode = ino,
            kind = kind.wire_name(),
            "Created node"
        );
        self.getattr(ino)
    }

    fn remove_node(&self, parent: u64, name: &[u8], kind: EntryKind) -> MountResult<()> {
        self.require_directory(parent)?;
        self.api.remove(parent, name, kind)?;
        let removed = self.nodes.detach(parent, name);
        debug!(
            parent,
            name = %name.escape_ascii(),
            inode = ?removed,
            kind = kind.wire_name(),
            "Removed node"
        );
        Ok(())
    }
}

impl DirectoryOperations for NetworkFs {
    fn lookup(&self, parent: u64, name: &[u8]) -> MountResult<NodeAttr> {
        trace!(parent, name = %name.escape_ascii(), "lookup");
        self.require_directory(parent)?;
        let Some(info) = self.api.lookup(parent, name)? else {
            debug!(parent, name = %name.escape_ascii(), "No such entry");
            self.nodes.detach(parent, name);
            return Err(MountError::NotFound(String::from_utf8_lossy(name).into_owned()));
        };
        self.nodes.attach(parent, name, info.ino, info.kind);
        self.getattr(info.ino)
    }

    fn create(&self, parent: u64, name: &[u8]) -> MountResult<NodeAttr> {
        trace!(parent, name = %name.escape_ascii(), "create");
        self.make_node(parent, name, EntryKind::File)
    }

    fn mkdir(&self, parent: u64, name: &[u8]) -> MountResult<NodeAttr> {
        trace!(parent, name = %name.escape_ascii(), "mkdir");
        self.make_node(parent, name, EntryKind::Directory)
    }

    fn unlink(&self, parent: u64, name: &[u8]) -> MountResult<()> {
        trace!(parent, name = %name.escape_ascii(), "unlink");
        self.remove_node(parent, name, EntryKind::File)
    }

    fn rmdir(&self, parent: u64, name: &[u8]) -> MountResult<()> {
        trace!(parent, name = %name.escape_ascii(), "rmdir");
        self.remove_node(parent, name, EntryKind::Directory)
    }

    fn link(&self, ino: u64, parent: u64, name: &[u8]) -> MountResult<NodeAttr> {
        trace!(inode = ino, parent, name = %name.escape_ascii(), "link");
        let kind = self.nodes.kind(ino).ok_or(MountError::InvalidInode(ino))?;
        self.require_directory(parent)?;
        self.api.link(ino, parent, name)?;
        self.nodes.attach(parent, name, ino, kind);
        self.getattr(ino)
    }

    fn readdir(
        &self,
        ino: u64,
        pos: &mut u64,
        emit: &mut dyn FnMut(DirRecord<'_>) -> bool,
    ) -> MountResult<usize> {
        trace!(inode = ino, offset = *pos, "readdir");
        self.require_directory(ino)?;
        let parent = self.nodes.parent(ino).unwrap_or(self.nodes.root());
        Ok(dir_iter::iterate(&self.api, ino, parent, pos, emit))
    }
}

impl FileOperations for NetworkFs {
    fn open(&self, ino: u64, flags: i32) -> MountResult<OpenFile> {
        trace!(inode = ino, flags, "open");
        self.require_file(ino)?;
        let mut session = ContentSession::open(&self.api, ino)?;
        if flags & libc::O_TRUNC != 0 {
            session.set_size(0)?;
        }
        let size = session.size() as u64;
        self.nodes.set_size(ino, size);
        let fh = self.sessions.insert(session);
        let offset = if flags & libc::O_APPEND != 0 { size } else { 0 };
        debug!(inode = ino, fh, size, offset, "Opened file");
        Ok(OpenFile { fh, offset })
    }

    fn read(&self, ino: u64, fh: u64, offset: u64, size: usize) -> MountResult<Vec<u8>> {
        trace!(inode = ino, fh, offset, size, "read");
        let handle = self.session(ino, fh)?;
        let session = handle.lock();
        let data = session
            .read(offset, size)
            .inspect_err(|e| debug!(inode = ino, fh, offset, error = %e, "Read rejected"))?;
        Ok(data.to_vec())
    }

    fn write(&self, ino: u64, fh: u64, offset: u64, data: &[u8]) -> MountResult<usize> {
        trace!(inode = ino, fh, offset, len = data.len(), "write");
        let handle = self.session(ino, fh)?;
        let mut session = handle.lock();
        let written = session
            .write(offset, data)
            .inspect_err(|e| warn!(inode = ino, fh, offset, error = %e, "Write rejected"))?;
        self.nodes.set_size(ino, session.size() as u64);
        Ok(written)
    }

    fn flush(&self, ino: u64, fh: u64) -> MountResult<()> {
        trace!(inode = ino, fh, "flush");
        let handle = self.session(ino, fh)?;
        handle
            .lock()
            .flush(&self.api)
            .inspect_err(|e| warn!(inode = ino, fh, error = %e, "Flush failed"))
    }

    fn release(&self, ino: u64, fh: u64) -> MountResult<()> {
        trace!(inode = ino, fh, "release");
        match self.sessions.remove(fh) {
            Some(handle) => {
                handle.lock().release();
            }
            None => debug!(fh, "Release of unknown handle ignored"),
        }
        Ok(())
    }
}

impl Drop for NetworkFs {
    fn drop(&mut self) {
        let released = self
            .sessions
            .drain()
            .into_iter()
            .filter(|(_, handle)| handle.lock().release())
            .count();
        info!(token = %self.api.token(), released, "Destroying networkfs");
    }
}
