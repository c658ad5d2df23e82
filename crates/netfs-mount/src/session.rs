//! Per-open-file content sessions.
//!
//! A [`ContentSession`] holds the whole content of one open file. It is
//! filled from the remote service on open, serves reads and writes locally,
//! and is written back in full on flush:
//!
//! 1. **Open**: the content is fetched and the buffer allocated once
//! 2. **Read/Write**: bounded copies at an offset, no remote traffic
//! 3. **Flush**: if modified, the buffer replaces the remote content
//! 4. **Release**: the buffer is freed; later operations fail

use crate::error::{MountError, MountResult};
use netfs_core::{NetfsError, NetworkFsApi, MAX_FILE_SIZE};
use std::fmt;
use tracing::{debug, trace};

/// Buffer capacity: the content plus its terminator slot.
const BUFFER_CAPACITY: usize = MAX_FILE_SIZE + 1;

/// Number of bytes shown by [`ContentPreview`].
const PREVIEW_LEN: usize = 64;

/// Content buffer of one open file handle.
#[derive(Debug)]
pub struct ContentSession {
    ino: u64,
    /// `None` once released. The length is the current size.
    buffer: Option<Vec<u8>>,
    dirty: bool,
}

impl ContentSession {
    /// Fetches the content of `ino` and opens a clean session over it.
    pub fn open(api: &NetworkFsApi, ino: u64) -> MountResult<Self> {
        let content = api.read(ino)?;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(BUFFER_CAPACITY)
            .map_err(|_| NetfsError::OutOfMemory {
                bytes: BUFFER_CAPACITY,
            })?;
        buffer.extend_from_slice(&content.bytes);
        debug!(inode = ino, size = buffer.len(), "Opened content session");
        Ok(Self::from_buffer(ino, buffer))
    }

    fn from_buffer(ino: u64, buffer: Vec<u8>) -> Self {
        Self {
            ino,
            buffer: Some(buffer),
            dirty: false,
        }
    }

    /// Inode number of the file.
    pub fn ino(&self) -> u64 {
        self.ino
    }

    /// Current size in bytes (zero once released).
    pub fn size(&self) -> usize {
        self.buffer.as_ref().map_or(0, Vec::len)
    }

    /// Whether the buffer differs from the last flushed content.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the session still holds its buffer.
    pub fn is_open(&self) -> bool {
        self.buffer.is_some()
    }

    /// Current content.
    pub fn content(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    /// Reads up to `len` bytes at `offset`.
    ///
    /// Returns `min(len, size - offset)` bytes. An offset past the current
    /// size is rejected.
    pub fn read(&self, offset: u64, len: usize) -> MountResult<&[u8]> {
        let buffer = self.buffer.as_ref().ok_or(MountError::SessionReleased)?;
        let size = buffer.len();
        let start = usize::try_from(offset)
            .ok()
            .filter(|&start| start <= size)
            .ok_or(MountError::OffsetOutOfRange { offset, size })?;
        let end = start + len.min(size - start);
        Ok(&buffer[start..end])
    }

    /// Writes `data` at `offset` and returns the number of bytes taken.
    ///
    /// Bytes that would land at or past the file size limit are dropped.
    /// A gap between the current size and `offset` is zero-filled. An empty
    /// write changes nothing.
    pub fn write(&mut self, offset: u64, data: &[u8]) -> MountResult<usize> {
        let buffer = self.buffer.as_mut().ok_or(MountError::SessionReleased)?;
        let start = usize::try_from(offset)
            .ok()
            .filter(|&start| start < MAX_FILE_SIZE)
            .ok_or(MountError::QuotaExceeded { offset })?;
        let written = data.len().min(MAX_FILE_SIZE - start);
        if written == 0 {
            return Ok(0);
        }
        let end = start + written;
        if end > buffer.len() {
            buffer.resize(end, 0);
        }
        buffer[start..end].copy_from_slice(&data[..written]);
        self.dirty = true;
        Ok(written)
    }

    /// Truncates or zero-extends the content to `size` bytes.
    pub fn set_size(&mut self, size: u64) -> MountResult<()> {
        let buffer = self.buffer.as_mut().ok_or(MountError::SessionReleased)?;
        let size = usize::try_from(size)
            .ok()
            .filter(|&size| size <= MAX_FILE_SIZE)
            .ok_or(MountError::FileTooLarge { size })?;
        if size != buffer.len() {
            buffer.resize(size, 0);
            self.dirty = true;
        }
        Ok(())
    }

    /// Writes the buffer back to the remote service if it was modified.
    ///
    /// A clean session issues no call, so repeated flushes are harmless.
    /// The session stays usable afterwards.
    pub fn flush(&mut self, api: &NetworkFsApi) -> MountResult<()> {
        let buffer = self.buffer.as_ref().ok_or(MountError::SessionReleased)?;
        if !self.dirty {
            trace!(inode = self.ino, "Session clean, nothing to flush");
            return Ok(());
        }
        trace!(
            inode = self.ino,
            content = %ContentPreview::new(buffer),
            "Flushing content session"
        );
        api.write(self.ino, buffer)?;
        self.dirty = false;
        Ok(())
    }

    /// Frees the buffer. Returns false if it was already released.
    pub fn release(&mut self) -> bool {
        self.dirty = false;
        let released = self.buffer.take().is_some();
        if released {
            debug!(inode = self.ino, "Released content session");
        }
        released
    }
}

/// Length-bounded, escaped view of content for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct ContentPreview<'a> {
    bytes: &'a [u8],
}

impl<'a> ContentPreview<'a> {
    /// Wraps `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl fmt::Display for ContentPreview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.bytes.len().min(PREVIEW_LEN);
        write!(f, "\"{}\"", self.bytes[..shown].escape_ascii())?;
        if shown < self.bytes.len() {
            write!(f, "... ({} bytes)", self.bytes.len())?;
        }
        Ok(())
    }
}
