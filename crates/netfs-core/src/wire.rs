//! Fixed-layout response records of the networkfs protocol.
//!
//! The remote service answers with C-layout structs (little-endian, natural
//! alignment). Each record has a compile-time size, and the RPC client sizes
//! its response buffer to exactly that size before issuing a call.
//!
//! | Record | Layout | Size |
//! |---|---|---|
//! | [`Entry`] | `u8` type, 7 pad, `u64` inode, 256-byte name | 272 |
//! | [`EntryList`] | `u64` count, 16 × [`Entry`] | 4360 |
//! | [`EntryInfo`] | `u8` type, 7 pad, `u64` inode | 16 |
//! | [`Content`] | `u64` length, 513 bytes, 7 pad | 528 |
//! | created inode | `u64` | 8 |
//!
//! Decoding validates only what the type system needs: the buffer length,
//! the entry type byte, and the bounded count/length fields.

use crate::error::DecodeError;

/// Maximum raw name length in bytes.
pub const MAX_NAME_LEN: usize = 256;

/// Maximum raw file size in bytes.
pub const MAX_FILE_SIZE: usize = 512;

/// Maximum number of entries reported by one listing.
pub const MAX_ENTRIES: usize = 16;

/// Inode number of the mount root.
pub const ROOT_INODE: u64 = 1000;

/// `DT_DIR` directory entry type byte.
pub const DT_DIR: u8 = 4;

/// `DT_REG` regular file entry type byte.
pub const DT_REG: u8 = 8;

/// Encoded size of one [`Entry`].
pub const ENTRY_RECORD_SIZE: usize = 16 + MAX_NAME_LEN;

/// Encoded size of an [`EntryList`].
pub const ENTRY_LIST_RECORD_SIZE: usize = 8 + MAX_ENTRIES * ENTRY_RECORD_SIZE;

/// Encoded size of an [`EntryInfo`].
pub const ENTRY_INFO_RECORD_SIZE: usize = 16;

/// Encoded size of a [`Content`] record (513 content bytes padded to 8).
pub const CONTENT_RECORD_SIZE: usize = 8 + (MAX_FILE_SIZE + 1).next_multiple_of(8);

/// Encoded size of the inode number returned by `create`.
pub const INODE_RECORD_SIZE: usize = 8;

/// Type of a directory child. The protocol knows exactly these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A directory.
    Directory,
    /// A regular file.
    File,
}

impl EntryKind {
    /// Decodes the `DT_*` type byte.
    pub fn from_dtype(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            DT_DIR => Ok(EntryKind::Directory),
            DT_REG => Ok(EntryKind::File),
            other => Err(DecodeError::UnknownEntryType(other)),
        }
    }

    /// The `DT_*` type byte.
    pub fn dtype(self) -> u8 {
        match self {
            EntryKind::Directory => DT_DIR,
            EntryKind::File => DT_REG,
        }
    }

    /// The value of the `type` argument of `create`.
    pub fn wire_name(self) -> &'static str {
        match self {
            EntryKind::Directory => "directory",
            EntryKind::File => "file",
        }
    }

    /// Returns true for directories.
    pub fn is_directory(self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// One directory child as reported by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Child type.
    pub kind: EntryKind,
    /// Child inode number.
    pub ino: u64,
    /// Raw name bytes (never longer than [`MAX_NAME_LEN`]).
    pub name: Vec<u8>,
}

impl Entry {
    fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let kind = EntryKind::from_dtype(buf[0])?;
        let ino = read_u64(&buf[8..16]);
        let raw_name = &buf[16..ENTRY_RECORD_SIZE];
        let name_len = raw_name.iter().position(|&b| b == 0).unwrap_or(MAX_NAME_LEN);
        Ok(Self {
            kind,
            ino,
            name: raw_name[..name_len].to_vec(),
        })
    }

    fn encode_into(&self, out: &mut [u8]) {
        out[0] = self.kind.dtype();
        out[8..16].copy_from_slice(&self.ino.to_le_bytes());
        let len = self.name.len().min(MAX_NAME_LEN);
        out[16..16 + len].copy_from_slice(&self.name[..len]);
    }
}

/// A bounded directory snapshot returned by `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryList {
    /// Entries in listing order, at most [`MAX_ENTRIES`].
    pub entries: Vec<Entry>,
}

impl EntryList {
    /// Decodes an `entries` record.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        expect_len(buf, ENTRY_LIST_RECORD_SIZE)?;
        let count = read_u64(&buf[..8]);
        if count > MAX_ENTRIES as u64 {
            return Err(DecodeError::TooManyEntries(count));
        }
        let entries = buf[8..]
            .chunks_exact(ENTRY_RECORD_SIZE)
            .take(count as usize)
            .map(Entry::decode)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Encodes this list as an `entries` record.
    ///
    /// Entries beyond [`MAX_ENTRIES`] are not representable and are dropped.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; ENTRY_LIST_RECORD_SIZE];
        let count = self.entries.len().min(MAX_ENTRIES);
        out[..8].copy_from_slice(&(count as u64).to_le_bytes());
        for (entry, slot) in self
            .entries
            .iter()
            .zip(out[8..].chunks_exact_mut(ENTRY_RECORD_SIZE))
        {
            entry.encode_into(slot);
        }
        out
    }

    /// Number of listed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the directory has no remote children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolved identity of a named child, returned by `lookup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    /// Child type.
    pub kind: EntryKind,
    /// Child inode number.
    pub ino: u64,
}

impl EntryInfo {
    /// Decodes an `entry_info` record.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        expect_len(buf, ENTRY_INFO_RECORD_SIZE)?;
        Ok(Self {
            kind: EntryKind::from_dtype(buf[0])?,
            ino: read_u64(&buf[8..16]),
        })
    }

    /// Encodes this value as an `entry_info` record.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; ENTRY_INFO_RECORD_SIZE];
        out[0] = self.kind.dtype();
        out[8..16].copy_from_slice(&self.ino.to_le_bytes());
        out
    }
}

/// Full file body returned by `read`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    /// File bytes (exactly the remote-declared length, at most [`MAX_FILE_SIZE`]).
    pub bytes: Vec<u8>,
}

impl Content {
    /// Decodes a `content` record.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        expect_len(buf, CONTENT_RECORD_SIZE)?;
        let declared = read_u64(&buf[..8]);
        if declared > MAX_FILE_SIZE as u64 {
            return Err(DecodeError::ContentTooLong(declared));
        }
        Ok(Self {
            bytes: buf[8..8 + declared as usize].to_vec(),
        })
    }

    /// Encodes this body as a `content` record.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; CONTENT_RECORD_SIZE];
        let len = self.bytes.len().min(MAX_FILE_SIZE);
        out[..8].copy_from_slice(&(len as u64).to_le_bytes());
        out[8..8 + len].copy_from_slice(&self.bytes[..len]);
        out
    }

    /// Declared content length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for an empty file.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decodes the inode number returned by `create`.
pub fn decode_inode(buf: &[u8]) -> Result<u64, DecodeError> {
    expect_len(buf, INODE_RECORD_SIZE)?;
    Ok(read_u64(buf))
}

fn expect_len(buf: &[u8], expected: usize) -> Result<(), DecodeError> {
    if buf.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::SizeMismatch {
            expected,
            actual: buf.len(),
        })
    }
}

fn read_u64(buf: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[..8]);
    u64::from_le_bytes(raw)
}
