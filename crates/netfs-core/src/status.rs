//! Remote status codes and their log messages.

use std::fmt;

/// Messages for the status codes 0..=8, indexed by code.
const STATUS_MESSAGES: [&str; 9] = [
    "success",
    "object with specified inode number not found",
    "object is not a file",
    "object is not a directory",
    "no entry with specified name in the directory",
    "entry with specified name already exists in the directory",
    "file size limit exceeded (512 bytes)",
    "directory entry limit exceeded (16 entries)",
    "directory is not empty",
];

/// Message logged for codes outside the table.
pub const UNKNOWN_STATUS_MESSAGE: &str = "unknown code";

/// Returns the human-readable message for a raw status code.
pub fn status_message(code: u64) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|idx| STATUS_MESSAGES.get(idx))
        .copied()
        .unwrap_or(UNKNOWN_STATUS_MESSAGE)
}

/// A non-success status reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteStatus {
    /// No object with the given inode number.
    ObjectNotFound,
    /// The object is not a file.
    NotAFile,
    /// The object is not a directory.
    NotADirectory,
    /// No entry with the given name in the directory.
    NoSuchEntry,
    /// An entry with the given name already exists.
    EntryAlreadyExists,
    /// The 512-byte file size limit was exceeded.
    FileSizeExceeded,
    /// The 16-entry directory limit was exceeded.
    DirectoryFull,
    /// The directory still has entries.
    DirectoryNotEmpty,
    /// A code outside the known table.
    Unknown(u64),
}

impl RemoteStatus {
    /// Classifies a raw status code. Returns `None` for success (0).
    pub fn from_code(code: u64) -> Option<Self> {
        let status = match code {
            0 => return None,
            1 => RemoteStatus::ObjectNotFound,
            2 => RemoteStatus::NotAFile,
            3 => RemoteStatus::NotADirectory,
            4 => RemoteStatus::NoSuchEntry,
            5 => RemoteStatus::EntryAlreadyExists,
            6 => RemoteStatus::FileSizeExceeded,
            7 => RemoteStatus::DirectoryFull,
            8 => RemoteStatus::DirectoryNotEmpty,
            other => RemoteStatus::Unknown(other),
        };
        Some(status)
    }

    /// Raw status code.
    pub fn code(self) -> u64 {
        match self {
            RemoteStatus::ObjectNotFound => 1,
            RemoteStatus::NotAFile => 2,
            RemoteStatus::NotADirectory => 3,
            RemoteStatus::NoSuchEntry => 4,
            RemoteStatus::EntryAlreadyExists => 5,
            RemoteStatus::FileSizeExceeded => 6,
            RemoteStatus::DirectoryFull => 7,
            RemoteStatus::DirectoryNotEmpty => 8,
            RemoteStatus::Unknown(code) => code,
        }
    }

    /// Log message for this status.
    pub fn message(self) -> &'static str {
        status_message(self.code())
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {} ({})", self.code(), self.message())
    }
}
