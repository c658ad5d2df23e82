//! Error handling and errno mapping for filesystem operations.
//!
//! Remote status codes are mapped to positive libc errno values here. Hosts
//! that expect the negative convention negate the result themselves.

use netfs_core::{InvalidArgument, NetfsError, RemoteStatus};
use thiserror::Error;

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum MountError {
    /// Adapter error, including remote statuses and local validation.
    #[error("networkfs operation failed: {0}")]
    Api(#[from] NetfsError),

    /// The remote service has no entry with this name.
    #[error("No such entry: {0}")]
    NotFound(String),

    /// Unknown inode.
    #[error("Invalid inode: {0}")]
    InvalidInode(u64),

    /// Unknown file handle.
    #[error("Invalid file handle: {0}")]
    InvalidHandle(u64),

    /// Directory operation on a file.
    #[error("Not a directory: {0}")]
    NotADirectory(u64),

    /// File operation on a directory.
    #[error("Is a directory: {0}")]
    IsADirectory(u64),

    /// Read offset past the current size.
    #[error("offset {offset} is past the end of a {size}-byte file")]
    OffsetOutOfRange {
        /// Requested offset.
        offset: u64,
        /// Current size.
        size: usize,
    },

    /// Write offset at or past the file size limit.
    #[error("offset {offset} leaves no room below the file size limit")]
    QuotaExceeded {
        /// Requested offset.
        offset: u64,
    },

    /// Requested size above the file size limit.
    #[error("size {size} exceeds the file size limit")]
    FileTooLarge {
        /// Requested size.
        size: u64,
    },

    /// The session holds no content buffer.
    #[error("session has been released")]
    SessionReleased,
}

impl MountError {
    /// Converts this error to a positive libc error code.
    pub fn to_errno(&self) -> i32 {
        match self {
            MountError::Api(e) => netfs_error_to_errno(e),
            MountError::NotFound(_) | MountError::InvalidInode(_) => libc::ENOENT,
            MountError::InvalidHandle(_) | MountError::SessionReleased => libc::EBADF,
            MountError::NotADirectory(_) => libc::ENOTDIR,
            MountError::IsADirectory(_) => libc::EISDIR,
            MountError::OffsetOutOfRange { .. } => libc::EINVAL,
            MountError::QuotaExceeded { .. } => libc::EDQUOT,
            MountError::FileTooLarge { .. } => libc::EFBIG,
        }
    }
}

impl From<InvalidArgument> for MountError {
    fn from(e: InvalidArgument) -> Self {
        MountError::Api(NetfsError::InvalidArgument(e))
    }
}

/// Converts an adapter error to a libc error code.
pub fn netfs_error_to_errno(e: &NetfsError) -> i32 {
    match e {
        NetfsError::Remote { status, .. } => status_to_errno(*status),
        NetfsError::InvalidArgument(_) => libc::EINVAL,
        NetfsError::OutOfMemory { .. } => libc::ENOMEM,
        NetfsError::Transport(_) | NetfsError::Decode(_) => libc::EIO,
    }
}

/// Converts a remote status to a libc error code.
pub fn status_to_errno(status: RemoteStatus) -> i32 {
    match status {
        RemoteStatus::ObjectNotFound | RemoteStatus::NoSuchEntry => libc::ENOENT,
        RemoteStatus::NotAFile => libc::EISDIR,
        RemoteStatus::NotADirectory => libc::ENOTDIR,
        RemoteStatus::EntryAlreadyExists => libc::EEXIST,
        RemoteStatus::FileSizeExceeded => libc::EFBIG,
        RemoteStatus::DirectoryFull => libc::ENOSPC,
        RemoteStatus::DirectoryNotEmpty => libc::ENOTEMPTY,
        RemoteStatus::Unknown(_) => libc::EIO,
    }
}

/// Result type for filesystem operations.
pub type MountResult<T> = Result<T, MountError>;

#[cfg(test)]
mod tests {
    use super::*;
    use netfs_core::{DecodeError, Method, TransportError};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (1, libc::ENOENT),
            (2, libc::EISDIR),
            (3, libc::ENOTDIR),
            (4, libc::ENOENT),
            (5, libc::EEXIST),
            (6, libc::EFBIG),
            (7, libc::ENOSPC),
            (8, libc::ENOTEMPTY),
            (99, libc::EIO),
        ];
        for (code, errno) in cases {
            let status = RemoteStatus::from_code(code).unwrap();
            assert_eq!(status_to_errno(status), errno, "code {code}");
        }
    }

    #[test]
    fn test_errno_is_positive() {
        let e = MountError::from(NetfsError::Remote {
            method: Method::Rmdir,
            status: RemoteStatus::DirectoryNotEmpty,
        });
        assert_eq!(e.to_errno(), libc::ENOTEMPTY);
        assert!(e.to_errno() > 0);
    }

    #[test]
    fn test_local_errors() {
        let e = MountError::from(InvalidArgument::NameTooLong { len: 300, max: 255 });
        assert_eq!(e.to_errno(), libc::EINVAL);
        assert_eq!(
            MountError::from(NetfsError::OutOfMemory { bytes: 528 }).to_errno(),
            libc::ENOMEM
        );
        assert_eq!(
            MountError::from(NetfsError::Decode(DecodeError::UnknownEntryType(1))).to_errno(),
            libc::EIO
        );
        assert_eq!(
            MountError::from(NetfsError::Transport(TransportError::Protocol("x".into())))
                .to_errno(),
            libc::EIO
        );
        assert_eq!(MountError::QuotaExceeded { offset: 512 }.to_errno(), libc::EDQUOT);
        assert_eq!(
            MountError::OffsetOutOfRange { offset: 11, size: 10 }.to_errno(),
            libc::EINVAL
        );
        assert_eq!(MountError::InvalidHandle(3).to_errno(), libc::EBADF);
        assert_eq!(MountError::SessionReleased.to_errno(), libc::EBADF);
        assert_eq!(MountError::InvalidInode(3).to_errno(), libc::ENOENT);
        assert_eq!(MountError::NotFound("a".into()).to_errno(), libc::ENOENT);
        assert_eq!(MountError::FileTooLarge { size: 600 }.to_errno(), libc::EFBIG);
    }
}
