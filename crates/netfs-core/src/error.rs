//! Error types for the networkfs adapter.

use crate::rpc::Method;
use crate::status::RemoteStatus;
use std::io;
use thiserror::Error;

/// Errors returned by [`NetworkFsApi`](crate::NetworkFsApi) operations.
#[derive(Debug, Error)]
pub enum NetfsError {
    /// The remote service answered with a non-zero status.
    #[error("method {method} returned {status}")]
    Remote {
        /// Method that failed.
        method: Method,
        /// Remote status.
        status: RemoteStatus,
    },

    /// Rejected locally before any call was issued.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// Response buffer allocation failed.
    #[error("out of memory allocating {bytes} bytes")]
    OutOfMemory {
        /// Requested allocation size.
        bytes: usize,
    },

    /// The transport could not complete the call.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body did not match the expected record.
    #[error("malformed response: {0}")]
    Decode(#[from] DecodeError),
}

impl NetfsError {
    /// Returns the remote status if this error came from the service.
    pub fn remote_status(&self) -> Option<RemoteStatus> {
        match self {
            NetfsError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the service reported that the named entry does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.remote_status(),
            Some(RemoteStatus::NoSuchEntry | RemoteStatus::ObjectNotFound)
        )
    }
}

/// Local validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    /// Name is longer than the protocol allows.
    #[error("name of {len} bytes exceeds the {max}-byte limit")]
    NameTooLong {
        /// Actual length.
        len: usize,
        /// Protocol limit.
        max: usize,
    },

    /// Content is longer than the protocol allows.
    #[error("content of {len} bytes exceeds the {max}-byte limit")]
    ContentTooLarge {
        /// Actual length.
        len: usize,
        /// Protocol limit.
        max: usize,
    },

    /// The mount source string was empty.
    #[error("mount token is empty")]
    EmptyToken,
}

/// Failures of the underlying transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O failure talking to the service.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The service sent a body that does not fit the response buffer.
    #[error("response of {actual} bytes does not fit a {capacity}-byte buffer")]
    ResponseTooLarge {
        /// Buffer capacity.
        capacity: usize,
        /// Body length.
        actual: usize,
    },

    /// Protocol violation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Wire record decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Buffer length differs from the record size.
    #[error("expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Record size.
        expected: usize,
        /// Buffer length.
        actual: usize,
    },

    /// Entry type byte is neither `DT_DIR` nor `DT_REG`.
    #[error("unknown entry type {0}")]
    UnknownEntryType(u8),

    /// Listing count exceeds the per-listing limit.
    #[error("listing reports {0} entries")]
    TooManyEntries(u64),

    /// Declared content length exceeds the file size limit.
    #[error("content declares {0} bytes")]
    ContentTooLong(u64),

    /// Malformed `%xx` escape at the given byte offset.
    #[error("invalid escape at offset {0}")]
    InvalidEscape(usize),
}

/// Result type for adapter operations.
pub type NetfsResult<T> = Result<T, NetfsError>;
