//! RPC call shaping: tokens, methods, argument formatting and the client.
//!
//! The [`Transport`] performs the actual request. Everything the adapter
//! controls about a call lives here: which method name is sent, how inode
//! numbers are rendered, and how large the response buffer is.

use crate::error::{InvalidArgument, NetfsError, NetfsResult, TransportError};
use crate::status::{status_message, RemoteStatus};
use crate::wire::{
    CONTENT_RECORD_SIZE, ENTRY_INFO_RECORD_SIZE, ENTRY_LIST_RECORD_SIZE, INODE_RECORD_SIZE,
};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Performs one request against the remote service.
///
/// Implementations fill `response` with the response body (which must fit
/// its length) and return the remote status code. A non-zero code means the
/// call did not apply and the contents of `response` are unspecified.
pub trait Transport: Send + Sync {
    /// Issues `method` with the ordered `args` on behalf of `token`.
    fn call(
        &self,
        token: &str,
        method: &str,
        args: &[(&str, &str)],
        response: &mut [u8],
    ) -> Result<u64, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn call(
        &self,
        token: &str,
        method: &str,
        args: &[(&str, &str)],
        response: &mut [u8],
    ) -> Result<u64, TransportError> {
        (**self).call(token, method, args, response)
    }
}

/// Per-mount bearer token, taken verbatim from the mount source string.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(Arc<str>);

impl Token {
    /// Creates a token from a mount source string.
    pub fn new(source: &str) -> Result<Self, InvalidArgument> {
        if source.is_empty() {
            return Err(InvalidArgument::EmptyToken);
        }
        Ok(Self(Arc::from(source)))
    }

    /// The token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.0).finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decimal digits of `u64::MAX`.
const INODE_DIGITS: usize = 20;

/// Allocation-free decimal rendering of an inode number.
#[derive(Clone, Copy)]
pub struct InodeString {
    buf: [u8; INODE_DIGITS],
    start: usize,
}

impl InodeString {
    /// Renders `ino` in decimal.
    pub fn new(ino: u64) -> Self {
        let mut buf = [b'0'; INODE_DIGITS];
        let mut start = INODE_DIGITS;
        let mut rest = ino;
        loop {
            start -= 1;
            buf[start] = b'0' + (rest % 10) as u8;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        Self { buf, start }
    }

    /// The decimal digits.
    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever written into `buf`.
        std::str::from_utf8(&self.buf[self.start..]).unwrap_or_default()
    }
}

impl fmt::Debug for InodeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InodeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote methods of the networkfs protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `list inode=..`
    List,
    /// `lookup parent=.. name=..`
    Lookup,
    /// `create parent=.. name=.. type=..`
    Create,
    /// `unlink parent=.. name=..`
    Unlink,
    /// `rmdir parent=.. name=..`
    Rmdir,
    /// `link source=.. parent=.. name=..`
    Link,
    /// `read inode=..`
    Read,
    /// `write inode=.. content=..`
    Write,
}

impl Method {
    /// Method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::List => "list",
            Method::Lookup => "lookup",
            Method::Create => "create",
            Method::Unlink => "unlink",
            Method::Rmdir => "rmdir",
            Method::Link => "link",
            Method::Read => "read",
            Method::Write => "write",
        }
    }

    /// Parses a wire method name.
    pub fn from_name(name: &str) -> Option<Self> {
        let method = match name {
            "list" => Method::List,
            "lookup" => Method::Lookup,
            "create" => Method::Create,
            "unlink" => Method::Unlink,
            "rmdir" => Method::Rmdir,
            "link" => Method::Link,
            "read" => Method::Read,
            "write" => Method::Write,
            _ => return None,
        };
        Some(method)
    }

    /// Response buffer size: the decoded record size, or zero when the
    /// method has no response body.
    pub fn response_capacity(self) -> usize {
        match self {
            Method::List => ENTRY_LIST_RECORD_SIZE,
            Method::Lookup => ENTRY_INFO_RECORD_SIZE,
            Method::Create => INODE_RECORD_SIZE,
            Method::Read => CONTENT_RECORD_SIZE,
            Method::Unlink | Method::Rmdir | Method::Link | Method::Write => 0,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues calls for one mount.
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn Transport>,
    token: Token,
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Creates a client sending `token` with every call.
    pub fn new(transport: Arc<dyn Transport>, token: Token) -> Self {
        Self { transport, token }
    }

    /// The mount token.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Issues `method` and returns the response body on success.
    ///
    /// The body is exactly [`Method::response_capacity`] bytes long. On a
    /// non-zero status the buffer is dropped and [`NetfsError::Remote`] is
    /// returned.
    pub fn call(&self, method: Method, args: &[(&str, &str)]) -> NetfsResult<Vec<u8>> {
        let capacity = method.response_capacity();
        let mut response = Vec::new();
        response
            .try_reserve_exact(capacity)
            .map_err(|_| NetfsError::OutOfMemory { bytes: capacity })?;
        response.resize(capacity, 0);

        let code = match self
            .transport
            .call(self.token.as_str(), method.as_str(), args, &mut response)
        {
            Ok(code) => code,
            Err(e) => {
                warn!(method = %method, error = %e, "networkfs-api: transport failed");
                return Err(e.into());
            }
        };
        info!(
            method = %method,
            code,
            message = status_message(code),
            "networkfs-api: method returned"
        );

        match RemoteStatus::from_code(code) {
            None => Ok(response),
            Some(status) => Err(NetfsError::Remote { method, status }),
        }
    }
}
