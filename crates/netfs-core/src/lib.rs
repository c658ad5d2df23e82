//! Adapter between filesystem operations and the networkfs remote service.
//!
//! The service owns the directory tree, metadata and file bytes. This crate
//! shapes the calls made against it:
//!
//! - [`codec`] - `%xx` encoding of names and content
//! - [`wire`] - fixed-layout response records and protocol limits
//! - [`status`] - remote status codes and their log messages
//! - [`rpc`] - the [`Transport`] seam, tokens, methods and the call client
//! - [`api`] - one typed operation per remote method
//!
//! # Example
//!
//! ```
//! use netfs_core::testing::MemoryRemote;
//! use netfs_core::{EntryKind, NetworkFsApi, Token, ROOT_INODE};
//!
//! let remote = MemoryRemote::new();
//! let api = NetworkFsApi::new(remote, Token::new("token").unwrap());
//!
//! let ino = api.create(ROOT_INODE, b"notes", EntryKind::File).unwrap();
//! api.write(ino, b"hello").unwrap();
//! assert_eq!(api.read(ino).unwrap().bytes, b"hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod codec;
pub mod error;
pub mod rpc;
pub mod status;
pub mod testing;
pub mod wire;

pub use api::NetworkFsApi;
pub use error::{DecodeError, InvalidArgument, NetfsError, NetfsResult, TransportError};
pub use rpc::{InodeString, Method, RpcClient, Token, Transport};
pub use status::{status_message, RemoteStatus};
pub use wire::{
    Content, Entry, EntryInfo, EntryKind, EntryList, MAX_ENTRIES, MAX_FILE_SIZE, MAX_NAME_LEN,
    ROOT_INODE,
};
