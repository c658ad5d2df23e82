//! Testing utilities for adapter and mount tests.
//!
//! - **Remote**: [`MemoryRemote`], an in-process service implementing
//!   [`Transport`](crate::Transport) with call recording and failure injection
//! - **Generators**: content and names at the protocol limits
//!
//! # Usage
//!
//! ```
//! use netfs_core::testing::MemoryRemote;
//! use netfs_core::{EntryKind, NetworkFsApi, Token, ROOT_INODE};
//!
//! let remote = MemoryRemote::new();
//! let api = NetworkFsApi::new(remote.clone(), Token::new("token").unwrap());
//! let ino = api.create(ROOT_INODE, b"a.txt", EntryKind::File).unwrap();
//! assert_eq!(api.lookup(ROOT_INODE, b"a.txt").unwrap().unwrap().ino, ino);
//! ```

pub mod generators;
pub mod remote;

pub use generators::{all_byte_values, longest_name, max_size_content, name_of_len, random_bytes};
pub use remote::{MemoryRemote, RecordedCall};
