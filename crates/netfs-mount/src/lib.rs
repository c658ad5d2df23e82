//! Filesystem-operation side of a networkfs mount.
//!
//! This crate turns the calls a filesystem host makes (lookup, create,
//! open, read, write, flush, readdir and the rest) into remote calls
//! through [`netfs_core`]. Local state is limited to the mount token, the
//! resolved nodes, and one content buffer per open file.
//!
//! # Example
//!
//! ```
//! use netfs_core::testing::MemoryRemote;
//! use netfs_mount::{DirectoryOperations, FileOperations, MountConfig, NetworkFs};
//!
//! let remote = MemoryRemote::new();
//! let fs = NetworkFs::mount("token", remote, MountConfig::default()).unwrap();
//!
//! let file = fs.create(fs.root(), b"a.txt").unwrap();
//! let open = fs.open(file.ino, 0).unwrap();
//! fs.write(file.ino, open.fh, 0, b"hello").unwrap();
//! fs.flush(file.ino, open.fh).unwrap();
//! fs.release(file.ino, open.fh).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dir_iter;
pub mod error;
pub mod filesystem;
pub mod handles;
pub mod node;
pub mod ops;
pub mod session;

pub use config::MountConfig;
pub use dir_iter::DirRecord;
pub use error::{MountError, MountResult};
pub use filesystem::NetworkFs;
pub use handles::SessionTable;
pub use node::NodeTable;
pub use ops::{DirectoryOperations, FileOperations, NodeAttr, NodeOps, OpenFile};
pub use session::{ContentPreview, ContentSession};
