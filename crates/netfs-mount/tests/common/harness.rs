//! Test mount harness.
//!
//! `TestMount` mounts a [`NetworkFs`] over an in-memory remote service and
//! offers whole-file helpers on top of the handle-based operations.

// Not all tests use all TestMount methods
#![allow(dead_code)]

use netfs_core::testing::MemoryRemote;
use netfs_core::EntryKind;
use netfs_mount::{
    DirectoryOperations, FileOperations, MountConfig, MountResult, NetworkFs, NodeAttr,
};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// A mounted in-memory namespace.
pub struct TestMount {
    /// The remote service backing the mount.
    pub remote: Arc<MemoryRemote>,
    /// The mounted filesystem.
    pub fs: NetworkFs,
}

impl TestMount {
    /// Mounts a fresh namespace with the default configuration.
    pub fn new() -> Self {
        let remote = MemoryRemote::new();
        let fs = NetworkFs::mount("test-token", remote.clone(), MountConfig::default())
            .expect("mount failed");
        Self { remote, fs }
    }

    /// Root inode number.
    pub fn root(&self) -> u64 {
        self.fs.root()
    }

    /// Creates a file under `parent` with `content`, flushed and released.
    pub fn write_file(&self, parent: u64, name: &[u8], content: &[u8]) -> MountResult<NodeAttr> {
        let attr = self.fs.create(parent, name)?;
        self.overwrite(attr.ino, content)?;
        self.fs.getattr(attr.ino)
    }

    /// Replaces the content of `ino` through one open/write/flush/release cycle.
    pub fn overwrite(&self, ino: u64, content: &[u8]) -> MountResult<()> {
        let open = self.fs.open(ino, 0)?;
        self.fs.set_size(ino, Some(open.fh), 0)?;
        self.fs.write(ino, open.fh, 0, content)?;
        self.fs.flush(ino, open.fh)?;
        self.fs.release(ino, open.fh)
    }

    /// Reads the whole content of `ino` through a fresh handle.
    pub fn read_file(&self, ino: u64) -> MountResult<Vec<u8>> {
        let open = self.fs.open(ino, 0)?;
        let content = self.fs.read(ino, open.fh, 0, usize::MAX);
        self.fs.release(ino, open.fh)?;
        content
    }

    /// Enumerates `ino` from the start in one call.
    pub fn list(&self, ino: u64) -> Vec<(Vec<u8>, u64, EntryKind)> {
        let mut records = Vec::new();
        let mut pos = 0;
        self.fs
            .readdir(ino, &mut pos, &mut |record| {
                records.push((record.name.to_vec(), record.ino, record.kind));
                true
            })
            .expect("readdir failed");
        records
    }

    /// Names produced by enumerating `ino`.
    pub fn list_names(&self, ino: u64) -> Vec<Vec<u8>> {
        self.list(ino).into_iter().map(|(name, _, _)| name).collect()
    }
}

/// Asserts that `ino` reads back as `expected`.
pub fn assert_file_content(mount: &TestMount, ino: u64, expected: &[u8]) {
    let actual = mount.read_file(ino).expect("read failed");
    assert_eq!(
        actual,
        expected,
        "content mismatch for inode {ino}: got {} bytes, expected {}",
        actual.len(),
        expected.len()
    );
}

/// Asserts the errno of a failed operation.
pub fn assert_errno<T: std::fmt::Debug>(result: MountResult<T>, errno: i32) {
    match result {
        Ok(value) => panic!("expected errno {errno}, got Ok({value:?})"),
        Err(e) => assert_eq!(e.to_errno(), errno, "unexpected error: {e}"),
    }
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with debug-level logging of this crate captured and returns
/// the formatted output.
pub fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("netfs_mount=debug"))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
