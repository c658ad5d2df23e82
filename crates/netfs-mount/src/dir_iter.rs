//! Directory enumeration.
//!
//! A cursor position drives resumable enumeration across calls: position 0
//! is `.`, position 1 is `..`, and position `p >= 2` is entry `p - 2` of the
//! remote listing. The listing is fetched once per call and never cached,
//! so a call resuming mid-listing after a concurrent mutation may skip or
//! repeat entries.

use netfs_core::{EntryKind, NetworkFsApi};
use tracing::{trace, warn};

/// One record produced by enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirRecord<'a> {
    /// Entry name.
    pub name: &'a [u8],
    /// Entry inode number.
    pub ino: u64,
    /// Entry type.
    pub kind: EntryKind,
    /// Cursor position following this record.
    pub next: u64,
}

/// Emits the records of directory `ino` starting at `*pos`.
///
/// `emit` returns false when it could not take the record (its buffer is
/// full); enumeration stops there and `*pos` still points at that record.
/// Returns the number of records emitted. A failed listing is logged and
/// treated as a directory without remote entries.
pub fn iterate<F>(api: &NetworkFsApi, ino: u64, parent: u64, pos: &mut u64, mut emit: F) -> usize
where
    F: FnMut(DirRecord<'_>) -> bool,
{
    let mut emitted = 0;

    for (at, name, target) in [(0, &b"."[..], ino), (1, &b".."[..], parent)] {
        if *pos != at {
            continue;
        }
        let record = DirRecord {
            name,
            ino: target,
            kind: EntryKind::Directory,
            next: at + 1,
        };
        if !emit(record) {
            return emitted;
        }
        *pos = at + 1;
        emitted += 1;
    }

    let listing = match api.list(ino) {
        Ok(listing) => listing,
        Err(e) => {
            warn!(inode = ino, error = %e, "Listing failed, no remote entries");
            return emitted;
        }
    };

    let skip = usize::try_from(*pos - 2).unwrap_or(usize::MAX);
    for entry in listing.entries.iter().skip(skip) {
        let record = DirRecord {
            name: &entry.name,
            ino: entry.ino,
            kind: entry.kind,
            next: *pos + 1,
        };
        if !emit(record) {
            break;
        }
        *pos += 1;
        emitted += 1;
    }

    trace!(inode = ino, emitted, pos = *pos, "Enumerated directory");
    emitted
}
