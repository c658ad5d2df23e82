//! Open-file handle table.
//!
//! Maps 64-bit handle ids to their [`ContentSession`]. Each session sits
//! behind its own mutex, so a blocking flush on one handle never holds the
//! table.

use crate::session::ContentSession;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared reference to an open session.
pub type SessionHandle = Arc<Mutex<ContentSession>>;

/// Thread-safe table of open sessions with auto-incrementing ids.
///
/// Ids start at 1 (0 is reserved for the invalid handle).
#[derive(Debug)]
pub struct SessionTable {
    sessions: DashMap<u64, SessionHandle>,
    next_id: AtomicU64,
}

impl SessionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Inserts a session and returns its handle id.
    pub fn insert(&self, session: ContentSession) -> u64 {
        let handle = Arc::new(Mutex::new(session));
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if id == 0 {
                continue;
            }
            if let Entry::Vacant(entry) = self.sessions.entry(id) {
                entry.insert(handle);
                return id;
            }
        }
    }

    /// Gets a session by handle id.
    pub fn get(&self, fh: u64) -> Option<SessionHandle> {
        self.sessions.get(&fh).map(|handle| Arc::clone(&handle))
    }

    /// Every open session on file `ino`.
    pub fn for_inode(&self, ino: u64) -> Vec<SessionHandle> {
        let handles: Vec<SessionHandle> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        handles
            .into_iter()
            .filter(|handle| handle.lock().ino() == ino)
            .collect()
    }

    /// Removes a session and returns it.
    pub fn remove(&self, fh: u64) -> Option<SessionHandle> {
        self.sessions.remove(&fh).map(|(_, handle)| handle)
    }

    /// Removes and returns every session.
    pub fn drain(&self) -> Vec<(u64, SessionHandle)> {
        let ids: Vec<u64> = self.sessions.iter().map(|entry| *entry.key()).collect();
        ids.into_iter()
            .filter_map(|id| self.sessions.remove(&id))
            .collect()
    }

    /// Get the number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if no session is open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}
