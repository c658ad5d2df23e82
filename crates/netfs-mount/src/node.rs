//! Local node handles for the remote tree.
//!
//! The remote service owns the tree. Locally we only remember the nodes the
//! host has resolved, the names linking them into their parents, and the
//! declared size of each file. Several names may link the same node.

use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use netfs_core::EntryKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// A resolved node.
#[derive(Debug)]
pub struct NodeEntry {
    /// Directory or file.
    pub kind: EntryKind,
    /// Containing directory (itself for the root).
    pub parent: u64,
    /// Declared content size in bytes.
    size: AtomicU64,
    /// Number of local names linking this node.
    nlink: AtomicU64,
}

impl NodeEntry {
    fn new(kind: EntryKind, parent: u64) -> Self {
        Self {
            kind,
            parent,
            size: AtomicU64::new(0),
            nlink: AtomicU64::new(0),
        }
    }

    /// Declared content size in bytes.
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    /// Number of local names linking this node.
    pub fn nlink(&self) -> u64 {
        self.nlink.load(Ordering::Acquire)
    }
}

/// Thread-safe table of resolved nodes and the names linking them.
#[derive(Debug)]
pub struct NodeTable {
    /// Inode number to node.
    nodes: DashMap<u64, NodeEntry>,
    /// (parent, name) to inode number.
    links: DashMap<(u64, Vec<u8>), u64>,
    root: u64,
}

impl NodeTable {
    /// Creates a table holding only the root directory.
    pub fn new(root: u64) -> Self {
        let nodes = DashMap::new();
        let entry = NodeEntry::new(EntryKind::Directory, root);
        entry.nlink.store(1, Ordering::Release);
        nodes.insert(root, entry);
        Self {
            nodes,
            links: DashMap::new(),
            root,
        }
    }

    /// Inode number of the root directory.
    pub fn root(&self) -> u64 {
        self.root
    }

    /// Gets a node by inode number.
    pub fn get(&self, ino: u64) -> Option<Ref<'_, u64, NodeEntry>> {
        self.nodes.get(&ino)
    }

    /// Returns the kind of a node.
    pub fn kind(&self, ino: u64) -> Option<EntryKind> {
        self.nodes.get(&ino).map(|node| node.kind)
    }

    /// Returns the containing directory of a node.
    pub fn parent(&self, ino: u64) -> Option<u64> {
        self.nodes.get(&ino).map(|node| node.parent)
    }

    /// Returns the node linked as `name` under `parent`.
    pub fn child(&self, parent: u64, name: &[u8]) -> Option<u64> {
        self.links.get(&(parent, name.to_vec())).map(|ino| *ino)
    }

    /// Updates the declared size of a node. Returns false if it is unknown.
    pub fn set_size(&self, ino: u64, size: u64) -> bool {
        match self.nodes.get(&ino) {
            Some(node) => {
                node.size.store(size, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Links `ino` as `name` under `parent`, materializing the node if needed.
    ///
    /// Re-attaching an existing link is a no-op. A link that pointed at a
    /// different node is replaced.
    pub fn attach(&self, parent: u64, name: &[u8], ino: u64, kind: EntryKind) {
        let added = match self.links.entry((parent, name.to_vec())) {
            Entry::Occupied(mut entry) => {
                let previous = entry.insert(ino);
                if previous == ino {
                    false
                } else {
                    self.release_link(previous);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(ino);
                true
            }
        };

        let mut node = self
            .nodes
            .entry(ino)
            .or_insert_with(|| NodeEntry::new(kind, parent));
        node.kind = kind;
        if kind.is_directory() && ino != self.root {
            node.parent = parent;
        }
        if added {
            node.nlink.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Removes the link `name` under `parent` and returns the node it named.
    ///
    /// The node itself is dropped once its last link is gone. The root is
    /// never dropped.
    pub fn detach(&self, parent: u64, name: &[u8]) -> Option<u64> {
        let (_, ino) = self.links.remove(&(parent, name.to_vec()))?;
        self.release_link(ino);
        Some(ino)
    }

    fn release_link(&self, ino: u64) {
        if ino == self.root {
            return;
        }
        self.nodes
            .remove_if(&ino, |_, node| node.nlink.fetch_sub(1, Ordering::AcqRel) <= 1);
    }

    /// Get the number of known nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
