//! In-process networkfs service.
//!
//! [`MemoryRemote`] speaks the same protocol as the real service: it decodes
//! the percent-encoded arguments, enforces the name/size/entry limits, and
//! answers with the same status codes and response records. Every call is
//! recorded so tests can assert on what was (or was not) sent.

use crate::codec;
use crate::error::TransportError;
use crate::rpc::{Method, Transport};
use crate::wire::{
    Content, Entry, EntryInfo, EntryKind, EntryList, MAX_ENTRIES, MAX_FILE_SIZE, MAX_NAME_LEN,
    ROOT_INODE,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

const OK: u64 = 0;
const OBJECT_NOT_FOUND: u64 = 1;
const NOT_A_FILE: u64 = 2;
const NOT_A_DIRECTORY: u64 = 3;
const NO_SUCH_ENTRY: u64 = 4;
const ENTRY_EXISTS: u64 = 5;
const FILE_TOO_LARGE: u64 = 6;
const DIRECTORY_FULL: u64 = 7;
const DIRECTORY_NOT_EMPTY: u64 = 8;

/// One call as seen by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Bearer token.
    pub token: String,
    /// Method name.
    pub method: String,
    /// Arguments in the order they were sent.
    pub args: Vec<(String, String)>,
    /// Length of the response buffer offered by the caller.
    pub response_len: usize,
}

impl RecordedCall {
    /// Argument names in order.
    pub fn arg_names(&self) -> Vec<&str> {
        self.args.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Value of the named argument.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug)]
enum RemoteNode {
    Directory { entries: Vec<(Vec<u8>, u64)> },
    File { content: Vec<u8> },
}

impl RemoteNode {
    fn kind(&self) -> EntryKind {
        match self {
            RemoteNode::Directory { .. } => EntryKind::Directory,
            RemoteNode::File { .. } => EntryKind::File,
        }
    }
}

#[derive(Debug)]
struct RemoteState {
    nodes: HashMap<u64, RemoteNode>,
    next_ino: u64,
}

/// Reply produced by a handler: status code plus optional body.
type Reply = (u64, Vec<u8>);

/// An in-memory remote namespace implementing [`Transport`].
#[derive(Debug)]
pub struct MemoryRemote {
    state: Mutex<RemoteState>,
    calls: Mutex<Vec<RecordedCall>>,
    injected: Mutex<Vec<(Method, u64)>>,
}

impl MemoryRemote {
    /// Creates a service holding only the empty root directory.
    pub fn new() -> Arc<Self> {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_INODE,
            RemoteNode::Directory {
                entries: Vec::new(),
            },
        );
        Arc::new(Self {
            state: Mutex::new(RemoteState {
                nodes,
                next_ino: ROOT_INODE + 1,
            }),
            calls: Mutex::new(Vec::new()),
            injected: Mutex::new(Vec::new()),
        })
    }

    /// Snapshot of every call received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls of `method` received so far.
    pub fn call_count(&self, method: Method) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method.as_str())
            .count()
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Makes the next call of `method` fail with `code` without applying it.
    pub fn fail_next(&self, method: Method, code: u64) {
        self.injected.lock().push((method, code));
    }

    /// Content of file `ino` as stored by the service.
    pub fn file_content(&self, ino: u64) -> Option<Vec<u8>> {
        match self.state.lock().nodes.get(&ino) {
            Some(RemoteNode::File { content }) => Some(content.clone()),
            _ => None,
        }
    }

    /// Replaces the content of file `ino`, bypassing the protocol.
    ///
    /// Simulates a mutation made by another client of the same namespace.
    pub fn set_file_content(&self, ino: u64, bytes: &[u8]) -> bool {
        match self.state.lock().nodes.get_mut(&ino) {
            Some(RemoteNode::File { content }) => {
                *content = bytes.to_vec();
                true
            }
            _ => false,
        }
    }

    fn take_injected(&self, method: Method) -> Option<u64> {
        let mut injected = self.injected.lock();
        let pos = injected.iter().position(|(m, _)| *m == method)?;
        Some(injected.remove(pos).1)
    }

    fn dispatch(&self, method: Method, args: &Args<'_>) -> Result<Reply, TransportError> {
        let mut state = self.state.lock();
        let reply = match method {
            Method::List => state.list(args.inode("inode")?),
            Method::Lookup => state.lookup(args.inode("parent")?, &args.name("name")?),
            Method::Create => {
                let kind = match args.get("type")? {
                    "directory" => EntryKind::Directory,
                    "file" => EntryKind::File,
                    other => {
                        return Err(TransportError::Protocol(format!("unknown type {other}")));
                    }
                };
                state.create(args.inode("parent")?, &args.name("name")?, kind)
            }
            Method::Unlink => {
                state.remove(args.inode("parent")?, &args.name("name")?, EntryKind::File)
            }
            Method::Rmdir => {
                state.remove(args.inode("parent")?, &args.name("name")?, EntryKind::Directory)
            }
            Method::Link => state.link(
                args.inode("source")?,
                args.inode("parent")?,
                &args.name("name")?,
            ),
            Method::Read => state.read(args.inode("inode")?),
            Method::Write => state.write(args.inode("inode")?, &args.name("content")?),
        };
        Ok(reply)
    }
}

impl RemoteState {
    fn directory(&self, ino: u64) -> Result<&Vec<(Vec<u8>, u64)>, u64> {
        match self.nodes.get(&ino) {
            None => Err(OBJECT_NOT_FOUND),
            Some(RemoteNode::File { .. }) => Err(NOT_A_DIRECTORY),
            Some(RemoteNode::Directory { entries }) => Ok(entries),
        }
    }

    fn directory_mut(&mut self, ino: u64) -> Result<&mut Vec<(Vec<u8>, u64)>, u64> {
        match self.nodes.get_mut(&ino) {
            None => Err(OBJECT_NOT_FOUND),
            Some(RemoteNode::File { .. }) => Err(NOT_A_DIRECTORY),
            Some(RemoteNode::Directory { entries }) => Ok(entries),
        }
    }

    fn child(&self, parent: u64, name: &[u8]) -> Result<u64, u64> {
        self.directory(parent)?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ino)| *ino)
            .ok_or(NO_SUCH_ENTRY)
    }

    fn kind_of(&self, ino: u64) -> Result<EntryKind, u64> {
        self.nodes.get(&ino).map(RemoteNode::kind).ok_or(OBJECT_NOT_FOUND)
    }

    fn list(&self, ino: u64) -> Reply {
        let entries = match self.directory(ino) {
            Ok(entries) => entries,
            Err(code) => return (code, Vec::new()),
        };
        let entries = entries
            .iter()
            .filter_map(|(name, child)| {
                let kind = self.kind_of(*child).ok()?;
                Some(Entry {
                    kind,
                    ino: *child,
                    name: name.clone(),
                })
            })
            .collect();
        (OK, EntryList { entries }.encode())
    }

    fn lookup(&self, parent: u64, name: &[u8]) -> Reply {
        let found = self
            .child(parent, name)
            .and_then(|ino| Ok(EntryInfo { kind: self.kind_of(ino)?, ino }));
        match found {
            Ok(info) => (OK, info.encode()),
            Err(code) => (code, Vec::new()),
        }
    }

    fn insert_entry(&mut self, parent: u64, name: &[u8], ino: u64) -> Result<(), u64> {
        if name.len() >= MAX_NAME_LEN {
            return Err(NO_SUCH_ENTRY);
        }
        let entries = self.directory_mut(parent)?;
        if entries.iter().any(|(n, _)| n == name) {
            return Err(ENTRY_EXISTS);
        }
        if entries.len() >= MAX_ENTRIES {
            return Err(DIRECTORY_FULL);
        }
        entries.push((name.to_vec(), ino));
        Ok(())
    }

    fn create(&mut self, parent: u64, name: &[u8], kind: EntryKind) -> Reply {
        let ino = self.next_ino;
        if let Err(code) = self.insert_entry(parent, name, ino) {
            return (code, Vec::new());
        }
        self.next_ino += 1;
        let node = match kind {
            EntryKind::Directory => RemoteNode::Directory {
                entries: Vec::new(),
            },
            EntryKind::File => RemoteNode::File {
                content: Vec::new(),
            },
        };
        self.nodes.insert(ino, node);
        (OK, ino.to_le_bytes().to_vec())
    }

    fn remove(&mut self, parent: u64, name: &[u8], kind: EntryKind) -> Reply {
        let checked = self.child(parent, name).and_then(|ino| {
            match (kind, self.nodes.get(&ino)) {
                (_, None) => Err(OBJECT_NOT_FOUND),
                (EntryKind::File, Some(RemoteNode::Directory { .. })) => Err(NOT_A_FILE),
                (EntryKind::Directory, Some(RemoteNode::File { .. })) => Err(NOT_A_DIRECTORY),
                (EntryKind::Directory, Some(RemoteNode::Directory { entries }))
                    if !entries.is_empty() =>
                {
                    Err(DIRECTORY_NOT_EMPTY)
                }
                _ => Ok(ino),
            }
        });
        let ino = match checked {
            Ok(ino) => ino,
            Err(code) => return (code, Vec::new()),
        };
        if let Ok(entries) = self.directory_mut(parent) {
            entries.retain(|(n, _)| n != name);
        }
        if kind.is_directory() {
            self.nodes.remove(&ino);
        }
        (OK, Vec::new())
    }

    fn link(&mut self, source: u64, parent: u64, name: &[u8]) -> Reply {
        match self.kind_of(source) {
            Err(code) => return (code, Vec::new()),
            Ok(EntryKind::Directory) => return (NOT_A_FILE, Vec::new()),
            Ok(EntryKind::File) => {}
        }
        match self.insert_entry(parent, name, source) {
            Ok(()) => (OK, Vec::new()),
            Err(code) => (code, Vec::new()),
        }
    }

    fn read(&self, ino: u64) -> Reply {
        match self.nodes.get(&ino) {
            None => (OBJECT_NOT_FOUND, Vec::new()),
            Some(RemoteNode::Directory { .. }) => (NOT_A_FILE, Vec::new()),
            Some(RemoteNode::File { content }) => (
                OK,
                Content {
                    bytes: content.clone(),
                }
                .encode(),
            ),
        }
    }

    fn write(&mut self, ino: u64, bytes: &[u8]) -> Reply {
        match self.nodes.get_mut(&ino) {
            None => (OBJECT_NOT_FOUND, Vec::new()),
            Some(RemoteNode::Directory { .. }) => (NOT_A_FILE, Vec::new()),
            Some(RemoteNode::File { .. }) if bytes.len() > MAX_FILE_SIZE => {
                (FILE_TOO_LARGE, Vec::new())
            }
            Some(RemoteNode::File { content }) => {
                *content = bytes.to_vec();
                (OK, Vec::new())
            }
        }
    }
}

/// Named arguments of one call.
struct Args<'a>(&'a [(&'a str, &'a str)]);

impl Args<'_> {
    fn get(&self, name: &str) -> Result<&str, TransportError> {
        self.0
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| TransportError::Protocol(format!("missing argument {name}")))
    }

    fn inode(&self, name: &str) -> Result<u64, TransportError> {
        let raw = self.get(name)?;
        raw.parse().map_err(|_| {
            TransportError::Protocol(format!("argument {name}={raw} is not an inode"))
        })
    }

    fn name(&self, name: &str) -> Result<Vec<u8>, TransportError> {
        codec::decode(self.get(name)?)
            .map_err(|e| TransportError::Protocol(format!("argument {name}: {e}")))
    }
}

impl Transport for MemoryRemote {
    fn call(
        &self,
        token: &str,
        method: &str,
        args: &[(&str, &str)],
        response: &mut [u8],
    ) -> Result<u64, TransportError> {
        self.calls.lock().push(RecordedCall {
            token: token.to_string(),
            method: method.to_string(),
            args: args
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            response_len: response.len(),
        });

        let method = Method::from_name(method)
            .ok_or_else(|| TransportError::Protocol(format!("unknown method {method}")))?;
        if let Some(code) = self.take_injected(method) {
            return Ok(code);
        }

        let (code, body) = self.dispatch(method, &Args(args))?;
        if code == OK {
            if body.len() > response.len() {
                return Err(TransportError::ResponseTooLarge {
                    capacity: response.len(),
                    actual: body.len(),
                });
            }
            response[..body.len()].copy_from_slice(&body);
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(
        remote: &MemoryRemote,
        method: &str,
        args: &[(&str, &str)],
        cap: usize,
    ) -> (u64, Vec<u8>) {
        let mut buf = vec![0u8; cap];
        let code = remote.call("t", method, args, &mut buf).unwrap();
        (code, buf)
    }

    #[test]
    fn test_directory_entry_limit() {
        let remote = MemoryRemote::new();
        for i in 0..MAX_ENTRIES {
            let name = codec::encode(format!("f{i}").as_bytes());
            let args = [("parent", "1000"), ("name", name.as_str()), ("type", "file")];
            assert_eq!(call(&remote, "create", &args, 8).0, OK);
        }
        let name = codec::encode(b"overflow");
        let args = [("parent", "1000"), ("name", name.as_str()), ("type", "file")];
        assert_eq!(call(&remote, "create", &args, 8).0, DIRECTORY_FULL);
    }

    #[test]
    fn test_duplicate_name() {
        let remote = MemoryRemote::new();
        let args = [("parent", "1000"), ("name", "%61"), ("type", "file")];
        assert_eq!(call(&remote, "create", &args, 8).0, OK);
        assert_eq!(call(&remote, "create", &args, 8).0, ENTRY_EXISTS);
    }

    #[test]
    fn test_unlink_directory_is_not_a_file() {
        let remote = MemoryRemote::new();
        let args = [("parent", "1000"), ("name", "%64"), ("type", "directory")];
        call(&remote, "create", &args, 8);
        let (code, _) = call(&remote, "unlink", &[("parent", "1000"), ("name", "%64")], 0);
        assert_eq!(code, NOT_A_FILE);
    }

    #[test]
    fn test_write_over_limit() {
        let remote = MemoryRemote::new();
        let args = [("parent", "1000"), ("name", "%66"), ("type", "file")];
        let (_, body) = call(&remote, "create", &args, 8);
        let ino = u64::from_le_bytes(body.try_into().unwrap()).to_string();
        let content = codec::encode(&[b'x'; MAX_FILE_SIZE + 1]);
        let args = [("inode", ino.as_str()), ("content", content.as_str())];
        assert_eq!(call(&remote, "write", &args, 0).0, FILE_TOO_LARGE);
    }

    #[test]
    fn test_undersized_buffer_is_transport_error() {
        let remote = MemoryRemote::new();
        let mut buf = vec![0u8; 10];
        let err = remote
            .call("t", "list", &[("inode", "1000")], &mut buf)
            .unwrap_err();
        assert!(matches!(err, TransportError::ResponseTooLarge { capacity: 10, .. }));
    }

    #[test]
    fn test_records_offered_response_length() {
        let remote = MemoryRemote::new();
        call(&remote, "list", &[("inode", "1000")], 4360);
        let recorded = remote.calls().pop().unwrap();
        assert_eq!(recorded.response_len, 4360);
        assert_eq!(recorded.token, "t");
    }

    #[test]
    fn test_injected_failure_is_one_shot() {
        let remote = MemoryRemote::new();
        remote.fail_next(Method::List, 42);
        assert_eq!(call(&remote, "list", &[("inode", "1000")], 4360).0, 42);
        assert_eq!(call(&remote, "list", &[("inode", "1000")], 4360).0, OK);
    }
}
