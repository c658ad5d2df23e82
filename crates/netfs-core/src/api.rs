//! Typed networkfs operations.
//!
//! Each method maps one filesystem request onto exactly one remote call:
//! it validates the arguments locally, renders them in protocol order, and
//! decodes the fixed-size response.

use crate::codec;
use crate::error::{InvalidArgument, NetfsResult};
use crate::rpc::{InodeString, Method, RpcClient, Token, Transport};
use crate::wire::{self, Content, EntryInfo, EntryKind, EntryList, MAX_FILE_SIZE, MAX_NAME_LEN};
use std::sync::Arc;
use tracing::warn;

/// Operations against the remote service for one mount.
#[derive(Debug, Clone)]
pub struct NetworkFsApi {
    client: RpcClient,
}

impl NetworkFsApi {
    /// Creates an API bound to `token`.
    pub fn new(transport: Arc<dyn Transport>, token: Token) -> Self {
        Self {
            client: RpcClient::new(transport, token),
        }
    }

    /// The mount token.
    pub fn token(&self) -> &Token {
        self.client.token()
    }

    /// Lists the children of directory `ino`.
    pub fn list(&self, ino: u64) -> NetfsResult<EntryList> {
        let ino = InodeString::new(ino);
        let body = self.client.call(Method::List, &[("inode", ino.as_str())])?;
        Ok(EntryList::decode(&body)?)
    }

    /// Resolves `name` under `parent`.
    ///
    /// Returns `Ok(None)` when the service reports that no such entry exists.
    pub fn lookup(&self, parent: u64, name: &[u8]) -> NetfsResult<Option<EntryInfo>> {
        let name = encode_name(name)?;
        let parent = InodeString::new(parent);
        match self
            .client
            .call(Method::Lookup, &[("parent", parent.as_str()), ("name", name.as_str())])
        {
            Ok(body) => Ok(Some(EntryInfo::decode(&body)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Creates `name` under `parent` and returns the new inode number.
    pub fn create(&self, parent: u64, name: &[u8], kind: EntryKind) -> NetfsResult<u64> {
        let name = encode_name(name)?;
        let parent = InodeString::new(parent);
        let body = self.client.call(
            Method::Create,
            &[
                ("parent", parent.as_str()),
                ("name", name.as_str()),
                ("type", kind.wire_name()),
            ],
        )?;
        Ok(wire::decode_inode(&body)?)
    }

    /// Removes `name` from `parent`: `rmdir` for directories, `unlink` for files.
    pub fn remove(&self, parent: u64, name: &[u8], kind: EntryKind) -> NetfsResult<()> {
        let method = match kind {
            EntryKind::Directory => Method::Rmdir,
            EntryKind::File => Method::Unlink,
        };
        let name = encode_name(name)?;
        let parent = InodeString::new(parent);
        self.client
            .call(method, &[("parent", parent.as_str()), ("name", name.as_str())])?;
        Ok(())
    }

    /// Adds `name` under `parent` as another name for `source`.
    pub fn link(&self, source: u64, parent: u64, name: &[u8]) -> NetfsResult<()> {
        let name = encode_name(name)?;
        let source = InodeString::new(source);
        let parent = InodeString::new(parent);
        self.client.call(
            Method::Link,
            &[
                ("source", source.as_str()),
                ("parent", parent.as_str()),
                ("name", name.as_str()),
            ],
        )?;
        Ok(())
    }

    /// Fetches the full content of file `ino`.
    pub fn read(&self, ino: u64) -> NetfsResult<Content> {
        let ino = InodeString::new(ino);
        let body = self.client.call(Method::Read, &[("inode", ino.as_str())])?;
        Ok(Content::decode(&body)?)
    }

    /// Replaces the content of file `ino`.
    pub fn write(&self, ino: u64, content: &[u8]) -> NetfsResult<()> {
        if content.len() > MAX_FILE_SIZE {
            warn!(
                inode = ino,
                len = content.len(),
                "networkfs-api: content too large, not sent"
            );
            return Err(InvalidArgument::ContentTooLarge {
                len: content.len(),
                max: MAX_FILE_SIZE,
            }
            .into());
        }
        let content = codec::encode(content);
        let ino = InodeString::new(ino);
        self.client
            .call(Method::Write, &[("inode", ino.as_str()), ("content", content.as_str())])?;
        Ok(())
    }
}

/// Validates and encodes an entry name.
///
/// Names must leave room for the terminator in the 256-byte wire field.
fn encode_name(name: &[u8]) -> Result<String, InvalidArgument> {
    if name.len() >= MAX_NAME_LEN {
        warn!(len = name.len(), "networkfs-api: name too long, not sent");
        return Err(InvalidArgument::NameTooLong {
            len: name.len(),
            max: MAX_NAME_LEN - 1,
        });
    }
    Ok(codec::encode(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetfsError;
    use crate::status::RemoteStatus;
    use crate::testing::MemoryRemote;
    use crate::wire::ROOT_INODE;

    fn api(remote: &Arc<MemoryRemote>) -> NetworkFsApi {
        NetworkFsApi::new(remote.clone(), Token::new("token").unwrap())
    }

    #[test]
    fn test_create_then_lookup() {
        let remote = MemoryRemote::new();
        let api = api(&remote);

        let ino = api.create(ROOT_INODE, b"a.txt", EntryKind::File).unwrap();
        let info = api.lookup(ROOT_INODE, b"a.txt").unwrap().unwrap();
        assert_eq!(info.ino, ino);
        assert_eq!(info.kind, EntryKind::File);
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let remote = MemoryRemote::new();
        assert_eq!(api(&remote).lookup(ROOT_INODE, b"missing").unwrap(), None);
    }

    #[test]
    fn test_create_sends_protocol_argument_order() {
        let remote = MemoryRemote::new();
        api(&remote)
            .create(ROOT_INODE, b"d", EntryKind::Directory)
            .unwrap();
        let call = remote.calls().pop().unwrap();
        assert_eq!(call.method, "create");
        assert_eq!(call.arg_names(), vec!["parent", "name", "type"]);
        assert_eq!(call.arg("parent"), Some("1000"));
        assert_eq!(call.arg("name"), Some("%64"));
        assert_eq!(call.arg("type"), Some("directory"));
        assert_eq!(call.response_len, wire::INODE_RECORD_SIZE);
    }

    #[test]
    fn test_every_method_sends_protocol_shape() {
        let remote = MemoryRemote::new();
        let api = api(&remote);
        let dir = api.create(ROOT_INODE, b"d", EntryKind::Directory).unwrap();
        let file = api.create(ROOT_INODE, b"f", EntryKind::File).unwrap();
        remote.clear_calls();

        api.list(ROOT_INODE).unwrap();
        api.lookup(ROOT_INODE, b"f").unwrap();
        api.link(file, dir, b"g").unwrap();
        api.write(file, b"hi").unwrap();
        api.read(file).unwrap();
        api.remove(dir, b"g", EntryKind::File).unwrap();
        api.remove(ROOT_INODE, b"d", EntryKind::Directory).unwrap();

        let expected: [(&str, &[&str], usize); 7] = [
            ("list", &["inode"], wire::ENTRY_LIST_RECORD_SIZE),
            ("lookup", &["parent", "name"], wire::ENTRY_INFO_RECORD_SIZE),
            ("link", &["source", "parent", "name"], 0),
            ("write", &["inode", "content"], 0),
            ("read", &["inode"], wire::CONTENT_RECORD_SIZE),
            ("unlink", &["parent", "name"], 0),
            ("rmdir", &["parent", "name"], 0),
        ];
        let calls = remote.calls();
        assert_eq!(calls.len(), expected.len());
        for (call, (method, names, response_len)) in calls.iter().zip(expected) {
            assert_eq!(call.method, method);
            assert_eq!(call.arg_names(), names, "argument order of {method}");
            assert_eq!(call.response_len, response_len, "response buffer of {method}");
        }

        let file_arg = file.to_string();
        let dir_arg = dir.to_string();
        assert_eq!(calls[2].arg("source"), Some(file_arg.as_str()));
        assert_eq!(calls[2].arg("parent"), Some(dir_arg.as_str()));
        assert_eq!(calls[3].arg("inode"), Some(file_arg.as_str()));
        assert_eq!(calls[3].arg("content"), Some("%68%69"));
    }

    #[test]
    fn test_name_too_long_issues_no_call() {
        let remote = MemoryRemote::new();
        let api = api(&remote);
        let name = vec![b'x'; 300];

        let err = api.create(ROOT_INODE, &name, EntryKind::File).unwrap_err();
        assert!(matches!(
            err,
            NetfsError::InvalidArgument(InvalidArgument::NameTooLong { len: 300, .. })
        ));
        assert!(api.lookup(ROOT_INODE, &name).is_err());
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn test_remove_selects_method_by_kind() {
        let remote = MemoryRemote::new();
        let api = api(&remote);
        api.create(ROOT_INODE, b"d", EntryKind::Directory).unwrap();
        api.create(ROOT_INODE, b"f", EntryKind::File).unwrap();

        api.remove(ROOT_INODE, b"d", EntryKind::Directory).unwrap();
        api.remove(ROOT_INODE, b"f", EntryKind::File).unwrap();

        let methods: Vec<_> = remote.calls().into_iter().map(|c| c.method).collect();
        assert_eq!(methods, vec!["create", "create", "rmdir", "unlink"]);
    }

    #[test]
    fn test_rmdir_non_empty_directory() {
        let remote = MemoryRemote::new();
        let api = api(&remote);
        let dir = api.create(ROOT_INODE, b"d", EntryKind::Directory).unwrap();
        api.create(dir, b"inner", EntryKind::File).unwrap();

        let err = api.remove(ROOT_INODE, b"d", EntryKind::Directory).unwrap_err();
        assert_eq!(err.remote_status(), Some(RemoteStatus::DirectoryNotEmpty));
        assert!(api.lookup(ROOT_INODE, b"d").unwrap().is_some());
    }

    #[test]
    fn test_write_then_read() {
        let remote = MemoryRemote::new();
        let api = api(&remote);
        let ino = api.create(ROOT_INODE, b"f", EntryKind::File).unwrap();

        api.write(ino, b"hello\0world").unwrap();
        assert_eq!(api.read(ino).unwrap().bytes, b"hello\0world");
    }

    #[test]
    fn test_write_rejects_oversized_content_locally() {
        let remote = MemoryRemote::new();
        let api = api(&remote);
        let err = api.write(ROOT_INODE, &[0u8; MAX_FILE_SIZE + 1]).unwrap_err();
        assert!(matches!(
            err,
            NetfsError::InvalidArgument(InvalidArgument::ContentTooLarge { .. })
        ));
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn test_link_shares_content() {
        let remote = MemoryRemote::new();
        let api = api(&remote);
        let ino = api.create(ROOT_INODE, b"a", EntryKind::File).unwrap();
        let dir = api.create(ROOT_INODE, b"d", EntryKind::Directory).unwrap();

        api.link(ino, dir, b"b").unwrap();
        api.write(ino, b"shared").unwrap();

        let linked = api.lookup(dir, b"b").unwrap().unwrap();
        assert_eq!(linked.ino, ino);
        assert_eq!(api.read(linked.ino).unwrap().bytes, b"shared");
    }

    #[test]
    fn test_list_of_missing_directory_fails() {
        let remote = MemoryRemote::new();
        let err = api(&remote).list(4242).unwrap_err();
        assert_eq!(err.remote_status(), Some(RemoteStatus::ObjectNotFound));
    }
}
