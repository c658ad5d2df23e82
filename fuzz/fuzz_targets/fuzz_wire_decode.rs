//! Fuzz target for response record decoding
//!
//! Response bodies come from the remote service and are decoded without
//! trusting it. This target checks that:
//! - Arbitrary bodies never panic the decoders
//! - Bodies of the exact record size decode or fail cleanly
//! - Successfully decoded records re-encode to an equivalent record

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use netfs_core::wire::{
    self, Content, EntryInfo, EntryList, CONTENT_RECORD_SIZE, ENTRY_INFO_RECORD_SIZE,
    ENTRY_LIST_RECORD_SIZE, MAX_ENTRIES, MAX_FILE_SIZE, MAX_NAME_LEN,
};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    record: Record,
    /// Pad the body to the exact record size
    exact: bool,
    data: Vec<u8>,
}

#[derive(Arbitrary, Debug)]
enum Record {
    EntryList,
    EntryInfo,
    Content,
    Inode,
}

fn sized(data: &[u8], exact: bool, size: usize) -> Vec<u8> {
    let mut body = data.to_vec();
    if exact {
        body.resize(size, 0);
    }
    body
}

fuzz_target!(|input: FuzzInput| {
    if input.data.len() > 64 * 1024 {
        return;
    }

    match input.record {
        Record::EntryList => {
            let body = sized(&input.data, input.exact, ENTRY_LIST_RECORD_SIZE);
            if let Ok(list) = EntryList::decode(&body) {
                assert!(list.len() <= MAX_ENTRIES);
                assert!(list.entries.iter().all(|e| e.name.len() <= MAX_NAME_LEN));
                let again = EntryList::decode(&list.encode()).expect("re-encoded list must decode");
                assert_eq!(again, list);
            }
        }
        Record::EntryInfo => {
            let body = sized(&input.data, input.exact, ENTRY_INFO_RECORD_SIZE);
            if let Ok(info) = EntryInfo::decode(&body) {
                assert_eq!(EntryInfo::decode(&info.encode()), Ok(info));
            }
        }
        Record::Content => {
            let body = sized(&input.data, input.exact, CONTENT_RECORD_SIZE);
            if let Ok(content) = Content::decode(&body) {
                assert!(content.len() <= MAX_FILE_SIZE);
                let again =
                    Content::decode(&content.encode()).expect("re-encoded content must decode");
                assert_eq!(again, content);
            }
        }
        Record::Inode => {
            let body = sized(&input.data, input.exact, wire::INODE_RECORD_SIZE);
            let _ = wire::decode_inode(&body);
        }
    }
});
