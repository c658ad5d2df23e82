//! Fuzz target for the `%xx` codec
//!
//! - Decoding arbitrary argument strings never panics
//! - Encoding is exactly three ASCII characters per byte and decodes back

#![no_main]

use libfuzzer_sys::fuzz_target;
use netfs_core::codec;

fuzz_target!(|data: &[u8]| {
    let encoded = codec::encode(data);
    assert_eq!(encoded.len(), codec::encoded_len(data.len()));
    assert!(encoded.is_ascii());
    assert_eq!(codec::decode(&encoded).as_deref(), Ok(data));

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = codec::decode(text);
    }
});
