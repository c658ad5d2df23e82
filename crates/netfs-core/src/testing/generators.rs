//! Test data generators shaped around the protocol limits.

use crate::wire::{MAX_FILE_SIZE, MAX_NAME_LEN};
use rand::Rng;

/// Generate random bytes of specified size.
pub fn random_bytes(size: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    (0..size).map(|_| rng.random()).collect()
}

/// Generate content of exactly the maximum file size (512 bytes).
pub fn max_size_content() -> Vec<u8> {
    random_bytes(MAX_FILE_SIZE)
}

/// Generate content containing all 256 possible byte values.
///
/// Catches byte-value filtering in the `%xx` codec, including NUL and
/// high bytes.
pub fn all_byte_values() -> Vec<u8> {
    (0u8..=255).collect()
}

/// Generate a name of `len` bytes.
pub fn name_of_len(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'a' + (i % 26) as u8).collect()
}

/// Generate the longest name the protocol accepts (255 bytes).
pub fn longest_name() -> Vec<u8> {
    name_of_len(MAX_NAME_LEN - 1)
}
