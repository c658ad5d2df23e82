//! Transport-safe encoding of names and file content.
//!
//! Every input byte becomes a three-character `%xx` escape (two lowercase hex
//! digits), so an input of `n` bytes encodes to exactly `3 * n` ASCII
//! characters. The encoding is total: control characters, NUL and high bytes
//! are all representable, and distinct inputs never collide.

use crate::error::DecodeError;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Length of the encoding of `len` raw bytes.
#[inline]
pub const fn encoded_len(len: usize) -> usize {
    3 * len
}

/// Encodes raw bytes as `%xx` escapes.
pub fn encode(input: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(input.len()));
    encode_into(&mut out, input);
    out
}

/// Appends the `%xx` encoding of `input` to `out`.
pub fn encode_into(out: &mut String, input: &[u8]) {
    out.reserve(encoded_len(input.len()));
    for &byte in input {
        out.push('%');
        out.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
        out.push(char::from(HEX_DIGITS[usize::from(byte & 0x0f)]));
    }
}

/// Decodes a percent-encoded argument.
///
/// Accepts `%xx` escapes in either hex case and passes through any other
/// byte unchanged, the way a query-string decoder on the service side does.
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 3);
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'%' {
            let hi = bytes.get(pos + 1).copied().and_then(hex_value);
            let lo = bytes.get(pos + 2).copied().and_then(hex_value);
            match (hi, lo) {
                (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                _ => return Err(DecodeError::InvalidEscape(pos)),
            }
            pos += 3;
        } else {
            out.push(bytes[pos]);
            pos += 1;
        }
    }
    Ok(out)
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ascii() {
        assert_eq!(encode(b"a.txt"), "%61%2e%74%78%74");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(b""), "");
    }

    #[test]
    fn test_encode_control_and_high_bytes() {
        assert_eq!(encode(&[0x00, 0x0a, 0x7f, 0x80, 0xff]), "%00%0a%7f%80%ff");
    }

    #[test]
    fn test_encode_into_appends() {
        let mut out = String::from("x=");
        encode_into(&mut out, b"/");
        assert_eq!(out, "x=%2f");
    }

    #[test]
    fn test_decode_mixed_case_and_literals() {
        assert_eq!(decode("%2F%2fab").unwrap(), b"//ab");
    }

    #[test]
    fn test_decode_rejects_truncated_escape() {
        assert_eq!(decode("ab%4"), Err(DecodeError::InvalidEscape(2)));
        assert_eq!(decode("%zz"), Err(DecodeError::InvalidEscape(0)));
    }
}

/// Property-based tests using proptest.
#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::wire::MAX_NAME_LEN;
    use proptest::prelude::*;

    proptest! {
        /// Encoded length is exactly three characters per input byte.
        #[test]
        fn encoded_length_is_three_per_byte(
            name in prop::collection::vec(any::<u8>(), 0..MAX_NAME_LEN)
        ) {
            let encoded = encode(&name);
            prop_assert_eq!(encoded.len(), 3 * name.len());
            prop_assert!(encoded.is_ascii());
        }

        /// Distinct names never share an encoding.
        #[test]
        fn encoding_is_injective(
            a in prop::collection::vec(any::<u8>(), 0..MAX_NAME_LEN),
            b in prop::collection::vec(any::<u8>(), 0..MAX_NAME_LEN)
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(encode(&a), encode(&b));
        }

        /// Decoding recovers the original bytes.
        #[test]
        fn decode_inverts_encode(
            content in prop::collection::vec(any::<u8>(), 0..512)
        ) {
            prop_assert_eq!(decode(&encode(&content)).unwrap(), content);
        }
    }
}
