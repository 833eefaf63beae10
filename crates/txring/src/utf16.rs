//! Big-endian UTF-16 transcoding for the wire string format.
//!
//! Decoding never fails. An unpaired high or low surrogate, including a high
//! surrogate cut off by the end of the payload, becomes U+FFFD REPLACEMENT
//! CHARACTER; every other code unit decodes normally. A trailing odd byte is
//! not possible because callers always hand over `2 * units` bytes.

use alloc::{string::String, vec::Vec};

/// Transcodes big-endian UTF-16 code units to UTF-8.
pub(crate) fn decode_be(raw: &[u8]) -> String {
    debug_assert!(raw.len() % 2 == 0, "odd UTF-16 payload length");
    let units = raw
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));

    let mut out = String::with_capacity(raw.len() / 2);
    out.extend(
        char::decode_utf16(units).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
    out
}

/// Appends `text` to `out` as big-endian UTF-16, returning the number of code
/// units written.
pub(crate) fn encode_be(text: &str, out: &mut Vec<u8>) -> usize {
    let mut units = 0;
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
        units += 1;
    }
    units
}

/// Number of UTF-16 code units `text` encodes to.
pub(crate) fn encoded_units(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use quickcheck_macros::quickcheck;

    use super::*;

    #[test]
    fn ascii_and_astral() {
        let raw = [0x00, b'h', 0x00, 0xe9, 0xd8, 0x34, 0xdd, 0x1e];
        assert_eq!(decode_be(&raw), "h\u{e9}\u{1d11e}");
    }

    #[test]
    fn lone_high_surrogate_is_replaced() {
        let raw = [0xd8, 0x34, 0x00, b'a'];
        assert_eq!(decode_be(&raw), "\u{fffd}a");
    }

    #[test]
    fn lone_low_surrogate_is_replaced() {
        let raw = [0x00, b'a', 0xdd, 0x1e];
        assert_eq!(decode_be(&raw), "a\u{fffd}");
    }

    #[test]
    fn truncated_pair_at_end_is_replaced() {
        assert_eq!(decode_be(&[0xd8, 0x34]), "\u{fffd}");
    }

    #[test]
    fn encode_counts_units_not_chars() {
        let mut out = vec![];
        assert_eq!(encode_be("a\u{1d11e}", &mut out), 3);
        assert_eq!(out, [0x00, b'a', 0xd8, 0x34, 0xdd, 0x1e]);
        assert_eq!(encoded_units("a\u{1d11e}"), 3);
        assert_eq!(decode_be(&out), "a\u{1d11e}");
    }

    #[test]
    fn empty_payload() {
        assert_eq!(decode_be(&[]), "");
    }

    #[quickcheck]
    #[allow(clippy::needless_pass_by_value)]
    fn any_text_survives_transcoding(text: String) -> bool {
        let mut out = Vec::new();
        let units = encode_be(&text, &mut out);
        units == encoded_units(&text) && out.len() == 2 * units && decode_be(&out) == text
    }
}
