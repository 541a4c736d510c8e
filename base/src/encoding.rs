//! Raw instruction bytes.
//!
//! AVR instructions are made of one or two little-endian 16-bit
//! words.  The disassembler lists the bytes in the order in which they
//! appear in memory (`30 f4`), but fixtures show each word with its
//! most significant byte first (`f430`).
use std::fmt::{self, Debug, Display, Formatter};

use serde::Serialize;

/// Put the bytes of an instruction into per-word display order.
///
/// Byte 0 is swapped with byte 1 when there are at least two bytes,
/// and byte 2 is swapped with byte 3 when there are at least four.
/// Anything beyond the fourth byte is left alone.
pub fn swap_word_bytes(bytes: &mut [u8]) {
    if bytes.len() >= 2 {
        bytes.swap(0, 1);
    }
    if bytes.len() >= 4 {
        bytes.swap(2, 3);
    }
}

/// The bytes of an instruction or data directive, in display order.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Encoding(Vec<u8>);

impl Encoding {
    /// Build the encoding of an executable instruction from bytes
    /// given in listing (memory) order.
    pub fn from_listing_order(mut bytes: Vec<u8>) -> Encoding {
        swap_word_bytes(&mut bytes);
        Encoding(bytes)
    }

    /// Build an encoding which keeps the bytes in the order given.
    /// Data directives use this.
    pub fn verbatim(bytes: Vec<u8>) -> Encoding {
        Encoding(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Debug for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Encoding({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn two_byte_instruction_is_swapped() {
        assert_eq!(
            Encoding::from_listing_order(vec![0x30, 0xf4]).to_string(),
            "f430"
        );
    }

    #[test]
    fn four_byte_instruction_swaps_each_word() {
        // call 0x100
        assert_eq!(
            Encoding::from_listing_order(vec![0x0e, 0x94, 0x80, 0x00]).to_string(),
            "940e0080"
        );
    }

    #[test]
    fn three_byte_sequence_swaps_first_word_only() {
        let mut bytes = [1_u8, 2, 3];
        swap_word_bytes(&mut bytes);
        assert_eq!(bytes, [2, 1, 3]);
    }

    #[test]
    fn single_byte_is_unchanged() {
        assert_eq!(Encoding::from_listing_order(vec![0xab]).to_string(), "ab");
    }

    #[test]
    fn verbatim_keeps_listing_order() {
        let encoding = Encoding::verbatim(vec![0x08, 0x00]);
        assert_eq!(encoding.to_string(), "0800");
        assert_eq!(encoding.bytes(), &[0x08, 0x00]);
        assert_eq!(encoding.len(), 2);
        assert!(!encoding.is_empty());
        assert!(Encoding::default().is_empty());
    }

    #[test]
    fn serializes_as_integers() {
        let encoding = Encoding::from_listing_order(vec![0x30, 0xf4]);
        assert_eq!(
            serde_json::to_string(&encoding).expect("encoding should serialize"),
            "[244,48]"
        );
    }

    #[proptest]
    fn display_is_two_hex_digits_per_byte(bytes: Vec<u8>) {
        let text = Encoding::from_listing_order(bytes.clone()).to_string();
        assert_eq!(text.len(), bytes.len() * 2);
        assert!(text.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[proptest]
    fn swapping_twice_restores_listing_order(bytes: Vec<u8>) {
        let mut twice = bytes.clone();
        swap_word_bytes(&mut twice);
        swap_word_bytes(&mut twice);
        assert_eq!(twice, bytes);
    }
}
