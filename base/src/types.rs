//! Addresses and labels.
//!
//! The disassembler prints addresses in hexadecimal without a prefix
//! (`2ba:`) and prints branch targets with one (`0x2c8`).  We keep
//! the unprefixed text as it appeared in the listing, because that
//! text is the key which connects a branch to its destination.
use std::fmt::{self, Debug, Display, Formatter};

use serde::Serialize;

const HEX_PREFIX: &str = "0x";

/// The location of an instruction within a listing, as written in
/// the listing itself (for example `2c8`).
///
/// Two addresses are equal only when their text is identical; we do
/// not try to decide that `02c8` and `2c8` are the same place, since
/// the disassembler never produces both spellings.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new<S: Into<String>>(text: S) -> Address {
        Address(text.into())
    }

    /// Convert the text of a hex immediate (`0x2c8`) into the address
    /// it names (`2c8`).  Returns `None` if `text` does not carry the
    /// `0x` prefix or has nothing after it.
    pub fn from_hex_immediate(text: &str) -> Option<Address> {
        match text.strip_prefix(HEX_PREFIX) {
            Some(digits) if !digits.is_empty() => Some(Address::new(digits)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Address {
        Address::new(s)
    }
}

/// A synthetic label, `L1`, `L2` and so on.  Label numbers start at
/// 1 and are handed out in the order in which branch targets are
/// first seen.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(u32);

impl Label {
    pub const FIRST: Label = Label(1);

    pub const fn new(number: u32) -> Label {
        Label(number)
    }

    pub const fn number(&self) -> u32 {
        self.0
    }

    /// The label which follows this one.  Label numbers are never
    /// reused, so running out of them is a bug rather than an input
    /// problem.
    #[must_use]
    pub fn successor(&self) -> Label {
        match self.0.checked_add(1) {
            Some(n) => Label(n),
            None => panic!("ran out of label numbers after {self}"),
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl Debug for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", self.0)
    }
}

impl Serialize for Label {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[test]
fn test_address_from_hex_immediate() {
    assert_eq!(
        Address::from_hex_immediate("0x2c8"),
        Some(Address::from("2c8"))
    );
    assert_eq!(Address::from_hex_immediate("0x"), None);
    assert_eq!(Address::from_hex_immediate("2c8"), None);
}

#[test]
fn test_label_display() {
    assert_eq!(Label::FIRST.to_string(), "L1");
    assert_eq!(Label::FIRST.successor().to_string(), "L2");
    assert_eq!(Label::new(41).successor(), Label::new(42));
    assert_eq!(Label::FIRST.successor().number(), 2);
}
