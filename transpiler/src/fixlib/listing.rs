use std::collections::BTreeMap;

use tracing::{event, span, Level};

use base::prelude::{Address, Instruction};

use super::parser::parse_line;
use super::types::{LineNumber, TranspileFailure};

/// An instruction together with the number of the input line it came
/// from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub line_number: LineNumber,
    pub instruction: Instruction,
}

/// The instructions of a listing in input order, indexed by address.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Listing {
    lines: Vec<ListingLine>,
    index: BTreeMap<Address, usize>,
}

impl Listing {
    /// Parse every line of `body`.
    ///
    /// # Errors
    ///
    /// Fails on the first line which cannot be parsed, or if two
    /// lines have the same address.
    pub fn parse(body: &str) -> Result<Listing, TranspileFailure> {
        let span = span!(Level::ERROR, "parse listing");
        let _enter = span.enter();
        let mut listing = Listing::default();
        for (line_number, text) in body.lines().enumerate().map(|(n, text)| (n + 1, text)) {
            if let Some(instruction) = parse_line(line_number, text)? {
                listing.push(line_number, instruction)?;
            }
        }
        event!(
            Level::DEBUG,
            "listing contains {} instructions",
            listing.lines.len()
        );
        Ok(listing)
    }

    /// Append an instruction.
    ///
    /// # Errors
    ///
    /// Fails if the listing already contains an instruction at the
    /// same address.
    pub fn push(
        &mut self,
        line_number: LineNumber,
        instruction: Instruction,
    ) -> Result<(), TranspileFailure> {
        let address = instruction.address();
        if let Some(existing) = self.index.get(address) {
            return Err(TranspileFailure::DuplicateAddress {
                address: address.clone(),
                first_line: self.lines[*existing].line_number,
                line: line_number,
            });
        }
        self.index.insert(address.clone(), self.lines.len());
        self.lines.push(ListingLine {
            line_number,
            instruction,
        });
        Ok(())
    }

    pub fn get(&self, address: &Address) -> Option<&Instruction> {
        self.index
            .get(address)
            .map(|pos| &self.lines[*pos].instruction)
    }

    pub(crate) fn get_mut(&mut self, address: &Address) -> Option<&mut Instruction> {
        match self.index.get(address) {
            Some(pos) => Some(&mut self.lines[*pos].instruction),
            None => None,
        }
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    pub fn lines(&self) -> &[ListingLine] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> impl Iterator<Item = &mut ListingLine> {
        self.lines.iter_mut()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter().map(|line| &line.instruction)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = concat!(
        "\n",
        "firmware.elf:     file format elf32-avr\n",
        "\n",
        "Disassembly of section .text:\n",
        "\n",
        "00000000 <__vectors>:\n",
        "   0:\t0c 94 34 00 \tjmp\t0x68\t; 0x68 <__ctors_end>\n",
        "  68:\t11 24       \teor\tr1, r1\n",
        "  6a:\t1f be       \tout\t0x3f, r1\t; 63\n",
    );

    #[test]
    fn test_parse_keeps_input_order() {
        let listing = Listing::parse(BODY).expect("listing should parse");
        let addresses: Vec<&str> = listing
            .instructions()
            .map(|inst| inst.address().as_str())
            .collect();
        assert_eq!(addresses, vec!["0", "68", "6a"]);
        assert_eq!(listing.len(), 3);
        assert!(!listing.is_empty());
    }

    #[test]
    fn test_line_numbers_count_from_one() {
        let listing = Listing::parse(BODY).expect("listing should parse");
        let numbers: Vec<LineNumber> = listing.lines().iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![7, 8, 9]);
    }

    #[test]
    fn test_index_by_address() {
        let listing = Listing::parse(BODY).expect("listing should parse");
        assert!(listing.contains(&Address::from("68")));
        assert_eq!(
            listing.get(&Address::from("68")).map(|inst| inst.opcode()),
            Some("eor")
        );
        assert_eq!(listing.get(&Address::from("2")), None);
    }

    #[test]
    fn test_duplicate_address_is_rejected() {
        let body = concat!("68: 11 24 eor r1, r1\n", "\n", "68: 1f be out 0x3f, r1\n");
        match Listing::parse(body) {
            Err(TranspileFailure::DuplicateAddress {
                address,
                first_line,
                line,
            }) => {
                assert_eq!(address, Address::from("68"));
                assert_eq!(first_line, 1);
                assert_eq!(line, 3);
            }
            other => panic!("expected a duplicate address error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_body() {
        let listing = Listing::parse("").expect("empty input is a valid (empty) listing");
        assert!(listing.is_empty());
    }
}
