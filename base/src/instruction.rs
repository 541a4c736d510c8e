//! Decoded lines of an AVR disassembly listing.
//!
//! A listing line such as
//!
//! `2ba:	30 f4       	brcc	.+12     	; 0x2c8 <main+0x1a>`
//!
//! becomes an [`Instruction`] at address `2ba` whose encoding is
//! `f430`, whose opcode is `brcc` and whose single operand is the
//! absolute branch target `0x2c8` (later replaced by a label).  Data
//! directives (`.word 0x0008`) are represented the same way, with
//! [`Instruction::is_directive`] returning true.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use super::encoding::Encoding;
use super::types::{Address, Label};

/// A classified operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Operand {
    /// A hexadecimal immediate, including its `0x` prefix.
    Hex(String),
    /// A decimal immediate; the digits only.  Displayed with a
    /// leading `#`.
    Decimal(String),
    /// A register, possibly with a pre-decrement or post-increment
    /// marker (`r5`, `X`, `-Y`, `Z+`).
    Register(String),
    /// A branch displacement relative to the current instruction
    /// (`.+12`).  This only survives until the parser has read the
    /// absolute target from the disassembler's comment.
    Relative(i32),
    /// A symbolic branch target assigned by label resolution.
    Label(Label),
}

impl Operand {
    /// The address named by a hex immediate operand.
    pub fn as_hex_address(&self) -> Option<Address> {
        match self {
            Operand::Hex(text) => Address::from_hex_immediate(text),
            _ => None,
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Hex(text) | Operand::Register(text) => f.write_str(text),
            Operand::Decimal(digits) => write!(f, "#{digits}"),
            Operand::Relative(offset) => write!(f, ".{offset:+}"),
            Operand::Label(label) => write!(f, "{label}"),
        }
    }
}

/// Records that an instruction branches relative to its own
/// address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RelativeBranch {
    /// The signed displacement as the disassembler printed it.
    pub offset: i32,
    /// Which operand holds the branch target.
    pub slot: usize,
}

/// One decoded line of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<Label>,
    is_directive: bool,
    encoding: Encoding,
    opcode: String,
    operands: Vec<Operand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relative: Option<RelativeBranch>,
}

impl Instruction {
    /// Create an executable instruction.  `relative` should be
    /// present only for relative branches.
    pub fn executable(
        address: Address,
        encoding: Encoding,
        opcode: String,
        operands: Vec<Operand>,
        relative: Option<RelativeBranch>,
    ) -> Instruction {
        if let Some(branch) = relative {
            assert!(
                branch.slot < operands.len(),
                "relative branch at {address} refers to operand {} but there are only {}",
                branch.slot,
                operands.len()
            );
        }
        Instruction {
            address,
            label: None,
            is_directive: false,
            encoding,
            opcode,
            operands,
            relative,
        }
    }

    /// Create a data directive such as `.word 0x0008`.
    pub fn directive(
        address: Address,
        encoding: Encoding,
        name: String,
        value: Operand,
    ) -> Instruction {
        Instruction {
            address,
            label: None,
            is_directive: true,
            encoding,
            opcode: name,
            operands: vec![value],
            relative: None,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn label(&self) -> Option<Label> {
        self.label
    }

    pub fn is_directive(&self) -> bool {
        self.is_directive
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn opcode(&self) -> &str {
        self.opcode.as_str()
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn relative_branch(&self) -> Option<RelativeBranch> {
        self.relative
    }

    pub fn relative_offset(&self) -> Option<i32> {
        self.relative.map(|branch| branch.offset)
    }

    /// The operand which names this instruction's branch target, if
    /// it has one.
    pub fn branch_target_operand(&self) -> Option<&Operand> {
        self.relative.and_then(|branch| self.operands.get(branch.slot))
    }

    /// Give this instruction a label.  An instruction is labelled at
    /// most once; returns false (leaving the existing label in place)
    /// if it already has one.
    pub fn attach_label(&mut self, label: Label) -> bool {
        match self.label {
            Some(_) => false,
            None => {
                self.label = Some(label);
                true
            }
        }
    }

    /// Replace the operand in position `slot`.
    ///
    /// # Panics
    ///
    /// Panics if there is no operand in position `slot`.
    pub fn replace_operand(&mut self, slot: usize, operand: Operand) {
        match self.operands.get_mut(slot) {
            Some(existing) => {
                *existing = operand;
            }
            None => {
                panic!(
                    "instruction at {} has no operand in position {slot}",
                    self.address
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brcc() -> Instruction {
        Instruction::executable(
            Address::from("2ba"),
            Encoding::from_listing_order(vec![0x30, 0xf4]),
            "brcc".to_string(),
            vec![Operand::Hex("0x2c8".to_string())],
            Some(RelativeBranch {
                offset: 12,
                slot: 0,
            }),
        )
    }

    #[test]
    fn operand_display() {
        assert_eq!(Operand::Hex("0x2A".to_string()).to_string(), "0x2A");
        assert_eq!(Operand::Decimal("12".to_string()).to_string(), "#12");
        assert_eq!(Operand::Register("Y+".to_string()).to_string(), "Y+");
        assert_eq!(Operand::Relative(12).to_string(), ".+12");
        assert_eq!(Operand::Relative(-4).to_string(), ".-4");
        assert_eq!(Operand::Label(Label::new(3)).to_string(), "L3");
    }

    #[test]
    fn hex_operand_names_address() {
        assert_eq!(
            Operand::Hex("0x2c8".to_string()).as_hex_address(),
            Some(Address::from("2c8"))
        );
        assert_eq!(Operand::Decimal("12".to_string()).as_hex_address(), None);
    }

    #[test]
    fn label_is_attached_once() {
        let mut inst = brcc();
        assert_eq!(inst.label(), None);
        assert!(inst.attach_label(Label::new(1)));
        assert!(!inst.attach_label(Label::new(2)));
        assert_eq!(inst.label(), Some(Label::new(1)));
    }

    #[test]
    fn branch_target_operand_follows_slot() {
        let mut inst = brcc();
        assert_eq!(inst.relative_offset(), Some(12));
        assert_eq!(
            inst.branch_target_operand(),
            Some(&Operand::Hex("0x2c8".to_string()))
        );
        inst.replace_operand(0, Operand::Label(Label::FIRST));
        assert_eq!(inst.operands(), &[Operand::Label(Label::FIRST)]);
    }

    #[test]
    #[should_panic]
    fn relative_slot_must_exist() {
        let _ = Instruction::executable(
            Address::from("0"),
            Encoding::default(),
            "rjmp".to_string(),
            Vec::new(),
            Some(RelativeBranch { offset: 0, slot: 0 }),
        );
    }

    #[test]
    fn serializes_with_operand_kinds() {
        let got = serde_json::to_value(brcc()).expect("instruction should serialize");
        assert_eq!(
            got,
            serde_json::json!({
                "address": "2ba",
                "is_directive": false,
                "encoding": [0xf4, 0x30],
                "opcode": "brcc",
                "operands": [{"kind": "hex", "value": "0x2c8"}],
                "relative": {"offset": 12, "slot": 0},
            })
        );
    }
}
