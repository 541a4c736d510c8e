//! Classification of the tokens which appear in operand position.
//!
//! The rules are tried in a fixed order and the first match wins:
//!
//! 1. hex immediate (`0x2A`)
//! 2. register, optionally with an increment/decrement marker, or
//!    with a displacement (`r5`, `X+`, `-Z`, `Y+12`)
//! 3. relative branch displacement (`.+12`, `.-6`)
//! 4. decimal immediate (`37`)
use std::fmt::{self, Display, Formatter};

use base::prelude::Operand;

use super::rx::TokenPattern;

static RX_HEX: TokenPattern = TokenPattern::new("a hex immediate", "^0x[0-9A-Fa-f]+$");
static RX_REGISTER: TokenPattern =
    TokenPattern::new("a register", r"^(?:r[0-9]+|[XYZ]|-[XYZ]|[XYZ]\+)$");
static RX_DISPLACED_REGISTER: TokenPattern = TokenPattern::new(
    "a register with displacement",
    r"^(?<base>[YZ]\+)(?<displacement>[0-9]+)$",
);
static RX_RELATIVE: TokenPattern =
    TokenPattern::new("a relative displacement", r"^\.(?<offset>[+-]?[0-9]+)$");
static RX_DECIMAL: TokenPattern = TokenPattern::new("a decimal immediate", "^[0-9]+$");

/// The result of classifying a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Classified {
    One(Operand),
    /// A register with a displacement (`Y+12`) stands for two
    /// operands: the register (`Y+`) and the displacement (`#12`).
    Displaced {
        register: Operand,
        displacement: Operand,
    },
}

impl Classified {
    /// Append the operand(s) to `operands`, returning the position of
    /// the first one.
    pub(crate) fn append_to(self, operands: &mut Vec<Operand>) -> usize {
        let slot = operands.len();
        match self {
            Classified::One(op) => operands.push(op),
            Classified::Displaced {
                register,
                displacement,
            } => {
                operands.push(register);
                operands.push(displacement);
            }
        }
        slot
    }

    pub(crate) fn relative_offset(&self) -> Option<i32> {
        match self {
            Classified::One(Operand::Relative(offset)) => Some(*offset),
            _ => None,
        }
    }
}

/// Signals that a token has none of the recognised operand forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unrecognised {
    pub(crate) token: String,
}

impl Display for Unrecognised {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised operand '{}'", self.token)
    }
}

pub(crate) fn classify(token: &str) -> Result<Classified, Unrecognised> {
    if RX_HEX.is_match(token) {
        return Ok(Classified::One(Operand::Hex(token.to_string())));
    }
    if RX_REGISTER.is_match(token) {
        return Ok(Classified::One(Operand::Register(token.to_string())));
    }
    if let Some(cap) = RX_DISPLACED_REGISTER.captures(token) {
        return Ok(Classified::Displaced {
            register: Operand::Register(cap["base"].to_string()),
            displacement: Operand::Decimal(cap["displacement"].to_string()),
        });
    }
    if let Some(cap) = RX_RELATIVE.captures(token) {
        // i32's FromStr accepts a leading '+'.
        return match cap["offset"].parse::<i32>() {
            Ok(offset) => Ok(Classified::One(Operand::Relative(offset))),
            Err(_) => Err(Unrecognised {
                token: token.to_string(),
            }),
        };
    }
    if RX_DECIMAL.is_match(token) {
        return Ok(Classified::One(Operand::Decimal(token.to_string())));
    }
    Err(Unrecognised {
        token: token.to_string(),
    })
}

/// Classify a token which must be a hex immediate, such as the value
/// of a data directive or the target address in a branch comment.
pub(crate) fn classify_hex(token: &str) -> Option<Operand> {
    if RX_HEX.is_match(token) {
        Some(Operand::Hex(token.to_string()))
    } else {
        None
    }
}
