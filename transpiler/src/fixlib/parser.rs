//! Decodes one line of an AVR disassembly listing.
//!
//! The lines we care about look like one of
//!
//! ```text
//! 2ba:	30 f4       	brcc	.+12     	; 0x2c8 <main+0x1a>
//!  ca:	08 00       	.word	0x0008	; ????
//! ```
//!
//! that is, an address, the raw bytes, then either a mnemonic and its
//! operands or a data directive and its value.  Anything after a `;`
//! is the disassembler's comment, which we ignore except that for a
//! relative branch it tells us the absolute target address.
//!
//! Lines which don't begin with an address (section headers, symbol
//! headings, blank lines) are skipped.
use tracing::{event, Level};

use base::prelude::{Address, Encoding, Instruction, Operand, RelativeBranch};

use super::lexer::{tokenize, Token};
use super::operand::{classify, classify_hex};
use super::rx::TokenPattern;
use super::types::{LineNumber, TranspileFailure};


static RX_ADDRESS: TokenPattern = TokenPattern::new("an address", "^(?<address>[0-9A-Za-z]+):$");
static RX_BYTE: TokenPattern = TokenPattern::new("an instruction byte", "^[0-9A-Fa-f]{2}$");
static RX_MNEMONIC: TokenPattern = TokenPattern::new("an opcode", "^[a-z]+$");

/// Walks the tokens of a line.  Every consumption is bounds-checked;
/// running off the end of the line is a structural error.
struct Cursor<'a, 'src> {
    line: LineNumber,
    tokens: &'a [Token<'src>],
    pos: usize,
}

impl<'a, 'src> Cursor<'a, 'src> {
    fn new(line: LineNumber, tokens: &'a [Token<'src>]) -> Cursor<'a, 'src> {
        Cursor {
            line,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token<'src>> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn structural(&self, msg: String) -> TranspileFailure {
        TranspileFailure::Structural {
            line: self.line,
            msg,
        }
    }

    /// Consume a word.  `what` describes what we expected to find, for
    /// the error message.
    fn expect_word(&mut self, what: &str) -> Result<&'src str, TranspileFailure> {
        match self.next() {
            Some(Token::Word(w)) => Ok(w),
            Some(Token::Semicolon) => Err(self.structural(format!("expected {what} but found ';'"))),
            None => Err(self.structural(format!("expected {what} but the line ended"))),
        }
    }

    /// Consume the run of two-digit hex tokens which holds the raw
    /// instruction bytes, stopping at the first token which isn't one.
    fn take_bytes(&mut self) -> Result<Vec<u8>, TranspileFailure> {
        let mut bytes = Vec::new();
        while let Some(Token::Word(w)) = self.peek() {
            if !RX_BYTE.is_match(w) {
                break;
            }
            match u8::from_str_radix(w, 16) {
                Ok(b) => bytes.push(b),
                Err(e) => {
                    return Err(self.structural(format!("invalid byte '{w}': {e}")));
                }
            }
            self.pos += 1;
        }
        Ok(bytes)
    }
}

fn address_of(token: &str) -> Option<Address> {
    RX_ADDRESS
        .captures(token)
        .map(|cap| Address::new(&cap["address"]))
}

/// Parse a single line of the listing.
///
/// Returns `Ok(None)` for lines which are not address-bearing
/// records.
///
/// # Errors
///
/// - the line has an address but no instruction bytes
/// - the opcode is missing or is not a lowercase mnemonic
/// - a directive has no hex value
/// - an operand token cannot be classified
/// - a relative branch has no target address after the `;`
pub(crate) fn parse_line(
    line_number: LineNumber,
    text: &str,
) -> Result<Option<Instruction>, TranspileFailure> {
    let tokens = tokenize(text);
    let address = match tokens.first() {
        Some(Token::Word(first)) => match address_of(first) {
            Some(address) => address,
            None => {
                event!(
                    Level::TRACE,
                    "line {line_number}: '{first}' is not an address, skipping line"
                );
                return Ok(None);
            }
        },
        Some(Token::Semicolon) | None => {
            return Ok(None);
        }
    };
    let mut cursor = Cursor::new(line_number, &tokens[1..]);

    let bytes = cursor.take_bytes()?;
    if bytes.is_empty() {
        return Err(cursor.structural(format!(
            "the record at address {address} has no instruction bytes"
        )));
    }

    let opcode = cursor.expect_word("an opcode or directive")?;
    if opcode.starts_with('.') {
        let value_token = cursor.expect_word(&format!("a value for directive {opcode}"))?;
        let value = classify_hex(value_token).ok_or_else(|| {
            cursor.structural(format!(
                "the value of directive {opcode} should be a hex immediate, but it is '{value_token}'"
            ))
        })?;
        return Ok(Some(Instruction::directive(
            address,
            Encoding::verbatim(bytes),
            opcode.to_string(),
            value,
        )));
    }
    if !RX_MNEMONIC.is_match(opcode) {
        return Err(cursor.structural(format!(
            "expected {} but found '{opcode}'",
            RX_MNEMONIC.describes()
        )));
    }

    let mut operands: Vec<Operand> = Vec::new();
    let mut relative: Option<RelativeBranch> = None;
    let mut reached_comment = false;
    while let Some(token) = cursor.next() {
        let word = match token {
            Token::Semicolon => {
                reached_comment = true;
                break;
            }
            Token::Word(w) => w.strip_suffix(',').unwrap_or(w),
        };
        if word.is_empty() {
            continue;
        }
        let classified = classify(word).map_err(|e| TranspileFailure::UnrecognisedOperand {
            line: line_number,
            token: e.token,
        })?;
        let offset = classified.relative_offset();
        let slot = classified.append_to(&mut operands);
        if let Some(offset) = offset {
            if relative.is_some() {
                return Err(cursor.structural(format!(
                    "{opcode} has more than one relative displacement"
                )));
            }
            relative = Some(RelativeBranch { offset, slot });
        }
    }

    if let Some(branch) = relative {
        if !reached_comment {
            return Err(cursor.structural(format!(
                "relative branch {opcode} .{:+} is not followed by its target address",
                branch.offset
            )));
        }
        let target_token = cursor.expect_word("the target address of a relative branch")?;
        let target = classify_hex(target_token).ok_or_else(|| {
            cursor.structural(format!(
                "the target address of a relative branch should be a hex immediate, but it is '{target_token}'"
            ))
        })?;
        operands[branch.slot] = target;
    }

    Ok(Some(Instruction::executable(
        address,
        Encoding::from_listing_order(bytes),
        opcode.to_string(),
        operands,
        relative,
    )))
}
