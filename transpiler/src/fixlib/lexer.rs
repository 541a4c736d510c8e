//! Splits one listing line into tokens.
//!
//! Listing lines are whitespace-separated.  The only token with a
//! meaning of its own is a lone `;`, which introduces the
//! disassembler's comment; everything else is a word which the
//! parser interprets according to its position in the line.
use std::fmt::{self, Display, Formatter};

use logos::Logos;

#[cfg(test)]
mod tests;

#[derive(Debug, PartialEq, Eq, Logos, Clone, Copy)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum Token<'src> {
    #[token(";", priority = 10)]
    Semicolon,

    #[regex(r"[^ \t\r\n\f]+", |lex| lex.slice())]
    Word(&'src str),
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Semicolon => f.write_str(";"),
            Token::Word(w) => f.write_str(w),
        }
    }
}

/// Return the tokens of `line` in order.
pub(crate) fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut lexer = Token::lexer(line);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        // Every non-whitespace character can start a word, so the
        // lexer has no error cases in practice.  If it ever reports
        // one, keep the text rather than losing it.
        tokens.push(result.unwrap_or(Token::Word(lexer.slice())));
    }
    tokens
}
