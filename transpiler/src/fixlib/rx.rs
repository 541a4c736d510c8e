//! Regular expressions used to recognise listing tokens.
use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;
use std::sync::OnceLock;

use regex::Regex;

/// A pattern for one kind of token.  The regular expression is
/// compiled when the pattern is first used, so patterns can live in
/// statics.
pub(crate) struct TokenPattern {
    compiled: OnceLock<Regex>,
    source: &'static str,
    /// What a matching token is, for use in diagnostics ("an
    /// opcode").
    describes: &'static str,
}

impl TokenPattern {
    pub(crate) const fn new(describes: &'static str, source: &'static str) -> TokenPattern {
        TokenPattern {
            compiled: OnceLock::new(),
            source,
            describes,
        }
    }

    pub(crate) fn describes(&self) -> &'static str {
        self.describes
    }
}

impl Debug for TokenPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TokenPattern({}: /{}/)", self.describes, self.source)
    }
}

impl Deref for TokenPattern {
    type Target = Regex;

    fn deref(&self) -> &Regex {
        self.compiled
            .get_or_init(|| match Regex::new(self.source) {
                Ok(rx) => rx,
                Err(e) => {
                    panic!(
                        "pattern for {} /{}/ does not compile: {e}",
                        self.describes, self.source
                    );
                }
            })
    }
}

#[test]
fn test_pattern_compiles_on_use() {
    static BYTE: TokenPattern = TokenPattern::new("a byte", "^[0-9a-f]{2}$");
    assert!(BYTE.is_match("f4"));
    assert!(!BYTE.is_match("f43"));
    assert_eq!(BYTE.describes(), "a byte");
    assert_eq!(format!("{:?}", &BYTE), "TokenPattern(a byte: /^[0-9a-f]{2}$/)");
}
