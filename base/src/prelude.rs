//! The prelude exports the structs which are useful in representing
//! a disassembly listing.  Providing this prelude is the main purpose
//! of the base crate.
pub use super::encoding::{swap_word_bytes, Encoding};
pub use super::instruction::*;
pub use super::types::*;
