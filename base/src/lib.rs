//! The `base` crate defines the representation of a disassembled AVR
//! program listing which is useful to any tool working with such
//! listings.  The idea is that if you want to write something which
//! reads or produces these listings, it would depend on the base
//! crate but would not need to depend on the transpiler library
//! itself.

mod encoding;
mod instruction;
mod types;

pub mod prelude;
