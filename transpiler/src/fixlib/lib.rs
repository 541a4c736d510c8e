#![deny(unreachable_pub)]
#![deny(unsafe_code)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::manual_string_new)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::wildcard_imports)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::items_after_statements)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // fix soon
#![allow(clippy::module_name_repetitions)]

//! Turns an AVR disassembly listing into label-resolved assembler
//! test fixtures.
//!
//! The pipeline is: [`Listing::parse`] (tokenizing and classifying
//! each line), [`resolve_labels`], then [`render`].  [`transpile_file`]
//! and [`transpile_source`] run the whole thing.

mod driver;
mod labels;
mod lexer;
mod listing;
mod operand;
mod output;
mod parser;
mod rx;
mod types;

pub use driver::*;
pub use labels::{resolve_labels, LabelMap, ResolvedListing};
pub use listing::{Listing, ListingLine};
pub use output::{fixture_blocks, render, FixtureBlock, OutputFormat, RenderedInstruction};
pub use types::{IoAction, IoFailed, IoTarget, LineNumber, TranspileFailure};
