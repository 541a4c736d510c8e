//! Rendering of a resolved listing.
//!
//! Each instruction is rendered as
//!
//! `<encoding> [<label>: ]<opcode>[ <operand>, <operand>...]`
//!
//! In fixture mode the instructions are grouped into blocks, each of
//! which becomes one `assembler.expect(avr, ...)` test case.  A new
//! block begins at every `call` target.
use std::fmt::{self, Display, Formatter, Write};

use serde::Serialize;
use tracing::{event, span, Level};

use base::prelude::{Address, Instruction, Label};

use super::labels::ResolvedListing;
use super::types::TranspileFailure;


const FIXTURE_INDENT: &str = "    ";
const FIXTURE_FOOTER: &str = "    \"\")";

/// The form in which the resolved listing is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One rendered instruction per line.
    Plain,
    /// Test-case blocks, one per call target.
    #[default]
    Fixtures,
    /// The resolved listing as JSON.
    Json,
}

/// Displays one instruction in the fixture line format.
pub struct RenderedInstruction<'a>(pub &'a Instruction);

impl Display for RenderedInstruction<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let inst = self.0;
        write!(f, "{} ", inst.encoding())?;
        if let Some(label) = inst.label() {
            write!(f, "{label}: ")?;
        }
        f.write_str(inst.opcode())?;
        for (i, operand) in inst.operands().iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{operand}")?;
        }
        Ok(())
    }
}

/// A run of instructions which forms one test case.
#[derive(Debug)]
pub struct FixtureBlock<'a> {
    pub start: &'a Address,
    pub instructions: Vec<&'a Instruction>,
}

impl Display for FixtureBlock<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "// code at 0x{}", self.start)?;
        writeln!(f, "assembler.expect(avr,")?;
        for inst in &self.instructions {
            writeln!(f, "{FIXTURE_INDENT}\"{}\\n\" +", RenderedInstruction(inst))?;
        }
        writeln!(f, "{FIXTURE_FOOTER}")
    }
}

/// Split the listing into blocks.  A block starts immediately before
/// each call target; the first block starts at the first instruction.
/// No block is empty.
pub fn fixture_blocks(resolved: &ResolvedListing) -> Vec<FixtureBlock<'_>> {
    let mut blocks: Vec<FixtureBlock<'_>> = Vec::new();
    let mut current: Option<FixtureBlock<'_>> = None;
    for inst in resolved.listing.instructions() {
        if !resolved.labels.is_call_target(inst.address()) {
            if let Some(block) = current.as_mut() {
                block.instructions.push(inst);
                continue;
            }
        }
        if let Some(finished) = current.take() {
            blocks.push(finished);
        }
        event!(Level::DEBUG, "starting a fixture block at {}", inst.address());
        current = Some(FixtureBlock {
            start: inst.address(),
            instructions: vec![inst],
        });
    }
    if let Some(finished) = current {
        blocks.push(finished);
    }
    blocks
}

fn render_plain(resolved: &ResolvedListing) -> String {
    let mut out = String::new();
    for inst in resolved.listing.instructions() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}", RenderedInstruction(inst));
    }
    out
}

fn render_fixtures(resolved: &ResolvedListing) -> String {
    let mut out = String::new();
    for (i, block) in fixture_blocks(resolved).iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{block}");
    }
    out
}

#[derive(Serialize)]
struct LabelEntry<'a> {
    label: Label,
    address: &'a Address,
}

#[derive(Serialize)]
struct ListingDocument<'a> {
    kind: &'static str,
    instructions: Vec<&'a Instruction>,
    labels: Vec<LabelEntry<'a>>,
    call_targets: Vec<&'a Address>,
}

fn render_json(resolved: &ResolvedListing) -> Result<String, TranspileFailure> {
    let document = ListingDocument {
        kind: "listing",
        instructions: resolved.listing.instructions().collect(),
        labels: resolved
            .labels
            .labels()
            .iter()
            .map(|(label, address)| LabelEntry {
                label: *label,
                address,
            })
            .collect(),
        call_targets: resolved.labels.call_targets().collect(),
    };
    match serde_json::to_string_pretty(&document) {
        Ok(mut text) => {
            text.push('\n');
            Ok(text)
        }
        Err(e) => Err(TranspileFailure::Serialization(e.to_string())),
    }
}

/// Render `resolved` in the requested format.
///
/// # Errors
///
/// Only JSON rendering can fail, and only if serialization fails.
pub fn render(resolved: &ResolvedListing, format: OutputFormat) -> Result<String, TranspileFailure> {
    let span = span!(Level::ERROR, "render", format=?format);
    let _enter = span.enter();
    match format {
        OutputFormat::Plain => Ok(render_plain(resolved)),
        OutputFormat::Fixtures => Ok(render_fixtures(resolved)),
        OutputFormat::Json => render_json(resolved),
    }
}
