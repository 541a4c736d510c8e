//! Label resolution.
//!
//! Branch, jump and call targets are given synthetic labels (`L1`,
//! `L2`, ...) in the order in which they are first referenced.  This
//! happens in two passes:
//!
//! 1. Discovery: every `jmp`, `call` and relative branch target gets
//!    a label, and the instruction at that address (if it is part of
//!    the listing) is tagged with it.  Targets of `call` are also
//!    remembered, since each one starts a separate fixture.
//! 2. Rewriting: the target operand of each relative branch is
//!    replaced by the target's label.  Absolute `jmp` and `call`
//!    operands keep their numeric form.
use std::collections::{BTreeMap, BTreeSet};

use tracing::{event, span, Level};

use base::prelude::{Address, Instruction, Label, Operand};

use super::listing::Listing;
use super::types::{LineNumber, TranspileFailure};


const JUMP: &str = "jmp";
const CALL: &str = "call";

/// The labels assigned to a listing.  Built once by [`resolve_labels`]
/// and read-only thereafter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelMap {
    by_address: BTreeMap<Address, Label>,
    in_order: Vec<(Label, Address)>,
    call_targets: BTreeSet<Address>,
}

impl LabelMap {
    pub fn get(&self, address: &Address) -> Option<Label> {
        self.by_address.get(address).copied()
    }

    /// All labels, in the order in which they were assigned.
    pub fn labels(&self) -> &[(Label, Address)] {
        &self.in_order
    }

    pub fn is_call_target(&self, address: &Address) -> bool {
        self.call_targets.contains(address)
    }

    pub fn call_targets(&self) -> impl Iterator<Item = &Address> {
        self.call_targets.iter()
    }

    pub fn len(&self) -> usize {
        self.in_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_order.is_empty()
    }
}

/// A listing whose branch targets have been labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedListing {
    pub listing: Listing,
    pub labels: LabelMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferKind {
    Jump,
    Call,
    RelativeBranch,
}

#[derive(Debug)]
struct Transfer {
    kind: TransferKind,
    target: Address,
}

/// Identify the control transfer performed by `inst`, if any.
fn transfer_of(inst: &Instruction, line: LineNumber) -> Result<Option<Transfer>, TranspileFailure> {
    let (kind, operand): (TransferKind, Option<&Operand>) = match inst.opcode() {
        JUMP => (TransferKind::Jump, inst.operands().first()),
        CALL => (TransferKind::Call, inst.operands().first()),
        _ if inst.relative_branch().is_some() => {
            (TransferKind::RelativeBranch, inst.branch_target_operand())
        }
        _ => {
            return Ok(None);
        }
    };
    match operand.and_then(|op| op.as_hex_address()) {
        Some(target) => Ok(Some(Transfer { kind, target })),
        None => Err(TranspileFailure::Structural {
            line,
            msg: format!(
                "the target of {} at {} should be a hex address",
                inst.opcode(),
                inst.address()
            ),
        }),
    }
}

/// Resolution state; owned by a single call to [`resolve_labels`].
struct LabelResolver {
    next: Label,
    map: LabelMap,
}

impl LabelResolver {
    fn new() -> LabelResolver {
        LabelResolver {
            next: Label::FIRST,
            map: LabelMap::default(),
        }
    }

    fn label_for(&mut self, target: &Address) -> Label {
        if let Some(existing) = self.map.by_address.get(target) {
            return *existing;
        }
        let label = self.next;
        self.next = label.successor();
        event!(Level::DEBUG, "assigned label {label} to address {target}");
        self.map.by_address.insert(target.clone(), label);
        self.map.in_order.push((label, target.clone()));
        label
    }

    fn discover(&mut self, listing: &mut Listing) -> Result<(), TranspileFailure> {
        let mut transfers: Vec<Transfer> = Vec::new();
        for line in listing.lines() {
            if let Some(transfer) = transfer_of(&line.instruction, line.line_number)? {
                transfers.push(transfer);
            }
        }
        for Transfer { kind, target } in transfers {
            let label = self.label_for(&target);
            match listing.get_mut(&target) {
                Some(destination) => {
                    destination.attach_label(label);
                }
                None => {
                    event!(
                        Level::DEBUG,
                        "target {target} ({label}) lies outside the listing"
                    );
                }
            }
            if kind == TransferKind::Call {
                self.map.call_targets.insert(target);
            }
        }
        Ok(())
    }

    fn rewrite(&self, listing: &mut Listing) {
        for line in listing.lines_mut() {
            let inst = &mut line.instruction;
            let Some(branch) = inst.relative_branch() else {
                continue;
            };
            let label = inst
                .branch_target_operand()
                .and_then(|op| op.as_hex_address())
                .and_then(|target| self.map.get(&target));
            if let Some(label) = label {
                inst.replace_operand(branch.slot, Operand::Label(label));
            }
        }
    }
}

/// Assign labels to the branch targets of `listing`.
///
/// # Errors
///
/// Fails if a `jmp` or `call` instruction has no hex target operand.
pub fn resolve_labels(mut listing: Listing) -> Result<ResolvedListing, TranspileFailure> {
    let span = span!(Level::ERROR, "resolve labels");
    let _enter = span.enter();
    let mut resolver = LabelResolver::new();
    resolver.discover(&mut listing)?;
    resolver.rewrite(&mut listing);
    event!(
        Level::DEBUG,
        "assigned {} labels; {} call targets",
        resolver.map.len(),
        resolver.map.call_targets.len()
    );
    Ok(ResolvedListing {
        listing,
        labels: resolver.map,
    })
}
