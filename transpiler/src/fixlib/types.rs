use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io::Error as IoError;
use std::path::PathBuf;

use base::prelude::Address;

/// Line numbers count from 1, as they do in error messages.
pub type LineNumber = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    Read,
    Write,
}

impl Display for IoAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoAction::Read => "read",
            IoAction::Write => "write",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoTarget {
    File(PathBuf),
    Stdout,
}

impl Display for IoTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IoTarget::File(name) => write!(f, "file {}", name.display()),
            IoTarget::Stdout => f.write_str("standard output"),
        }
    }
}

#[derive(Debug)]
pub struct IoFailed {
    pub action: IoAction,
    pub target: IoTarget,
    pub error: IoError,
}

impl Display for IoFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let IoFailed {
            action,
            target,
            error,
        } = self;
        write!(f, "failed to {action} {target}: {error}")
    }
}

/// Everything that can go wrong while turning a listing into
/// fixtures.  All of these are fatal; the input is machine-generated,
/// so we reject anything we don't fully understand.
#[derive(Debug)]
pub enum TranspileFailure {
    /// A line could not be split into address, bytes and opcode.
    Structural { line: LineNumber, msg: String },
    /// A token in operand position has none of the recognised forms.
    UnrecognisedOperand { line: LineNumber, token: String },
    /// Two lines claim the same address.
    DuplicateAddress {
        address: Address,
        first_line: LineNumber,
        line: LineNumber,
    },
    /// The resolved listing could not be serialized.
    Serialization(String),
    Io(IoFailed),
}

impl Display for TranspileFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            TranspileFailure::Structural { line, msg } => {
                write!(f, "line {line}: {msg}")
            }
            TranspileFailure::UnrecognisedOperand { line, token } => {
                write!(f, "line {line}: unrecognised operand '{token}'")
            }
            TranspileFailure::DuplicateAddress {
                address,
                first_line,
                line,
            } => {
                write!(
                    f,
                    "line {line}: address {address} was already used at line {first_line}"
                )
            }
            TranspileFailure::Serialization(msg) => {
                write!(f, "failed to serialize the listing: {msg}")
            }
            TranspileFailure::Io(e) => write!(f, "{e}"),
        }
    }
}

impl Error for TranspileFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TranspileFailure::Io(IoFailed { error, .. }) => Some(error),
            _ => None,
        }
    }
}

#[test]
fn test_failure_messages_identify_line() {
    assert_eq!(
        TranspileFailure::UnrecognisedOperand {
            line: 7,
            token: "@foo".to_string()
        }
        .to_string(),
        "line 7: unrecognised operand '@foo'"
    );
    assert_eq!(
        TranspileFailure::DuplicateAddress {
            address: Address::from("2ba"),
            first_line: 3,
            line: 9,
        }
        .to_string(),
        "line 9: address 2ba was already used at line 3"
    );
}

#[test]
fn test_io_failure_message() {
    let failure = TranspileFailure::Io(IoFailed {
        action: IoAction::Write,
        target: IoTarget::Stdout,
        error: IoError::other("disk on fire"),
    });
    assert_eq!(
        failure.to_string(),
        "failed to write standard output: disk on fire"
    );
    assert!(failure.source().is_some());
}
