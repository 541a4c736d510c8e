use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{event, span, Level};

use super::labels::{resolve_labels, ResolvedListing};
use super::listing::Listing;
use super::output::{render, OutputFormat};
use super::types::{IoAction, IoFailed, IoTarget, TranspileFailure};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub format: OutputFormat,
}

/// Parse `body` and resolve its labels.
///
/// # Errors
///
/// See [`Listing::parse`] and [`resolve_labels`].
pub fn resolve_source(body: &str) -> Result<ResolvedListing, TranspileFailure> {
    resolve_labels(Listing::parse(body)?)
}

/// Transform the text of a disassembly listing into fixture text.
///
/// # Errors
///
/// Fails if any line of `body` is malformed, if an address is
/// repeated, or if the output cannot be rendered.
pub fn transpile_source(body: &str, options: OutputOptions) -> Result<String, TranspileFailure> {
    let resolved = resolve_source(body)?;
    render(&resolved, options.format)
}

fn read_input(input_file: &OsStr) -> Result<String, TranspileFailure> {
    fs::read_to_string(input_file).map_err(|error| {
        TranspileFailure::Io(IoFailed {
            action: IoAction::Read,
            target: IoTarget::File(PathBuf::from(input_file)),
            error,
        })
    })
}

fn write_output(output_file: Option<&Path>, text: &str) -> Result<(), TranspileFailure> {
    match output_file {
        Some(path) => fs::write(path, text).map_err(|error| {
            TranspileFailure::Io(IoFailed {
                action: IoAction::Write,
                target: IoTarget::File(path.to_path_buf()),
                error,
            })
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|error| {
                    TranspileFailure::Io(IoFailed {
                        action: IoAction::Write,
                        target: IoTarget::Stdout,
                        error,
                    })
                })
        }
    }
}

/// Read the listing in `input_file` and write the result to
/// `output_file` (or to standard output if `output_file` is
/// `None`).  Nothing is written unless the whole listing is
/// transformed successfully.
///
/// # Errors
///
/// As for [`transpile_source`], plus failure to read the input or
/// write the output.
pub fn transpile_file(
    input_file: &OsStr,
    output_file: Option<&Path>,
    options: OutputOptions,
) -> Result<(), TranspileFailure> {
    let span = span!(Level::ERROR, "transpile", input=?input_file, output=?output_file);
    let _enter = span.enter();
    let body = read_input(input_file)?;
    let text = transpile_source(&body, options)?;
    event!(Level::DEBUG, "writing {} bytes of output", text.len());
    write_output(output_file, &text)
}
