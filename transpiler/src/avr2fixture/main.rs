use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{event, span, Level};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use transpiler::{transpile_file, OutputFormat, OutputOptions, TranspileFailure};

/// Log level used when RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "info";

/// Turn an AVR disassembly listing into assembler test fixtures
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Disassembly listing to read (as produced by `avr-objdump -d`).
    input: OsString,

    /// Where to write the result; standard output if omitted.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<OsString>,

    /// What kind of output to produce.
    #[arg(value_enum, long, default_value_t = OutputFormat::Fixtures)]
    format: OutputFormat,
}

/// Why the program is exiting unsuccessfully.
#[derive(Debug)]
enum Exit {
    /// Logging could not be set up.
    Logging(String),
    /// The listing could not be transformed.
    Transpile(TranspileFailure),
}

impl std::fmt::Display for Exit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exit::Logging(msg) => write!(f, "cannot set up logging: {msg}"),
            Exit::Transpile(failure) => write!(f, "{failure}"),
        }
    }
}

/// Send log events to standard error, filtered by RUST_LOG.
/// Standard output is reserved for the transpiled text.
fn init_logging() -> Result<(), Exit> {
    let filter = match std::env::var_os(EnvFilter::DEFAULT_ENV) {
        Some(_) => EnvFilter::try_from_default_env().map_err(|e| e.to_string()),
        None => EnvFilter::try_new(DEFAULT_LOG_FILTER).map_err(|e| e.to_string()),
    }
    .map_err(|e| Exit::Logging(format!("invalid {} setting: {e}", EnvFilter::DEFAULT_ENV)))?;
    let to_stderr = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(to_stderr)
        .try_init()
        .map_err(|e| Exit::Logging(e.to_string()))
}

fn run(args: Args) -> Result<(), Exit> {
    init_logging()?;
    let span = span!(Level::ERROR, "avr2fixture", input=?args.input, output=?args.output, format=?args.format);
    let _enter = span.enter();
    let output: Option<PathBuf> = args.output.map(PathBuf::from);
    let options = OutputOptions {
        format: args.format,
    };
    match transpile_file(&args.input, output.as_deref(), options) {
        Ok(()) => {
            event!(Level::INFO, "done");
            Ok(())
        }
        Err(failure) => {
            event!(Level::ERROR, "transpilation failed: {failure:?}");
            Err(Exit::Transpile(failure))
        }
    }
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("avr2fixture: {e}");
            ExitCode::FAILURE
        }
    }
}
