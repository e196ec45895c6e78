use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::PathBuf,
};

use clap::Parser;
use linescan::{DEFAULT_CAPACITY, DeviceError, ServiceOptions};
use thiserror::Error;

mod driver;

use driver::Driver;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to read config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Device(#[from] DeviceError),
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Split lines into tokens through a linescan session",
    long_about = None
)]
struct Args {
    #[arg(value_name = "FILE", help = "Input file; standard input when omitted")]
    input: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "CHARS",
        help = "Replace the default separator set before reading"
    )]
    separators: Option<String>,

    #[arg(
        short = 'n',
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_CAPACITY,
        value_parser = parse_read_len,
        help = "Read buffer length; tokens keep at most BYTES - 1 bytes"
    )]
    max_len: usize,

    #[arg(short, long, value_name = "PATH", help = "JSON file with service options")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "BYTES", help = "Override the session buffer capacity")]
    capacity: Option<usize>,
}

fn parse_read_len(s: &str) -> Result<usize, String> {
    let len: usize = s.parse().map_err(|e| format!("{e}"))?;
    if len < 2 {
        return Err("read buffer must hold at least one byte and the terminator".into());
    }
    Ok(len)
}

/// Installs a stderr subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=linescan=debug`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn load_options(args: &Args) -> Result<ServiceOptions, CliError> {
    let mut options = match &args.config {
        Some(path) => {
            let file = File::open(path)?;
            serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::Config {
                path: path.clone(),
                source,
            })?
        }
        None => ServiceOptions::default(),
    };
    if let Some(capacity) = args.capacity {
        options.capacity = capacity;
    }
    Ok(options)
}

fn run() -> Result<(), CliError> {
    let args = Args::parse();
    let options = load_options(&args)?;
    let mut driver = Driver::new(
        options,
        args.separators.as_deref().map(str::as_bytes),
        args.max_len,
    )?;

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    let summary = match &args.input {
        Some(path) => driver.run(BufReader::new(File::open(path)?), out)?,
        None => driver.run(io::stdin().lock(), out)?,
    };
    if summary.skipped > 0 {
        eprintln!(
            "linescan: skipped {} of {} lines longer than the session buffer",
            summary.skipped, summary.lines
        );
    }
    Ok(())
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("linescan: {err}");
        std::process::exit(1);
    }
}
