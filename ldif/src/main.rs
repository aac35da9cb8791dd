use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use ldif::{LdifCopy, ParserConfig, WriterConfig, DEFAULT_COLS};

#[derive(Parser)]
#[command(name = "ldif-copy")]
#[command(about = "Re-encode an LDIF file: unfold, validate, filter and write it back out")]
struct Args {
    /// Input file (stdin if omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Attribute type to drop; may be repeated
    #[arg(long = "ignore", value_name = "ATTR")]
    ignore: Vec<String>,

    /// Attribute type to always write base64-encoded; may be repeated
    #[arg(long = "base64", value_name = "ATTR")]
    base64: Vec<String>,

    /// Stop after this many records (0 copies everything)
    #[arg(long, value_name = "N", default_value_t = 0)]
    max_entries: usize,

    /// Fold output lines at this width
    #[arg(long, value_name = "N", default_value_t = DEFAULT_COLS)]
    cols: usize,

    /// Terminate output lines with CRLF
    #[arg(long)]
    crlf: bool,

    /// URL scheme whose `attr:< url` values are fetched; may be repeated
    #[arg(long = "url-scheme", value_name = "SCHEME")]
    url_schemes: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: Args) -> ldif::Result<usize> {
    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let parser_config = ParserConfig::new()
        .with_max_entries(args.max_entries)
        .with_ignored_attr_types(&args.ignore)
        .with_url_schemes(&args.url_schemes);
    let writer_config = WriterConfig::new()
        .with_base64_attrs(&args.base64)
        .with_cols(args.cols)
        .with_line_sep(if args.crlf { "\r\n" } else { "\n" });

    let mut copy = LdifCopy::new(input, output, parser_config, writer_config)?;
    let count = copy.copy()?;
    copy.into_output().flush()?;
    Ok(count)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(format!("ldif={},warn", log_level))
        .init();

    match run(args) {
        Ok(count) => {
            info!(count, "records copied");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ldif-copy: {}", e);
            ExitCode::FAILURE
        }
    }
}
