//! Command-line tool writing every sheet of an OpenDocument Spreadsheet to
//! its own CSV file.
//!
//! # Usage
//!
//! All sheets:
//! ```sh
//! cargo run --example ods_to_csv -- book.ods -o out/
//! ```
//!
//! Selected sheets, with progress:
//! ```sh
//! cargo run --example ods_to_csv -- book.ods -o out/ \
//!     --sheet "Первый лист" --pattern "^Second" --progress
//! ```
//!
//! Settings from a YAML file (`chunk_size`, `sheets`):
//! ```sh
//! RUST_LOG=ods_extract=debug cargo run --example ods_to_csv -- book.ods -o out/ -c extract.yaml
//! ```

use clap::Parser;
use ods_extract::odf::ods::{CsvOutput, ExtractConfig, ExtractOptions, Extractor, SheetPredicate};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Extract OpenDocument Spreadsheet sheets to CSV files
#[derive(Parser, Debug)]
#[command(name = "ods_to_csv", version)]
struct Args {
    /// Input .ods file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory, created if missing
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extract the sheet with this exact name (repeatable)
    #[arg(long = "sheet", value_name = "NAME")]
    sheets: Vec<String>,

    /// Extract sheets whose name matches this regular expression (repeatable)
    #[arg(long = "pattern", value_name = "REGEX")]
    patterns: Vec<String>,

    /// Decompressed bytes per parsing step
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,

    /// Field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Print progress to stderr
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if !args.input.is_file() {
        eprintln!("Error: Input file does not exist: {}", args.input.display());
        std::process::exit(1);
    }
    if !args.delimiter.is_ascii() {
        eprintln!("Error: Delimiter must be a single ASCII character");
        std::process::exit(1);
    }

    let mut options = match &args.config {
        Some(path) => ExtractOptions::try_from(ExtractConfig::from_path(path)?)?,
        None => ExtractOptions::default(),
    };
    if let Some(chunk_size) = args.chunk_size {
        options.chunk_size = chunk_size;
    }
    if !args.sheets.is_empty() || !args.patterns.is_empty() {
        let mut members: Vec<SheetPredicate> =
            args.sheets.iter().map(SheetPredicate::name).collect();
        for pattern in &args.patterns {
            members.push(SheetPredicate::pattern(pattern)?);
        }
        options.sheets = SheetPredicate::any_of(members);
    }

    fs::create_dir_all(&args.output)?;
    let mut out = CsvOutput::new(&args.output).with_delimiter(args.delimiter as u8);

    let mut extractor = Extractor::new().options(options);
    if args.progress {
        extractor = extractor.on_progress(|p| {
            let percent = match p.total() {
                0 => 100,
                total => p.bytes_read * 100 / total,
            };
            eprint!("\r{:>3}% ({} / {} bytes)", percent, p.bytes_read, p.total());
            let _ = std::io::stderr().flush();
            ControlFlow::Continue(())
        });
    }

    let input = BufReader::new(File::open(&args.input)?);
    let result = extractor.extract(input, &mut out);
    if args.progress {
        eprintln!();
    }
    if let Err(e) = result {
        eprintln!("✗ {}: {}", args.input.display(), e);
        std::process::exit(1);
    }

    for path in out.written_files() {
        println!("✓ {}", path.display());
    }
    Ok(())
}
