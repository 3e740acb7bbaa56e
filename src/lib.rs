//! ods-extract - Streaming sheet extraction from OpenDocument Spreadsheets
//!
//! This library reads the sheets of an `.ods` file row by row without ever
//! holding the decompressed document in memory. The `content.xml` member is
//! decompressed in fixed-size chunks and fed into a push-style XML tokenizer,
//! whose events are turned into sheets, rows and cells on the fly.
//!
//! # Features
//!
//! - **Bounded memory**: one chunk, one row and one cell are buffered at a time
//! - **Sparse tables**: repeated rows and cells are expanded, while the padding
//!   runs office suites append to every sheet are dropped
//! - **Sheet selection**: by exact name, regular expression, list or closure
//! - **Outputs**: one CSV file per sheet (`csv` feature) or a row callback,
//!   optionally keyed by the header row
//! - **Progress and cancellation**: a callback after every chunk
//! - **YAML configuration** (`config` feature)
//!
//! # Example - Sheets to CSV files
//!
//! ```no_run
//! use std::fs::File;
//! use ods_extract::odf::ods::{CsvOutput, extract};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut out = CsvOutput::new("out");
//! extract(File::open("book.ods")?, &mut out)?;
//! for path in out.written_files() {
//!     println!("wrote {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Rows keyed by header
//!
//! ```no_run
//! use std::fs::File;
//! use ods_extract::odf::ods::{Extractor, Record, RowOutput};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let out = RowOutput::with_header_row(|sheet: &str, record: Record| {
//!     if let Record::Mapped(row) = record {
//!         println!("{}: {:?}", sheet, row.get("Name"));
//!     }
//!     Ok(())
//! });
//! Extractor::new()
//!     .sheets("Customers")
//!     .extract(File::open("book.ods")?, out)?;
//! # Ok(())
//! # }
//! ```

/// Shared infrastructure: errors and the push XML parser
pub mod common;

/// OpenDocument Format support
pub mod odf;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use odf::ods::{Extractor, OutputSink, Progress, Record, RowOutput, SheetPredicate, extract};

#[cfg(feature = "csv")]
pub use odf::ods::CsvOutput;

#[cfg(feature = "config")]
pub use odf::ods::ExtractConfig;

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
