//! OpenDocument Spreadsheet (.ods) streaming extraction.
//!
//! Sheets are decoded straight from the decompressed `content.xml` stream,
//! without building a document tree:
//!
//! ```text
//! ZipPackage -> chunks -> XmlPushParser -> SheetFilter -> RowDecoder -> OutputSink
//! ```
//!
//! The entry points are [`extract`] and the [`Extractor`] builder.

mod decoder;
mod extract;
mod filter;
mod options;
mod output;
mod predicate;

pub use decoder::{DecoderState, RowDecoder};
pub use extract::{Extractor, Progress, ProgressFn, extract};
pub use filter::SheetFilter;
#[cfg(feature = "config")]
pub use options::ExtractConfig;
pub use options::ExtractOptions;
#[cfg(feature = "csv")]
pub use output::{CsvOutput, sanitize_file_stem};
pub use output::{OutputSink, Record, RowMap, RowOutput};
#[cfg(feature = "config")]
pub use predicate::SheetFilterSpec;
pub use predicate::{SheetNameFn, SheetPredicate};
