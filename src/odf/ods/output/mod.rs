//! Destinations for decoded rows.
//!
//! The decoder talks to an [`OutputSink`] only: one `start_sheet`, any number
//! of `write_row`s, one `end_sheet` per extracted sheet. Two sinks ship with
//! the crate:
//!
//! - [`CsvOutput`] writes one fully-quoted delimited file per sheet
//! - [`RowOutput`] hands each row to a callback, optionally keyed by a header row

#[cfg(feature = "csv")]
mod delimited;
mod rows;

#[cfg(feature = "csv")]
pub use delimited::{CsvOutput, sanitize_file_stem};
pub use rows::{Record, RowMap, RowOutput};

use crate::common::Result;

/// Receiver of decoded sheets and rows.
///
/// Errors returned from any method abort the extraction and are returned from
/// it unchanged.
pub trait OutputSink {
    /// A sheet named `name` begins. Names are not unique and not path-safe.
    fn start_sheet(&mut self, name: &str) -> Result<()>;

    /// One logical row of the current sheet, cells in column order.
    fn write_row(&mut self, cells: &[String]) -> Result<()>;

    /// The current sheet is complete.
    fn end_sheet(&mut self) -> Result<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn start_sheet(&mut self, name: &str) -> Result<()> {
        (**self).start_sheet(name)
    }

    fn write_row(&mut self, cells: &[String]) -> Result<()> {
        (**self).write_row(cells)
    }

    fn end_sheet(&mut self) -> Result<()> {
        (**self).end_sheet()
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn start_sheet(&mut self, name: &str) -> Result<()> {
        (**self).start_sheet(name)
    }

    fn write_row(&mut self, cells: &[String]) -> Result<()> {
        (**self).write_row(cells)
    }

    fn end_sheet(&mut self) -> Result<()> {
        (**self).end_sheet()
    }
}
