//! Reconstruction of sheets, rows and cells from `content.xml` events.
//!
//! ODS stores tables sparsely: `table:number-rows-repeated` and
//! `table:number-columns-repeated` say "this row (cell) occurs N times in a
//! row". Runs are expanded literally, with one exception. Office suites close
//! every sheet with a blank run reaching the format's 2^20-row limit, and every
//! row with a blank run reaching the 2^14-column limit. A run that would reach
//! the limit is therefore read as "nothing else follows" and dropped instead of
//! producing up to a million empty rows.
//!
//! Everything inside a cell that is character data becomes its text, whatever
//! element it is nested in (`text:p`, `text:span`, ...). The text is trimmed of
//! surrounding ASCII whitespace when the cell closes.

use crate::common::xml::{Attributes, MarkupHandler};
use crate::common::{Error, Result};
use crate::odf::constants::{
    ATTR_COLUMNS_REPEATED, ATTR_ROWS_REPEATED, ATTR_TABLE_NAME, MAX_CELLS_PER_ROW,
    MAX_ROWS_PER_SHEET, TABLE_TABLE, TABLE_TABLE_CELL, TABLE_TABLE_ROW,
};
use crate::odf::ods::output::OutputSink;

/// Where the decoder is in the sheet > row > cell nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Idle,
    InSheet,
    InRow,
    InCell,
}

/// Markup handler turning ODS table events into [`OutputSink`] calls.
pub struct RowDecoder<S> {
    sink: S,
    state: DecoderState,
    /// Rows accounted for in the current sheet, runs included
    rows_emitted: u64,
    row_repeat: u64,
    cell_repeat: u64,
    cells: Vec<String>,
    text: String,
    /// Sheets opened inside the current sheet, which are not decoded
    nested_sheets: usize,
}

impl<S: OutputSink> RowDecoder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: DecoderState::Idle,
            rows_emitted: 0,
            row_repeat: 0,
            cell_repeat: 0,
            cells: Vec::new(),
            text: String::with_capacity(512),
            nested_sheets: 0,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn start_sheet(&mut self, attributes: &Attributes<'_>) -> Result<()> {
        if self.state != DecoderState::Idle {
            self.nested_sheets += 1;
            tracing::debug!(state = ?self.state, "ignoring sheet nested in another sheet");
            return Ok(());
        }
        let name = attributes
            .get(ATTR_TABLE_NAME)
            .ok_or_else(|| Error::missing_attribute(TABLE_TABLE, ATTR_TABLE_NAME))?;
        tracing::debug!(sheet = name, "sheet started");
        self.sink.start_sheet(name)?;
        self.rows_emitted = 0;
        self.state = DecoderState::InSheet;
        Ok(())
    }

    fn start_row(&mut self, attributes: &Attributes<'_>) {
        if self.state != DecoderState::InSheet {
            tracing::debug!(state = ?self.state, "ignoring row outside of a sheet");
            return;
        }
        let mut repeat = repeat_count(attributes, ATTR_ROWS_REPEATED);
        if self.rows_emitted.saturating_add(repeat) >= MAX_ROWS_PER_SHEET {
            tracing::trace!(repeat, rows = self.rows_emitted, "dropping row run reaching the sheet limit");
            repeat = 0;
        }
        self.row_repeat = repeat;
        self.cells.clear();
        self.state = DecoderState::InRow;
    }

    fn start_cell(&mut self, attributes: &Attributes<'_>) {
        if self.state != DecoderState::InRow {
            tracing::debug!(state = ?self.state, "ignoring cell outside of a row");
            return;
        }
        let mut repeat = repeat_count(attributes, ATTR_COLUMNS_REPEATED);
        if (self.cells.len() as u64).saturating_add(repeat) >= MAX_CELLS_PER_ROW {
            tracing::trace!(repeat, cells = self.cells.len(), "dropping cell run reaching the row limit");
            repeat = 0;
        }
        self.cell_repeat = repeat;
        self.text.clear();
        self.state = DecoderState::InCell;
    }

    fn end_cell(&mut self) {
        if self.state != DecoderState::InCell {
            return;
        }
        if self.cell_repeat > 0 {
            let value = trim_cell_text(&self.text);
            for _ in 0..self.cell_repeat {
                self.cells.push(value.to_string());
            }
        }
        self.text.clear();
        self.state = DecoderState::InRow;
    }

    fn end_row(&mut self) -> Result<()> {
        if self.state != DecoderState::InRow {
            return Ok(());
        }
        self.rows_emitted += self.row_repeat;
        for _ in 0..self.row_repeat {
            self.sink.write_row(&self.cells)?;
        }
        self.cells.clear();
        self.state = DecoderState::InSheet;
        Ok(())
    }

    fn end_sheet(&mut self) -> Result<()> {
        if self.nested_sheets > 0 {
            self.nested_sheets -= 1;
            return Ok(());
        }
        if self.state == DecoderState::Idle {
            return Ok(());
        }
        if self.state != DecoderState::InSheet {
            tracing::debug!(state = ?self.state, "sheet closed with an open row");
        }
        tracing::debug!(rows = self.rows_emitted, "sheet finished");
        self.cells.clear();
        self.text.clear();
        self.state = DecoderState::Idle;
        self.sink.end_sheet()
    }
}

impl<S: OutputSink> MarkupHandler for RowDecoder<S> {
    fn element_start(&mut self, name: &str, attributes: &Attributes<'_>) -> Result<()> {
        if self.nested_sheets > 0 && name != TABLE_TABLE {
            return Ok(());
        }
        match name {
            TABLE_TABLE => self.start_sheet(attributes)?,
            TABLE_TABLE_ROW => self.start_row(attributes),
            TABLE_TABLE_CELL => self.start_cell(attributes),
            _ => {},
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.state == DecoderState::InCell && self.nested_sheets == 0 {
            self.text.push_str(text);
        }
        Ok(())
    }

    fn element_end(&mut self, name: &str) -> Result<()> {
        // Rows and cells of a nested sheet belong to that sheet
        if self.nested_sheets > 0 && name != TABLE_TABLE {
            return Ok(());
        }
        match name {
            TABLE_TABLE => self.end_sheet(),
            TABLE_TABLE_ROW => self.end_row(),
            TABLE_TABLE_CELL => {
                self.end_cell();
                Ok(())
            },
            _ => Ok(()),
        }
    }
}

/// Run length declared by `attribute`, 1 when absent.
fn repeat_count(attributes: &Attributes<'_>, attribute: &str) -> u64 {
    let Some(raw) = attributes.get(attribute) else {
        return 1;
    };
    match raw.trim().parse::<u64>() {
        Ok(count) => count,
        Err(_) => {
            tracing::warn!(attribute, value = raw, "unparseable repeat count, using 1");
            1
        },
    }
}

/// Strip leading and trailing ASCII whitespace and NULs.
fn trim_cell_text(text: &str) -> &str {
    text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r' | '\0'))
}
