//! Row-by-row callback output, optionally keyed by a header row.

use std::sync::Arc;

use super::OutputSink;
use crate::common::Result;

/// A row delivered to a [`RowOutput`] callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Cell values in column order
    Values(Vec<String>),
    /// Cell values keyed by the sheet's header row
    Mapped(RowMap),
}

/// A row keyed by the header row of its sheet.
///
/// Keys are the distinct header names in order of first appearance. A value
/// is `None` when the row is shorter than the header (the cell is absent) and
/// `Some("")` when the cell exists but is empty. If a header name occurs more
/// than once, the key holds the value of its last column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMap {
    keys: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl RowMap {
    /// Value for `key`: `None` if the header has no such column,
    /// `Some(None)` if the row is too short to reach it.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        let index = self.keys.iter().position(|k| k == key)?;
        Some(self.values[index].as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// `(key, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_deref))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, Option<String>)> {
        self.keys.iter().cloned().zip(self.values).collect()
    }
}

/// Header row of the current sheet.
struct Header {
    keys: Arc<[String]>,
    /// Key index for each header column
    slots: Vec<usize>,
}

impl Header {
    fn new(cells: &[String]) -> Self {
        let mut keys: Vec<String> = Vec::with_capacity(cells.len());
        let slots = cells
            .iter()
            .map(|name| match keys.iter().position(|k| k == name) {
                Some(slot) => slot,
                None => {
                    keys.push(name.clone());
                    keys.len() - 1
                },
            })
            .collect();
        Self {
            keys: keys.into(),
            slots,
        }
    }

    /// Pair `cells` with the header: missing cells become `None`, cells past
    /// the last header column are dropped.
    fn map(&self, cells: &[String]) -> RowMap {
        let mut values = vec![None; self.keys.len()];
        for (column, &slot) in self.slots.iter().enumerate() {
            values[slot] = cells.get(column).cloned();
        }
        RowMap {
            keys: Arc::clone(&self.keys),
            values,
        }
    }
}

/// Calls `handler(sheet_name, record)` for every row.
///
/// With a header row, the first row of each sheet is taken as column names
/// and produces no call; every later row of that sheet arrives as
/// [`Record::Mapped`]. Without one, rows arrive as [`Record::Values`].
///
/// # Examples
///
/// ```
/// use ods_extract::odf::ods::{OutputSink, Record, RowOutput};
///
/// let mut seen = Vec::new();
/// let mut out = RowOutput::with_header_row(|sheet: &str, record: Record| {
///     if let Record::Mapped(row) = record {
///         seen.push((sheet.to_string(), row.into_pairs()));
///     }
///     Ok(())
/// });
///
/// out.start_sheet("People")?;
/// out.write_row(&["A".to_string(), "B".to_string()])?;
/// out.write_row(&["x".to_string()])?;
/// out.end_sheet()?;
/// drop(out);
///
/// assert_eq!(
///     seen,
///     [("People".to_string(), vec![("A".to_string(), Some("x".to_string())), ("B".to_string(), None)])]
/// );
/// # Ok::<(), ods_extract::common::Error>(())
/// ```
pub struct RowOutput<F> {
    use_header_row: bool,
    handler: F,
    sheet_name: String,
    header: Option<Header>,
}

impl<F> RowOutput<F>
where
    F: FnMut(&str, Record) -> Result<()>,
{
    pub fn new(use_header_row: bool, handler: F) -> Self {
        Self {
            use_header_row,
            handler,
            sheet_name: String::new(),
            header: None,
        }
    }

    /// Promote the first row of each sheet to a header.
    pub fn with_header_row(handler: F) -> Self {
        Self::new(true, handler)
    }

    /// Deliver every row as plain values.
    pub fn values(handler: F) -> Self {
        Self::new(false, handler)
    }

    pub fn into_handler(self) -> F {
        self.handler
    }
}

impl<F> OutputSink for RowOutput<F>
where
    F: FnMut(&str, Record) -> Result<()>,
{
    fn start_sheet(&mut self, name: &str) -> Result<()> {
        self.sheet_name.clear();
        self.sheet_name.push_str(name);
        self.header = None;
        Ok(())
    }

    fn write_row(&mut self, cells: &[String]) -> Result<()> {
        if !self.use_header_row {
            return (self.handler)(&self.sheet_name, Record::Values(cells.to_vec()));
        }
        match &self.header {
            Some(header) => {
                let record = Record::Mapped(header.map(cells));
                (self.handler)(&self.sheet_name, record)
            },
            None => {
                self.header = Some(Header::new(cells));
                Ok(())
            },
        }
    }

    fn end_sheet(&mut self) -> Result<()> {
        Ok(())
    }
}
