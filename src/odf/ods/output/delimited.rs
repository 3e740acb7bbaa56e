//! One delimited text file per sheet.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::OutputSink;
use crate::common::{Error, Result};

/// Writes each extracted sheet to `<directory>/<sheet name>.csv`.
///
/// Every field is quoted. Rows keep their own width, so a sheet with ragged
/// rows produces a ragged file. Sheet names are sanitized before they become
/// file names (see [`sanitize_file_stem`]), and a name that was already used
/// in this output gets a ` (2)`, ` (3)`, ... suffix instead of overwriting the
/// earlier file.
pub struct CsvOutput {
    directory: PathBuf,
    delimiter: u8,
    writer: Option<csv::Writer<File>>,
    used_stems: HashSet<String>,
    written: Vec<PathBuf>,
}

impl CsvOutput {
    /// Write files into `directory`, which must already exist.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            delimiter: b',',
            writer: None,
            used_stems: HashSet::new(),
            written: Vec::new(),
        }
    }

    /// Use `delimiter` between fields instead of a comma.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Paths of the files opened so far, in sheet order.
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }

    /// Pick the file name for the next sheet called `sheet_name`.
    fn file_name_for(&mut self, sheet_name: &str) -> String {
        let stem = sanitize_file_stem(sheet_name);
        let mut candidate = stem.clone();
        let mut copy = 1;
        // Case-insensitive filesystems would merge "Data" and "data"
        while !self.used_stems.insert(candidate.to_lowercase()) {
            copy += 1;
            candidate = format!("{} ({})", stem, copy);
        }
        format!("{}.csv", candidate)
    }

    fn close_current(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| Error::Sink(e.to_string()))?;
        }
        Ok(())
    }
}

impl OutputSink for CsvOutput {
    fn start_sheet(&mut self, name: &str) -> Result<()> {
        self.close_current()?;

        let file_name = self.file_name_for(name);
        let path = self.directory.join(file_name);
        let writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(true)
            .from_path(&path)?;
        tracing::debug!(sheet = name, path = %path.display(), "writing sheet");

        self.writer = Some(writer);
        self.written.push(path);
        Ok(())
    }

    fn write_row(&mut self, cells: &[String]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Sink("row written outside of a sheet".to_string()))?;
        writer.write_record(cells)?;
        Ok(())
    }

    fn end_sheet(&mut self) -> Result<()> {
        self.close_current()
    }
}

/// Turn a sheet name into a file name stem that stays inside the output
/// directory.
///
/// Path separators, control characters and characters reserved on common
/// filesystems become `_`, and so do trailing dots and spaces, which Windows
/// strips silently. That also means `..` can never address a parent
/// directory. An empty name becomes `_`, and DOS device names such as `CON`
/// or `com1.backup` get a leading `_`.
///
/// # Examples
///
/// ```
/// use ods_extract::odf::ods::sanitize_file_stem;
///
/// assert_eq!(sanitize_file_stem("Первый лист"), "Первый лист");
/// assert_eq!(sanitize_file_stem("../../etc/passwd"), ".._.._etc_passwd");
/// assert_eq!(sanitize_file_stem(".."), "__");
/// assert_eq!(sanitize_file_stem("Totals. "), "Totals__");
/// assert_eq!(sanitize_file_stem("nul.txt"), "_nul.txt");
/// assert_eq!(sanitize_file_stem(""), "_");
/// ```
pub fn sanitize_file_stem(name: &str) -> String {
    let mut stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let kept = stem.trim_end_matches(['.', ' ']).len();
    let trailing = stem.len() - kept;
    stem.truncate(kept);
    stem.push_str(&"_".repeat(trailing));

    if stem.is_empty() || is_device_name(&stem) {
        stem.insert(0, '_');
    }
    stem
}

/// Whether Windows maps `stem` to a device, with or without an extension.
fn is_device_name(stem: &str) -> bool {
    let base = stem.split('.').next().unwrap_or(stem).trim_end_matches(' ');
    let upper = base.to_ascii_uppercase();
    match upper.as_bytes() {
        b"CON" | b"PRN" | b"AUX" | b"NUL" => true,
        [b'C', b'O', b'M', b'1'..=b'9'] | [b'L', b'P', b'T', b'1'..=b'9'] => true,
        _ => false,
    }
}
