//! The extraction pipeline: archive entry -> chunks -> parser -> filter ->
//! decoder -> sink.

use std::fmt;
use std::io::{Read, Seek};
use std::ops::ControlFlow;

use crate::common::xml::{PushParser, XmlPushParser};
use crate::common::{Error, Result};
use crate::odf::constants::ODF_CONTENT;
use crate::odf::core::{ArchiveReader, ChunkReader, ZipPackage};
use crate::odf::ods::decoder::RowDecoder;
use crate::odf::ods::filter::SheetFilter;
use crate::odf::ods::options::{ExtractOptions, validate_chunk_size};
use crate::odf::ods::output::OutputSink;
use crate::odf::ods::predicate::SheetPredicate;

/// How far the decompression of `content.xml` has come.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Decompressed bytes handed to the parser so far
    pub bytes_read: u64,
    /// Declared size of the entry minus `bytes_read`
    pub bytes_remaining: u64,
}

impl Progress {
    pub fn total(&self) -> u64 {
        self.bytes_read + self.bytes_remaining
    }
}

/// Progress callback. Returning [`ControlFlow::Break`] cancels the extraction.
pub type ProgressFn<'a> = Box<dyn FnMut(Progress) -> ControlFlow<()> + 'a>;

/// Configurable extraction run.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use std::ops::ControlFlow;
/// use ods_extract::odf::ods::{CsvOutput, Extractor, SheetPredicate};
///
/// let mut out = CsvOutput::new("out");
/// Extractor::new()
///     .sheets(SheetPredicate::pattern("^Data")?)
///     .on_progress(|p| {
///         eprintln!("{}/{}", p.bytes_read, p.total());
///         ControlFlow::Continue(())
///     })
///     .extract(File::open("book.ods")?, &mut out)?;
/// # Ok::<(), ods_extract::common::Error>(())
/// ```
#[derive(Default)]
pub struct Extractor<'a> {
    options: ExtractOptions,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> Extractor<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only extract sheets accepted by `predicate`.
    pub fn sheets(mut self, predicate: impl Into<SheetPredicate>) -> Self {
        self.options.sheets = predicate.into();
        self
    }

    /// Feed the parser `chunk_size` decompressed bytes at a time.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.options.chunk_size = chunk_size;
        self
    }

    /// Replace chunk size and sheet selection at once.
    pub fn options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Call `f` before the first chunk and after every chunk.
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: FnMut(Progress) -> ControlFlow<()> + 'a,
    {
        self.progress = Some(Box::new(f));
        self
    }

    /// Extract the sheets of the ODS file read from `input` into `sink`.
    pub fn extract<R, S>(self, input: R, sink: S) -> Result<()>
    where
        R: Read + Seek,
        S: OutputSink,
    {
        validate_chunk_size(self.options.chunk_size)?;
        let mut package = ZipPackage::from_reader(input)?;
        self.extract_archive(&mut package, sink)
    }

    /// Extract from an already opened archive.
    pub fn extract_archive<A, S>(self, archive: &mut A, sink: S) -> Result<()>
    where
        A: ArchiveReader,
        S: OutputSink,
    {
        let Extractor { options, progress } = self;
        validate_chunk_size(options.chunk_size)?;

        let entry = archive
            .find_entry(ODF_CONTENT)?
            .ok_or(Error::ContentEntryMissing)?;
        let total = entry.uncompressed_size();
        tracing::debug!(
            entry = entry.name(),
            size = total,
            chunk_size = options.chunk_size,
            sheets = ?options.sheets,
            "extracting"
        );
        let mut chunks = archive.open_entry(&entry)?;

        let filter = SheetFilter::new(RowDecoder::new(sink), options.sheets);
        let mut parser = XmlPushParser::new(filter);
        let mut pump = Pump {
            progress,
            chunk_size: options.chunk_size,
            total,
            bytes_read: 0,
        };

        let outcome = pump.run(&mut chunks, &mut parser);
        let finished = parser.finish();
        if let Err(err) = &outcome {
            tracing::debug!(error = %err, bytes_read = pump.bytes_read, "extraction stopped");
        }
        outcome.and(finished)
    }
}

impl fmt::Debug for Extractor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("options", &self.options)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Moves chunks from the entry into the parser and keeps progress.
struct Pump<'a> {
    progress: Option<ProgressFn<'a>>,
    chunk_size: usize,
    total: u64,
    bytes_read: u64,
}

impl Pump<'_> {
    fn run<C, P>(&mut self, chunks: &mut C, parser: &mut P) -> Result<()>
    where
        C: ChunkReader,
        P: PushParser,
    {
        let mut remaining = self.report()?;
        loop {
            let chunk = chunks.next_chunk(self.chunk_size)?;
            if chunk.is_empty() {
                break;
            }
            self.bytes_read += chunk.len() as u64;
            tracing::trace!(len = chunk.len(), bytes_read = self.bytes_read, "chunk");
            parser.feed(chunk)?;
            remaining = self.report()?;
        }
        if remaining != 0 {
            // The archive declared more bytes than the entry held
            self.total = self.bytes_read;
            self.report()?;
        }
        Ok(())
    }

    /// Tell the callback where we are; returns the remaining byte count.
    fn report(&mut self) -> Result<u64> {
        let progress = Progress {
            bytes_read: self.bytes_read,
            bytes_remaining: self.total.saturating_sub(self.bytes_read),
        };
        if let Some(callback) = self.progress.as_mut() {
            if callback(progress).is_break() {
                return Err(Error::Cancelled {
                    bytes_read: self.bytes_read,
                });
            }
        }
        Ok(progress.bytes_remaining)
    }
}

/// Extract every sheet of the ODS file read from `input` into `sink`, with
/// default options.
pub fn extract<R, S>(input: R, sink: S) -> Result<()>
where
    R: Read + Seek,
    S: OutputSink,
{
    Extractor::new().extract(input, sink)
}
