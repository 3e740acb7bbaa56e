//! ODF package (ZIP archive) access for streaming extraction.
//!
//! The extraction pipeline never needs a whole archive member in memory: it
//! asks an [`ArchiveReader`] for the entry list, opens one entry, and pulls
//! decompressed bytes from it in bounded chunks through a [`ChunkReader`].

use crate::common::Result;
use std::io::{ErrorKind, Read, Seek};

/// A member of an archive, as listed by [`ArchiveReader::list_entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    name: String,
    uncompressed_size: u64,
    index: usize,
}

impl ArchiveEntry {
    /// Describe an entry; `index` is the reader-specific handle used to open it.
    pub fn new(name: impl Into<String>, uncompressed_size: u64, index: usize) -> Self {
        Self {
            name: name.into(),
            uncompressed_size,
            index,
        }
    }

    /// Path of the entry inside the archive
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the entry once decompressed, as declared by the archive
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Pull-based access to the decompressed bytes of one entry.
pub trait ChunkReader {
    /// Decompress up to `max_bytes` more bytes.
    ///
    /// Returns an empty slice once the entry is exhausted. Chunks are only
    /// shorter than `max_bytes` at the end of the entry.
    fn next_chunk(&mut self, max_bytes: usize) -> Result<&[u8]>;
}

/// Archive that can enumerate its members and stream one of them.
pub trait ArchiveReader {
    type Chunks<'a>: ChunkReader
    where
        Self: 'a;

    /// List the file entries of the archive, without decompressing them.
    fn list_entries(&mut self) -> Result<Vec<ArchiveEntry>>;

    /// Start decompressing `entry`.
    fn open_entry(&mut self, entry: &ArchiveEntry) -> Result<Self::Chunks<'_>>;

    /// Find the entry whose name is exactly `name`.
    fn find_entry(&mut self, name: &str) -> Result<Option<ArchiveEntry>> {
        Ok(self
            .list_entries()?
            .into_iter()
            .find(|entry| entry.name() == name))
    }
}

/// [`ChunkReader`] over any decompressing reader.
pub struct EntryChunks<'a> {
    inner: Box<dyn Read + 'a>,
    buf: Vec<u8>,
}

impl<'a> EntryChunks<'a> {
    pub fn new(inner: impl Read + 'a) -> Self {
        Self {
            inner: Box::new(inner),
            buf: Vec::new(),
        }
    }
}

impl ChunkReader for EntryChunks<'_> {
    fn next_chunk(&mut self, max_bytes: usize) -> Result<&[u8]> {
        self.buf.resize(max_bytes, 0);
        let mut filled = 0;
        while filled < max_bytes {
            match self.inner.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(&self.buf[..filled])
    }
}

/// An ODF package (ZIP file containing XML documents)
pub struct ZipPackage<R> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipPackage<R> {
    /// Open an ODF package from a reader positioned at the start of the ZIP data
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Wrap an already-parsed ZIP archive.
    pub fn from_zip_archive(archive: zip::ZipArchive<R>) -> Self {
        Self { archive }
    }

    /// Number of members, directories included
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    pub fn into_inner(self) -> R {
        self.archive.into_inner()
    }
}

impl<R: Read + Seek> ArchiveReader for ZipPackage<R> {
    type Chunks<'a>
        = EntryChunks<'a>
    where
        Self: 'a;

    fn list_entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let file = self.archive.by_index_raw(index)?;
            if file.is_dir() {
                continue;
            }
            entries.push(ArchiveEntry::new(file.name(), file.size(), index));
        }
        Ok(entries)
    }

    fn open_entry(&mut self, entry: &ArchiveEntry) -> Result<Self::Chunks<'_>> {
        let file = self.archive.by_index(entry.index())?;
        Ok(EntryChunks::new(file))
    }
}
