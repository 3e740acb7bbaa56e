//! Core ODF container access.
//!
//! Handles the ZIP package an OpenDocument file is stored in, exposing its
//! members as bounded streams of decompressed bytes.

mod package;

pub use package::{ArchiveEntry, ArchiveReader, ChunkReader, EntryChunks, ZipPackage};
