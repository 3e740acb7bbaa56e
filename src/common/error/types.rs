//! Error types for ODS extraction.
//!
//! Every failure is fatal to the extraction call that raised it: there is no
//! partial-success mode, and nothing in the pipeline retries.
use thiserror::Error;

/// Main error type for extraction operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error while reading the container or writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The container could not be read as a ZIP archive
    #[error("ZIP error: {0}")]
    Zip(String),

    /// The archive has no `content.xml` entry
    #[error("No `content.xml` found in the ODS file")]
    ContentEntryMissing,

    /// The XML tokenizer reported a well-formedness violation
    #[error("XML parse error: {0}")]
    MalformedMarkup(String),

    /// An element that mandates an attribute was found without it
    #[error("Element <{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// A sheet filter specification that cannot be turned into a predicate
    #[error("Invalid sheet filter: {0}")]
    InvalidPredicateSpec(String),

    /// Extraction options out of their allowed range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The output sink failed to accept a sheet or row
    #[error("Output sink error: {0}")]
    Sink(String),

    /// The progress handler asked for the extraction to stop
    #[error("Extraction cancelled after {bytes_read} bytes")]
    Cancelled { bytes_read: u64 },
}

impl Error {
    /// Shorthand for [`Error::MissingAttribute`].
    pub(crate) fn missing_attribute(element: &str, attribute: &'static str) -> Self {
        Error::MissingAttribute {
            element: element.to_string(),
            attribute,
        }
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
