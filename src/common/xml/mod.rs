//! Incremental XML tokenization.
//!
//! [`XmlPushParser`] accepts the decompressed XML in arbitrary chunks and
//! drives a [`MarkupHandler`] synchronously from inside each `feed` call.

pub mod handler;
pub mod push;

pub use handler::{Attributes, MarkupEvent, MarkupHandler};
pub use push::{MAX_PENDING_BYTES, PushParser, XmlPushParser};
