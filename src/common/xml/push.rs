//! Push-style XML parsing on top of quick-xml.
//!
//! quick-xml pulls from a reader it owns. A decompression stream produces bytes
//! on its own schedule, so [`XmlPushParser`] inverts that: callers
//! [`feed`](PushParser::feed) arbitrary chunks, and every complete token in the
//! buffered input is tokenized and dispatched to the bound [`MarkupHandler`]
//! before `feed` returns. Whatever cannot be tokenized yet (a tag cut in half, a
//! multi-byte character split at the chunk edge) stays in a tail buffer until
//! the next chunk arrives.
//!
//! Text nodes are delivered as soon as they are known to be complete up to the
//! chunk edge, so one text node may reach the handler as several `text` calls.
//!
//! # Well-formedness
//!
//! End tags are checked against the open element stack, a second root element
//! and non-whitespace text outside the root are rejected, and
//! [`finish`](PushParser::finish) reports elements left open at end of input.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::errors::{IllFormedError, SyntaxError};
use quick_xml::events::{BytesStart, Event};

use super::handler::{Attributes, MarkupEvent, MarkupHandler};
use crate::common::{Error, Result};

/// Upper bound on the unparsed tail kept between two `feed` calls.
///
/// The tail only ever holds one incomplete token, so exceeding this means the
/// input is not XML the parser can make progress on.
pub const MAX_PENDING_BYTES: usize = 8 * 1024 * 1024;

/// A markup tokenizer fed with explicit byte chunks.
pub trait PushParser {
    /// Tokenize `chunk`, emitting every event it completes.
    fn feed(&mut self, chunk: &[u8]) -> Result<()>;

    /// Flush buffered input and surface errors deferred until end of input.
    ///
    /// Must be called on every exit path. Calling it again is a no-op.
    fn finish(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Active,
    Failed,
    Finished,
}

/// Open element names, stored back to back in one buffer.
#[derive(Debug, Default)]
struct ElementStack {
    names: String,
    ends: Vec<usize>,
}

impl ElementStack {
    fn push(&mut self, name: &str) {
        self.names.push_str(name);
        self.ends.push(self.names.len());
    }

    fn last(&self) -> Option<&str> {
        let end = *self.ends.last()?;
        let start = self.ends.len().checked_sub(2).map_or(0, |i| self.ends[i]);
        Some(&self.names[start..end])
    }

    /// Pop the innermost element if it is `name`.
    fn close(&mut self, name: &str) -> std::result::Result<(), String> {
        match self.last() {
            Some(open) if open == name => {
                self.ends.pop();
                let start = self.ends.last().copied().unwrap_or(0);
                self.names.truncate(start);
                Ok(())
            },
            Some(open) => Err(format!("expected </{}>, found </{}>", open, name)),
            None => Err(format!("unexpected end tag </{}>", name)),
        }
    }

    fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    fn clear(&mut self) {
        self.names.clear();
        self.ends.clear();
    }
}

/// Incremental XML tokenizer bound to a [`MarkupHandler`].
///
/// # Examples
///
/// ```
/// use ods_extract::common::xml::{Attributes, MarkupHandler, PushParser, XmlPushParser};
/// use ods_extract::common::Result;
///
/// #[derive(Default)]
/// struct Names(Vec<String>);
///
/// impl MarkupHandler for Names {
///     fn element_start(&mut self, name: &str, _: &Attributes<'_>) -> Result<()> {
///         self.0.push(name.to_string());
///         Ok(())
///     }
///     fn text(&mut self, _: &str) -> Result<()> { Ok(()) }
///     fn element_end(&mut self, _: &str) -> Result<()> { Ok(()) }
/// }
///
/// let mut parser = XmlPushParser::new(Names::default());
/// parser.feed(b"<root><chi")?;
/// parser.feed(b"ld/></root>")?;
/// parser.finish()?;
/// assert_eq!(parser.into_handler().0, ["root", "child"]);
/// # Ok::<(), ods_extract::common::Error>(())
/// ```
pub struct XmlPushParser<H> {
    handler: H,
    pending: Vec<u8>,
    open: ElementStack,
    seen_root: bool,
    state: ParserState,
}

impl<H: MarkupHandler> XmlPushParser<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            pending: Vec::new(),
            open: ElementStack::default(),
            seen_root: false,
            state: ParserState::Active,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Bytes received but not yet tokenized.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn release(&mut self) {
        self.pending = Vec::new();
        self.open.clear();
    }

    /// Tokenize as much of the pending buffer as possible.
    ///
    /// Returns how many leading bytes of the buffer were consumed. Unless
    /// `at_eof` is set, a token that runs into the end of the buffer is left
    /// for the next call.
    fn drain(&mut self, at_eof: bool) -> Result<usize> {
        let Self {
            handler,
            pending,
            open,
            seen_root,
            ..
        } = self;

        let mut reader = Reader::from_reader(pending.as_slice());
        {
            let config = reader.config_mut();
            config.expand_empty_elements = true;
            // Each feed starts a fresh reader, so end tags of elements opened
            // in earlier chunks are matched by `open` instead.
            config.check_end_names = false;
            config.allow_unmatched_ends = true;
        }

        let mut consumed = 0usize;
        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let tail = &pending[reader.error_position() as usize..];
                    if !at_eof && runs_into_end(&err, tail) {
                        return Ok(consumed);
                    }
                    return Err(fail(handler, err.to_string()));
                },
            };
            let position = reader.buffer_position() as usize;

            match event {
                Event::Start(start) => {
                    let name = match std::str::from_utf8(start.name().into_inner()) {
                        Ok(name) => name,
                        Err(err) => {
                            return Err(fail(handler, format!("invalid UTF-8 in tag name: {}", err)));
                        },
                    };
                    if open.is_empty() && *seen_root {
                        return Err(fail(
                            handler,
                            format!("extra content after the document element: <{}>", name),
                        ));
                    }
                    let attributes = match collect_attributes(&start) {
                        Ok(attributes) => attributes,
                        Err(message) => return Err(fail(handler, message)),
                    };
                    *seen_root = true;
                    open.push(name);
                    handler.handle(MarkupEvent::ElementStart { name, attributes })?;
                },
                Event::End(end) => {
                    let name = match std::str::from_utf8(end.name().into_inner()) {
                        Ok(name) => name,
                        Err(err) => {
                            return Err(fail(handler, format!("invalid UTF-8 in tag name: {}", err)));
                        },
                    };
                    if let Err(message) = open.close(name) {
                        return Err(fail(handler, message));
                    }
                    handler.handle(MarkupEvent::ElementEnd { name })?;
                },
                Event::Text(text) => {
                    let raw: &[u8] = &text;
                    let start = position - raw.len();
                    if !at_eof && position == pending.len() {
                        // The text may continue in the next chunk; deliver only
                        // what cannot change.
                        let cut = complete_text_prefix(raw);
                        if cut > 0 {
                            emit_text(handler, open, &raw[..cut])?;
                        }
                        return Ok(start + cut);
                    }
                    emit_text(handler, open, raw)?;
                },
                Event::CData(data) => {
                    let raw: &[u8] = &data;
                    let text = match std::str::from_utf8(raw) {
                        Ok(text) => text,
                        Err(err) => {
                            return Err(fail(handler, format!("invalid UTF-8 in CDATA: {}", err)));
                        },
                    };
                    handler.handle(MarkupEvent::Text(Cow::Borrowed(text)))?;
                },
                Event::GeneralRef(reference) => {
                    let raw: &[u8] = &reference;
                    let resolved = std::str::from_utf8(raw)
                        .map_err(|err| err.to_string())
                        .and_then(|name| {
                            quick_xml::escape::unescape(&format!("&{};", name))
                                .map(Cow::into_owned)
                                .map_err(|err| err.to_string())
                        });
                    match resolved {
                        Ok(text) => {
                            if open.is_empty() {
                                return Err(fail(
                                    handler,
                                    "entity reference outside the document element".to_string(),
                                ));
                            }
                            handler.handle(MarkupEvent::Text(Cow::Owned(text)))?;
                        },
                        Err(message) => return Err(fail(handler, message)),
                    }
                },
                Event::Eof => return Ok(consumed),
                // Declarations, processing instructions, comments, DOCTYPE
                _ => {},
            }
            consumed = position;
        }
    }

    fn check_complete(&mut self) -> Result<()> {
        if let Some(name) = self.open.last() {
            let message = format!("unclosed element <{}> at end of document", name);
            return Err(fail(&mut self.handler, message));
        }
        if !self.seen_root {
            return Err(fail(
                &mut self.handler,
                "document has no root element".to_string(),
            ));
        }
        Ok(())
    }
}

impl<H: MarkupHandler> PushParser for XmlPushParser<H> {
    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        if self.state != ParserState::Active {
            return Err(Error::MalformedMarkup(
                "input fed to a parser that has already stopped".to_string(),
            ));
        }
        self.pending.extend_from_slice(chunk);

        let outcome = self.drain(false).and_then(|consumed| {
            self.pending.drain(..consumed);
            if self.pending.len() > MAX_PENDING_BYTES {
                let message = format!(
                    "markup token exceeds {} bytes without completing",
                    MAX_PENDING_BYTES
                );
                return Err(fail(&mut self.handler, message));
            }
            Ok(())
        });
        if outcome.is_err() {
            self.state = ParserState::Failed;
            self.release();
        }
        outcome
    }

    fn finish(&mut self) -> Result<()> {
        let outcome = match self.state {
            ParserState::Finished | ParserState::Failed => Ok(()),
            ParserState::Active => self.drain(true).and_then(|_| self.check_complete()),
        };
        self.state = ParserState::Finished;
        self.release();
        outcome
    }
}

/// Report a tokenizer error to the handler and build the error to return.
fn fail<H: MarkupHandler>(handler: &mut H, message: String) -> Error {
    match handler.handle(MarkupEvent::Error(message.clone())) {
        Err(err) => err,
        Ok(()) => Error::MalformedMarkup(message),
    }
}

fn emit_text<H: MarkupHandler>(handler: &mut H, open: &ElementStack, raw: &[u8]) -> Result<()> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => return Err(fail(handler, format!("invalid UTF-8 in text: {}", err))),
    };
    let text = match quick_xml::escape::unescape(text) {
        Ok(text) => text,
        Err(err) => return Err(fail(handler, err.to_string())),
    };
    if open.is_empty() {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(fail(
            handler,
            "text outside the document element".to_string(),
        ));
    }
    handler.handle(MarkupEvent::Text(text))
}

/// Whether `err` only means the token starting at `tail` is cut off by the
/// end of the buffer, so more input may still complete it.
fn runs_into_end(err: &quick_xml::Error, tail: &[u8]) -> bool {
    match err {
        quick_xml::Error::Syntax(SyntaxError::InvalidBangMarkup) => tail == b"<!",
        // Raised only once the slice ends inside the construct
        quick_xml::Error::Syntax(_) => true,
        quick_xml::Error::IllFormed(IllFormedError::UnclosedReference) => {
            tail.len() < 2 || memchr::memchr3(b';', b'&', b'<', &tail[1..]).is_none()
        },
        _ => false,
    }
}

/// Length of the prefix of an unfinished text run that can be delivered now,
/// so that it never ends inside a multi-byte character.
fn complete_text_prefix(raw: &[u8]) -> usize {
    match std::str::from_utf8(raw) {
        Ok(_) => raw.len(),
        Err(err) if err.error_len().is_none() => err.valid_up_to(),
        // Genuinely invalid bytes are reported once the text is emitted.
        Err(_) => raw.len(),
    }
}

fn collect_attributes(start: &BytesStart<'_>) -> std::result::Result<Attributes<'static>, String> {
    let mut attributes = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| format!("invalid UTF-8 in attribute name: {}", err))?
            .to_string();
        let raw = std::str::from_utf8(&attr.value)
            .map_err(|err| format!("invalid UTF-8 in attribute `{}`: {}", key, err))?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|err| format!("attribute `{}`: {}", key, err))?
            .into_owned();
        attributes.push(key, value);
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Records events as strings, merging adjacent text.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        errors: Vec<String>,
    }

    impl Recorder {
        fn push_text(&mut self, text: &str) {
            match self.events.last_mut() {
                Some(last) if last.starts_with("text:") => last.push_str(text),
                _ => self.events.push(format!("text:{}", text)),
            }
        }
    }

    impl MarkupHandler for Recorder {
        fn element_start(&mut self, name: &str, attributes: &Attributes<'_>) -> Result<()> {
            let attrs: Vec<String> = attributes
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            self.events.push(format!("start:{}[{}]", name, attrs.join(",")));
            Ok(())
        }

        fn text(&mut self, text: &str) -> Result<()> {
            self.push_text(text);
            Ok(())
        }

        fn element_end(&mut self, name: &str) -> Result<()> {
            self.events.push(format!("end:{}", name));
            Ok(())
        }

        fn error(&mut self, message: &str) -> Result<()> {
            self.errors.push(message.to_string());
            Err(Error::MalformedMarkup(message.to_string()))
        }
    }

    const DOCUMENT: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
        <office:document-content xmlns:office=\"urn:office\" xmlns:table=\"urn:table\">\
        <!-- comment -->\
        <table:table table:name=\"Первый &amp; лист\">\
        <table:table-row><table:table-cell table:number-columns-repeated=\"2\">\
        <text:p>Ёж &lt;3&gt; &#x41;</text:p></table:table-cell>\
        <table:table-cell/><table:table-cell><![CDATA[a<b]]></table:table-cell>\
        </table:table-row></table:table></office:document-content>";

    fn parse_in_chunks(input: &[u8], sizes: &[usize]) -> Result<Vec<String>> {
        let mut parser = XmlPushParser::new(Recorder::default());
        let mut rest = input;
        let mut sizes = sizes.iter().cycle();
        while !rest.is_empty() {
            let size = (*sizes.next().unwrap_or(&1)).clamp(1, rest.len());
            let (chunk, tail) = rest.split_at(size);
            parser.feed(chunk)?;
            rest = tail;
        }
        parser.finish()?;
        Ok(parser.into_handler().events)
    }

    fn expected_events() -> Vec<String> {
        [
            "start:office:document-content[xmlns:office=urn:office,xmlns:table=urn:table]",
            "start:table:table[table:name=Первый & лист]",
            "start:table:table-row[]",
            "start:table:table-cell[table:number-columns-repeated=2]",
            "start:text:p[]",
            "text:Ёж <3> A",
            "end:text:p",
            "end:table:table-cell",
            "start:table:table-cell[]",
            "end:table:table-cell",
            "start:table:table-cell[]",
            "text:a<b",
            "end:table:table-cell",
            "end:table:table-row",
            "end:table:table",
            "end:office:document-content",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_single_chunk() {
        let events = parse_in_chunks(DOCUMENT.as_bytes(), &[usize::MAX]).unwrap();
        assert_eq!(events, expected_events());
    }

    #[test]
    fn test_byte_by_byte() {
        let events = parse_in_chunks(DOCUMENT.as_bytes(), &[1]).unwrap();
        assert_eq!(events, expected_events());
    }

    #[test]
    fn test_tail_is_bounded_by_one_token() {
        let mut parser = XmlPushParser::new(Recorder::default());
        parser.feed(b"<root><cell>some text</cell><cel").unwrap();
        assert_eq!(parser.pending_len(), 4);
        parser.feed(b"l>x</cell></root>").unwrap();
        parser.finish().unwrap();
        assert_eq!(parser.pending_len(), 0);
    }

    #[test]
    fn test_split_multibyte_character_is_held_back() {
        let text = "<r>Ж</r>".as_bytes();
        // Split inside the two-byte character
        let events = parse_in_chunks(text, &[4, 1, 100]).unwrap();
        assert_eq!(events, ["start:r[]", "text:Ж", "end:r"]);
    }

    #[test]
    fn test_end_tags_in_later_chunks() {
        let mut parser = XmlPushParser::new(Recorder::default());
        parser.feed(b"<a><b>").unwrap();
        parser.feed(b"</b>").unwrap();
        parser.feed(b"</a>").unwrap();
        parser.finish().unwrap();
        assert_eq!(
            parser.into_handler().events,
            ["start:a[]", "start:b[]", "end:b", "end:a"]
        );
    }

    #[test]
    fn test_unknown_bang_markup_fails_immediately() {
        let mut parser = XmlPushParser::new(Recorder::default());
        let err = parser.feed(b"<a><!x><b/>").unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(_)));
        assert_eq!(parser.handler().errors.len(), 1);
        assert_eq!(parser.handler().events, ["start:a[]"]);
        assert!(parser.feed(b"</a>").is_err());
    }

    #[test]
    fn test_bang_at_chunk_edge_is_held_back() {
        let events = parse_in_chunks(b"<a><!-- note --><![CDATA[x]]></a>", &[5, 12, 100]).unwrap();
        assert_eq!(events, ["start:a[]", "text:x", "end:a"]);
    }

    #[test]
    fn test_reference_split_across_chunks() {
        // Cuts right after `&` and inside the entity name
        for first in [6, 7, 8] {
            let events = parse_in_chunks(b"<a>x &amp; y</a>", &[first, 100]).unwrap();
            assert_eq!(events, ["start:a[]", "text:x & y", "end:a"], "cut at {}", first);
        }
    }

    #[test]
    fn test_unterminated_reference_fails_immediately() {
        let mut parser = XmlPushParser::new(Recorder::default());
        let err = parser.feed(b"<a>x &amp y</a>").unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(_)));
        assert_eq!(parser.handler().errors.len(), 1);
    }

    #[test]
    fn test_mismatched_end_tag() {
        let mut parser = XmlPushParser::new(Recorder::default());
        let err = parser.feed(b"<a><b></a>").unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(ref m) if m.contains("expected </b>")));
        assert_eq!(parser.handler().errors.len(), 1);
        // Parser stays stopped; finish is still safe to call.
        assert!(parser.feed(b"<c/>").is_err());
        parser.finish().unwrap();
    }

    #[test]
    fn test_unclosed_element_reported_by_finish() {
        let mut parser = XmlPushParser::new(Recorder::default());
        parser.feed(b"<a><b>text</b>").unwrap();
        let err = parser.finish().unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(ref m) if m.contains("unclosed element <a>")));
        // Second finish is a no-op
        parser.finish().unwrap();
    }

    #[test]
    fn test_truncated_tag_reported_by_finish() {
        let mut parser = XmlPushParser::new(Recorder::default());
        parser.feed(b"<a><b attr=\"x").unwrap();
        assert!(matches!(parser.finish(), Err(Error::MalformedMarkup(_))));
    }

    #[test]
    fn test_empty_document() {
        let mut parser = XmlPushParser::new(Recorder::default());
        let err = parser.finish().unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(ref m) if m.contains("no root element")));
    }

    #[test]
    fn test_second_root_rejected() {
        let mut parser = XmlPushParser::new(Recorder::default());
        let err = parser.feed(b"<a/><b/>").unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(ref m) if m.contains("extra content")));
    }

    #[test]
    fn test_handler_error_propagates_unchanged() {
        struct Refuse;
        impl MarkupHandler for Refuse {
            fn element_start(&mut self, _: &str, _: &Attributes<'_>) -> Result<()> {
                Err(Error::Sink("disk full".to_string()))
            }
            fn text(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
            fn element_end(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
        }

        let mut parser = XmlPushParser::new(Refuse);
        let err = parser.feed(b"<a>").unwrap_err();
        assert!(matches!(err, Error::Sink(ref m) if m == "disk full"));
    }

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_events(sizes in prop::collection::vec(1usize..64, 1..16)) {
            let events = parse_in_chunks(DOCUMENT.as_bytes(), &sizes).unwrap();
            prop_assert_eq!(events, expected_events());
        }
    }
}
