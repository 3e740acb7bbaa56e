//! Markup events and the handler interface driven by a push parser.
//!
//! A push parser turns fed byte chunks into [`MarkupEvent`]s and hands each one
//! to a [`MarkupHandler`] before reading the next. Handlers can be stacked: a
//! handler may own another handler and decide per event whether to forward it.

use std::borrow::Cow;

use crate::common::{Error, Result};

/// Attributes of a single start tag, in document order.
///
/// Names are qualified names as written (`table:name`); values are unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes<'a> {
    items: Vec<(Cow<'a, str>, Cow<'a, str>)>,
}

impl<'a> Attributes<'a> {
    /// Create an empty attribute list.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an attribute.
    pub fn push(&mut self, name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) {
        self.items.push((name.into(), value.into()));
    }

    /// Look up an attribute value by qualified name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_ref())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, K, V> FromIterator<(K, V)> for Attributes<'a>
where
    K: Into<Cow<'a, str>>,
    V: Into<Cow<'a, str>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A single structural event, borrowed from the parser's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent<'a> {
    /// Opening tag (empty elements produce a start immediately followed by an end)
    ElementStart {
        name: &'a str,
        attributes: Attributes<'a>,
    },
    /// Character data; a text node may be split across several events
    Text(Cow<'a, str>),
    /// Closing tag
    ElementEnd { name: &'a str },
    /// Well-formedness violation reported by the tokenizer
    Error(String),
}

/// Receiver of markup events.
///
/// Returning an error from any method aborts parsing; the parser surfaces that
/// error unchanged.
pub trait MarkupHandler {
    fn element_start(&mut self, name: &str, attributes: &Attributes<'_>) -> Result<()>;

    fn text(&mut self, text: &str) -> Result<()>;

    fn element_end(&mut self, name: &str) -> Result<()>;

    /// Called once when the tokenizer finds malformed input.
    ///
    /// The default turns the message into [`Error::MalformedMarkup`].
    fn error(&mut self, message: &str) -> Result<()> {
        Err(Error::MalformedMarkup(message.to_string()))
    }

    /// Dispatch an event to the matching method.
    fn handle(&mut self, event: MarkupEvent<'_>) -> Result<()> {
        match event {
            MarkupEvent::ElementStart { name, attributes } => {
                self.element_start(name, &attributes)
            },
            MarkupEvent::Text(text) => self.text(&text),
            MarkupEvent::ElementEnd { name } => self.element_end(name),
            MarkupEvent::Error(message) => self.error(&message),
        }
    }
}

impl<H: MarkupHandler + ?Sized> MarkupHandler for &mut H {
    fn element_start(&mut self, name: &str, attributes: &Attributes<'_>) -> Result<()> {
        (**self).element_start(name, attributes)
    }

    fn text(&mut self, text: &str) -> Result<()> {
        (**self).text(text)
    }

    fn element_end(&mut self, name: &str) -> Result<()> {
        (**self).element_end(name)
    }

    fn error(&mut self, message: &str) -> Result<()> {
        (**self).error(message)
    }
}
