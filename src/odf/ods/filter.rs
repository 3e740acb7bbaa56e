//! Sheet-level filtering of markup events.

use crate::common::xml::{Attributes, MarkupHandler};
use crate::common::{Error, Result};
use crate::odf::constants::{ATTR_TABLE_NAME, TABLE_TABLE};
use crate::odf::ods::predicate::SheetPredicate;

/// Handler placed in front of another handler that drops every event
/// belonging to a sheet the predicate rejects.
///
/// The decision is made once, at the sheet's start tag. Events outside any
/// sheet and events of accepted sheets are forwarded unchanged, and so are
/// tokenizer errors. A rejected sheet produces no event at all downstream,
/// including its own start and end tags.
pub struct SheetFilter<H> {
    inner: H,
    predicate: SheetPredicate,
    /// `table:table` elements currently open
    depth: usize,
    /// Whether the open top-level sheet was rejected
    bypass: bool,
}

impl<H: MarkupHandler> SheetFilter<H> {
    pub fn new(inner: H, predicate: SheetPredicate) -> Self {
        Self {
            inner,
            predicate,
            depth: 0,
            bypass: false,
        }
    }

    pub fn predicate(&self) -> &SheetPredicate {
        &self.predicate
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    pub fn into_inner(self) -> H {
        self.inner
    }

    /// Whether events are currently being dropped.
    pub fn is_bypassing(&self) -> bool {
        self.bypass
    }
}

impl<H: MarkupHandler> MarkupHandler for SheetFilter<H> {
    fn element_start(&mut self, name: &str, attributes: &Attributes<'_>) -> Result<()> {
        if name == TABLE_TABLE {
            if self.depth == 0 {
                let sheet = attributes
                    .get(ATTR_TABLE_NAME)
                    .ok_or_else(|| Error::missing_attribute(TABLE_TABLE, ATTR_TABLE_NAME))?;
                self.bypass = !self.predicate.matches(sheet);
                if self.bypass {
                    tracing::debug!(sheet, "skipping sheet");
                }
            }
            self.depth += 1;
        }
        if self.bypass {
            return Ok(());
        }
        self.inner.element_start(name, attributes)
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.bypass {
            return Ok(());
        }
        self.inner.text(text)
    }

    fn element_end(&mut self, name: &str) -> Result<()> {
        let bypassed = self.bypass;
        if name == TABLE_TABLE && self.depth > 0 {
            self.depth -= 1;
            if self.depth == 0 {
                self.bypass = false;
            }
        }
        if bypassed {
            return Ok(());
        }
        self.inner.element_end(name)
    }

    fn error(&mut self, message: &str) -> Result<()> {
        self.inner.error(message)
    }
}
