//! Sheet selection by name.
//!
//! A [`SheetPredicate`] decides, from the sheet name alone, whether a sheet is
//! extracted. Predicates are built from exact names, regular expressions,
//! arbitrary functions, or any combination of those (a sheet passes a
//! combination if it passes any member).
//!
//! With the `config` feature, [`SheetFilterSpec`] describes the data-only
//! subset (names, patterns, combinations) in a serializable form that can be
//! loaded from YAML.

use std::fmt;

use regex::Regex;

use crate::common::{Error, Result};

/// Boxed sheet-name test used by [`SheetPredicate::Custom`].
pub type SheetNameFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Which sheets to extract.
#[derive(Default)]
pub enum SheetPredicate {
    /// Every sheet
    #[default]
    All,
    /// Sheets whose name is exactly this string
    Name(String),
    /// Sheets whose name matches this expression anywhere
    Pattern(Regex),
    /// Sheets accepted by at least one member
    AnyOf(Vec<SheetPredicate>),
    /// Sheets for which the function returns true
    Custom(SheetNameFn),
}

impl SheetPredicate {
    pub fn all() -> Self {
        SheetPredicate::All
    }

    pub fn name(name: impl Into<String>) -> Self {
        SheetPredicate::Name(name.into())
    }

    /// Compile `pattern` as a regular expression.
    ///
    /// Fails with [`Error::InvalidPredicateSpec`] if it does not compile.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(SheetPredicate::Pattern(Regex::new(pattern)?))
    }

    pub fn any_of(members: impl IntoIterator<Item = SheetPredicate>) -> Self {
        SheetPredicate::AnyOf(members.into_iter().collect())
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        SheetPredicate::Custom(Box::new(f))
    }

    /// Whether the sheet called `sheet_name` should be extracted.
    pub fn matches(&self, sheet_name: &str) -> bool {
        match self {
            SheetPredicate::All => true,
            SheetPredicate::Name(name) => name == sheet_name,
            SheetPredicate::Pattern(regex) => regex.is_match(sheet_name),
            SheetPredicate::AnyOf(members) => members.iter().any(|m| m.matches(sheet_name)),
            SheetPredicate::Custom(f) => f(sheet_name),
        }
    }
}

impl fmt::Debug for SheetPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetPredicate::All => f.write_str("All"),
            SheetPredicate::Name(name) => f.debug_tuple("Name").field(name).finish(),
            SheetPredicate::Pattern(regex) => {
                f.debug_tuple("Pattern").field(&regex.as_str()).finish()
            },
            SheetPredicate::AnyOf(members) => f.debug_tuple("AnyOf").field(members).finish(),
            SheetPredicate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<&str> for SheetPredicate {
    fn from(name: &str) -> Self {
        SheetPredicate::Name(name.to_string())
    }
}

impl From<String> for SheetPredicate {
    fn from(name: String) -> Self {
        SheetPredicate::Name(name)
    }
}

impl From<Regex> for SheetPredicate {
    fn from(regex: Regex) -> Self {
        SheetPredicate::Pattern(regex)
    }
}

impl From<Vec<SheetPredicate>> for SheetPredicate {
    fn from(members: Vec<SheetPredicate>) -> Self {
        SheetPredicate::AnyOf(members)
    }
}

/// Serializable description of a [`SheetPredicate`].
///
/// ```yaml
/// any_of:
///   - name: "Первый лист"
///   - pattern: "^Second"
/// ```
#[cfg(feature = "config")]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetFilterSpec {
    /// Accept every sheet
    All,
    Name(String),
    Pattern(String),
    AnyOf(Vec<SheetFilterSpec>),
}

#[cfg(feature = "config")]
impl SheetFilterSpec {
    /// Parse a YAML document holding a single filter spec.
    ///
    /// Unknown kinds and malformed documents fail with
    /// [`Error::InvalidPredicateSpec`].
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| Error::InvalidPredicateSpec(e.to_string()))
    }
}

#[cfg(feature = "config")]
impl TryFrom<SheetFilterSpec> for SheetPredicate {
    type Error = Error;

    fn try_from(spec: SheetFilterSpec) -> Result<Self> {
        Ok(match spec {
            SheetFilterSpec::All => SheetPredicate::All,
            SheetFilterSpec::Name(name) => SheetPredicate::Name(name),
            SheetFilterSpec::Pattern(pattern) => Regex::new(&pattern)
                .map(SheetPredicate::Pattern)
                .map_err(|e| {
                    Error::InvalidPredicateSpec(format!("pattern `{}`: {}", pattern, e))
                })?,
            SheetFilterSpec::AnyOf(members) => SheetPredicate::AnyOf(
                members
                    .into_iter()
                    .map(SheetPredicate::try_from)
                    .collect::<Result<_>>()?,
            ),
        })
    }
}
