//! Extraction options and their YAML form.

use crate::common::{Error, Result};
use crate::odf::constants::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::odf::ods::predicate::SheetPredicate;

#[cfg(feature = "config")]
use crate::odf::ods::predicate::SheetFilterSpec;

/// Settings for one extraction.
#[derive(Debug)]
pub struct ExtractOptions {
    /// Decompressed bytes fed to the tokenizer per step, `1..=MAX_CHUNK_SIZE`
    pub chunk_size: usize,
    /// Sheets to extract
    pub sheets: SheetPredicate,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            sheets: SheetPredicate::All,
        }
    }
}

impl ExtractOptions {
    /// Check the options before any input is read.
    pub fn validate(&self) -> Result<()> {
        validate_chunk_size(self.chunk_size)
    }
}

pub(crate) fn validate_chunk_size(chunk_size: usize) -> Result<()> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(Error::InvalidConfig(format!(
            "chunk size must be between 1 and {} bytes, got {}",
            MAX_CHUNK_SIZE, chunk_size
        )));
    }
    Ok(())
}

/// Extraction settings as written in a configuration file.
///
/// Every field is optional; missing fields keep their defaults.
///
/// ```yaml
/// chunk_size: 65536
/// sheets:
///   any_of:
///     - name: "Первый лист"
///     - pattern: "^Second"
/// ```
#[cfg(feature = "config")]
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheets: Option<SheetFilterSpec>,
}

#[cfg(feature = "config")]
impl ExtractConfig {
    /// Parse a YAML configuration document.
    ///
    /// A `sheets` entry that is not a valid filter description fails with
    /// [`Error::InvalidPredicateSpec`]; any other problem with
    /// [`Error::InvalidConfig`].
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| {
            if serde_saphyr::from_str::<SheetsSkipped>(yaml).is_ok() {
                Error::InvalidPredicateSpec(format!("sheets: {}", e))
            } else {
                Error::InvalidConfig(e.to_string())
            }
        })
    }

    /// Read and parse a YAML configuration file.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}

/// [`ExtractConfig`] with the `sheets` value left unread, to tell a bad
/// filter apart from a bad document.
#[cfg(feature = "config")]
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(dead_code)]
struct SheetsSkipped {
    #[serde(default)]
    chunk_size: Option<usize>,
    #[serde(default)]
    sheets: Option<serde::de::IgnoredAny>,
}

#[cfg(feature = "config")]
impl TryFrom<ExtractConfig> for ExtractOptions {
    type Error = Error;

    fn try_from(config: ExtractConfig) -> Result<Self> {
        let mut options = ExtractOptions::default();
        if let Some(chunk_size) = config.chunk_size {
            options.chunk_size = chunk_size;
        }
        if let Some(sheets) = config.sheets {
            options.sheets = SheetPredicate::try_from(sheets)?;
        }
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert_eq!(options.chunk_size, 32 * 1024);
        assert!(matches!(options.sheets, SheetPredicate::All));
        options.validate().unwrap();
    }

    #[test]
    fn test_chunk_size_bounds() {
        assert!(validate_chunk_size(1).is_ok());
        assert!(validate_chunk_size(MAX_CHUNK_SIZE).is_ok());
        assert!(matches!(validate_chunk_size(0), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            validate_chunk_size(MAX_CHUNK_SIZE + 1),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_from_yaml() {
        let config = ExtractConfig::from_yaml(
            "chunk_size: 65536\nsheets:\n  any_of:\n    - name: \"Первый лист\"\n    - pattern: \"^Second\"\n",
        )
        .unwrap();
        assert_eq!(config.chunk_size, Some(65536));

        let options = ExtractOptions::try_from(config).unwrap();
        assert_eq!(options.chunk_size, 65536);
        assert!(options.sheets.matches("Первый лист"));
        assert!(options.sheets.matches("Second Sheet"));
        assert!(!options.sheets.matches("Third"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_partial_config_keeps_defaults() {
        let options = ExtractOptions::try_from(ExtractConfig::from_yaml("chunk_size: 10\n").unwrap())
            .unwrap();
        assert_eq!(options.chunk_size, 10);
        assert!(matches!(options.sheets, SheetPredicate::All));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_unknown_filter_kind_is_a_predicate_error() {
        for yaml in [
            "sheets:\n  glob: \"*\"\n",
            "chunk_size: 10\nsheets:\n  any_of:\n    - name: a\n    - regex: b\n",
            "sheets: everything\n",
        ] {
            assert!(
                matches!(ExtractConfig::from_yaml(yaml), Err(Error::InvalidPredicateSpec(_))),
                "{}",
                yaml
            );
        }
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            ExtractConfig::from_yaml("chunk_size: lots\n"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            ExtractConfig::from_yaml("chunk: 10\n"),
            Err(Error::InvalidConfig(_))
        ));

        assert!(matches!(
            ExtractConfig::from_yaml("chunk_size: lots\nsheets:\n  glob: \"*\"\n"),
            Err(Error::InvalidConfig(_))
        ));

        let zero = ExtractConfig {
            chunk_size: Some(0),
            sheets: None,
        };
        assert!(matches!(ExtractOptions::try_from(zero), Err(Error::InvalidConfig(_))));

        let bad_pattern = ExtractConfig {
            chunk_size: None,
            sheets: Some(SheetFilterSpec::Pattern("(".to_string())),
        };
        assert!(matches!(
            ExtractOptions::try_from(bad_pattern),
            Err(Error::InvalidPredicateSpec(_))
        ));
    }
}
