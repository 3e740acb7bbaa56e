//! ODF constants: package parts, XML tags and attributes, table limits.
//!
//! Only the vocabulary the streaming extractor reacts to is listed here; every
//! other element of `content.xml` passes through the decoder untouched.

// ============================================================================
// PACKAGE PARTS
// ============================================================================

/// Path to content.xml (main document content)
pub const ODF_CONTENT: &str = "content.xml";

// ============================================================================
// TABLE ELEMENTS AND ATTRIBUTES
// ============================================================================

/// A sheet
pub const TABLE_TABLE: &str = "table:table";

/// A row of a sheet
pub const TABLE_TABLE_ROW: &str = "table:table-row";

/// A cell of a row
pub const TABLE_TABLE_CELL: &str = "table:table-cell";

/// Name of a sheet; mandatory on `table:table`
pub const ATTR_TABLE_NAME: &str = "table:name";

/// Run length of a `table:table-row`
pub const ATTR_ROWS_REPEATED: &str = "table:number-rows-repeated";

/// Run length of a `table:table-cell`
pub const ATTR_COLUMNS_REPEATED: &str = "table:number-columns-repeated";

// ============================================================================
// TABLE LIMITS
// ============================================================================
// Office suites pad the end of a sheet (and of each row) with one run that
// reaches exactly these limits.

/// Maximum number of rows in a sheet (2^20)
pub const MAX_ROWS_PER_SHEET: u64 = 1 << 20;

/// Maximum number of cells in a row (2^14)
pub const MAX_CELLS_PER_ROW: u64 = 1 << 14;

// ============================================================================
// STREAMING
// ============================================================================

/// Default number of decompressed bytes fed to the tokenizer at once
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Largest accepted chunk size
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_match_format_ceilings() {
        assert_eq!(MAX_ROWS_PER_SHEET, 1_048_576);
        assert_eq!(MAX_CELLS_PER_ROW, 16_384);
        assert!(DEFAULT_CHUNK_SIZE <= MAX_CHUNK_SIZE);
    }
}
