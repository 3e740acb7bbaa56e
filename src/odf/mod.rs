//! OpenDocument Format support.

/// Element and attribute names, table limits
pub mod constants;
/// ODF package (ZIP) access
pub mod core;
/// OpenDocument Spreadsheet (.ods) extraction
pub mod ods;
