//! Shared fixtures: ODS packages assembled in memory.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.3">
 <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
 <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#;

/// Build an ODS package whose `content.xml` is `content`.
pub fn ods(content: &str) -> Cursor<Vec<u8>> {
    package(&[("content.xml", content)])
}

/// Build a package with the usual ODS framing plus `members`.
pub fn package(members: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file("mimetype", stored).unwrap();
    writer
        .write_all(b"application/vnd.oasis.opendocument.spreadsheet")
        .unwrap();
    writer.add_directory("META-INF/", stored).unwrap();
    writer.start_file("META-INF/manifest.xml", deflated).unwrap();
    writer.write_all(MANIFEST.as_bytes()).unwrap();
    for (name, data) in members {
        writer.start_file(*name, deflated).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }

    let mut cursor = writer.finish().unwrap();
    cursor.set_position(0);
    cursor
}

/// Wrap sheet markup in a `content.xml` document.
pub fn content(tables: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            "\n",
            r#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" "#,
            r#"xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" "#,
            r#"xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" "#,
            r#"xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" office:version="1.3">"#,
            r#"<office:automatic-styles><style:style style:name="ta1" style:family="table"/></office:automatic-styles>"#,
            "<office:body><office:spreadsheet>{}",
            r#"<table:named-expressions/></office:spreadsheet></office:body></office:document-content>"#,
        ),
        tables
    )
}

/// Two sheets shaped the way office suites save them: each sheet ends with
/// a blank row run up to the row limit and each row with a blank cell run up
/// to the column limit.
pub fn two_sheets() -> String {
    content(concat!(
        r#"<table:table table:name="Second Sheet" table:style-name="ta1">"#,
        r#"<table:table-column table:number-columns-repeated="2"/>"#,
        r#"<table:table-row><table:table-cell office:value-type="string"><text:p>Header B</text:p></table:table-cell>"#,
        r#"<table:table-cell office:value-type="string"><text:p>Header C</text:p></table:table-cell>"#,
        r#"<table:table-cell table:number-columns-repeated="16382"/></table:table-row>"#,
        r#"<table:table-row><table:table-cell office:value-type="string"><text:p>Batman</text:p></table:table-cell>"#,
        r#"<table:table-cell office:value-type="float" office:value="1"><text:p>1</text:p></table:table-cell>"#,
        r#"<table:table-cell table:number-columns-repeated="16382"/></table:table-row>"#,
        r#"<table:table-row><table:table-cell office:value-type="string"><text:p>Batman</text:p></table:table-cell>"#,
        r#"<table:table-cell office:value-type="float" office:value="2"><text:p>2</text:p></table:table-cell>"#,
        r#"<table:table-cell table:number-columns-repeated="16382"/></table:table-row>"#,
        r#"<table:table-row table:number-rows-repeated="1048573"><table:table-cell table:number-columns-repeated="16384"/></table:table-row>"#,
        r#"</table:table>"#,
        r#"<table:table table:name="Первый лист" table:style-name="ta1">"#,
        r#"<table:table-row>"#,
        r#"<table:table-cell><text:p>Header 1</text:p></table:table-cell>"#,
        r#"<table:table-cell><text:p>Header 2</text:p></table:table-cell>"#,
        r#"<table:table-cell><text:p>Header 3</text:p></table:table-cell>"#,
        r#"<table:table-cell><text:p>Header 4</text:p></table:table-cell>"#,
        r#"<table:table-cell/><table:table-cell table:number-columns-repeated="16379"/></table:table-row>"#,
        r#"<table:table-row><table:table-cell table:number-columns-repeated="4"><text:p>na</text:p></table:table-cell>"#,
        r#"<table:table-cell><text:p>overflow row</text:p></table:table-cell>"#,
        r#"<table:table-cell table:number-columns-repeated="16379"/></table:table-row>"#,
        r#"<table:table-row><table:table-cell table:number-columns-repeated="4"><text:p>na</text:p></table:table-cell>"#,
        r#"<table:table-cell/><table:table-cell table:number-columns-repeated="16379"/></table:table-row>"#,
        r#"<table:table-row table:number-rows-repeated="2"><table:table-cell table:number-columns-repeated="2"><text:p>na</text:p></table:table-cell>"#,
        r#"<table:table-cell table:number-columns-repeated="3"/><table:table-cell table:number-columns-repeated="16379"/></table:table-row>"#,
        r#"<table:table-row><table:table-cell><text:p>Bat</text:p></table:table-cell><table:table-cell><text:p>man</text:p></table:table-cell>"#,
        r#"<table:table-cell table:number-columns-repeated="3"/><table:table-cell table:number-columns-repeated="16379"/></table:table-row>"#,
        r#"<table:table-row><table:table-cell><text:p>Bat</text:p></table:table-cell><table:table-cell><text:p>maaan</text:p></table:table-cell>"#,
        r#"<table:table-cell table:number-columns-repeated="3"/><table:table-cell table:number-columns-repeated="16379"/></table:table-row>"#,
        r#"<table:table-row><table:table-cell><text:p>Bat<text:span text:style-name="T1">man</text:span>!</text:p></table:table-cell>"#,
        r#"<table:table-cell table:number-columns-repeated="4"/><table:table-cell table:number-columns-repeated="16379"/></table:table-row>"#,
        r#"<table:table-row><table:table-cell><text:p>  space</text:p></table:table-cell><table:table-cell><text:p>space  </text:p></table:table-cell>"#,
        r#"<table:table-cell table:number-columns-repeated="3"/><table:table-cell table:number-columns-repeated="16379"/></table:table-row>"#,
        "<table:table-row><table:table-cell><text:p>\tspace\n</text:p></table:table-cell>",
        r#"<table:table-cell table:number-columns-repeated="4"/><table:table-cell table:number-columns-repeated="16379"/></table:table-row>"#,
        r#"<table:table-row table:number-rows-repeated="1048566"><table:table-cell table:number-columns-repeated="16384"/></table:table-row>"#,
        r#"</table:table>"#,
    ))
}

pub fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Rows of [`two_sheets`] as `(sheet, cells)` pairs.
pub fn two_sheets_rows() -> Vec<(String, Vec<String>)> {
    let second = "Second Sheet";
    let first = "Первый лист";
    [
        (second, vec!["Header B", "Header C"]),
        (second, vec!["Batman", "1"]),
        (second, vec!["Batman", "2"]),
        (first, vec!["Header 1", "Header 2", "Header 3", "Header 4", ""]),
        (first, vec!["na", "na", "na", "na", "overflow row"]),
        (first, vec!["na", "na", "na", "na", ""]),
        (first, vec!["na", "na", "", "", ""]),
        (first, vec!["na", "na", "", "", ""]),
        (first, vec!["Bat", "man", "", "", ""]),
        (first, vec!["Bat", "maaan", "", "", ""]),
        (first, vec!["Batman!", "", "", "", ""]),
        (first, vec!["space", "space", "", "", ""]),
        (first, vec!["space", "", "", "", ""]),
    ]
    .into_iter()
    .map(|(sheet, cells)| (sheet.to_string(), strings(&cells)))
    .collect()
}
