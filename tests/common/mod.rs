#![allow(dead_code)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A cell in a fixture sheet.
#[derive(Clone, Debug)]
pub enum Fixture {
    Text(&'static str),
    Number(f64),
    /// Serial number styled with the built-in date format 14
    Date(f64),
    /// Serial number styled with the custom format `hh:mm`
    Time(f64),
    Bool(bool),
    ErrorCode(&'static str),
    Blank,
}

pub use Fixture::*;

fn zip(parts: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn column_letters(col: usize) -> String {
    let mut col = col + 1;
    let mut letters = Vec::new();
    while col > 0 {
        col -= 1;
        letters.push(b'A' + (col % 26) as u8);
        col /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}

/// Builds an `.xlsx` workbook. Text cells go through the shared string table.
pub fn xlsx(sheets: &[(&str, Vec<Vec<Fixture>>)], date1904: bool) -> Vec<u8> {
    let mut shared = Vec::<String>::new();
    let mut parts = Vec::<(String, String)>::new();
    let mut entries = String::new();
    let mut relationships = String::new();
    for (index, (name, rows)) in sheets.iter().enumerate() {
        let id = index + 1;
        entries.push_str(&format!(r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#, escape(name)));
        relationships.push_str(&format!(
            r#"<Relationship Id="rId{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{id}.xml"/>"#
        ));
        let mut data = String::new();
        for (r, row) in rows.iter().enumerate() {
            data.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, cell) in row.iter().enumerate() {
                let reference = format!("{}{}", column_letters(c), r + 1);
                let xml = match cell {
                    Text(text) => {
                        shared.push(text.to_string());
                        format!(r#"<c r="{reference}" t="s"><v>{}</v></c>"#, shared.len() - 1)
                    }
                    Number(number) => format!(r#"<c r="{reference}"><v>{number}</v></c>"#),
                    Date(serial) => format!(r#"<c r="{reference}" s="1"><v>{serial}</v></c>"#),
                    Time(serial) => format!(r#"<c r="{reference}" s="2"><v>{serial}</v></c>"#),
                    Bool(flag) => format!(r#"<c r="{reference}" t="b"><v>{}</v></c>"#, u8::from(*flag)),
                    ErrorCode(code) => format!(r#"<c r="{reference}" t="e"><v>{}</v></c>"#, escape(code)),
                    Blank => format!(r#"<c r="{reference}" s="1"/>"#),
                };
                data.push_str(&xml);
            }
            data.push_str("</row>");
        }
        parts.push((
            format!("xl/worksheets/sheet{id}.xml"),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
            ),
        ));
    }

    let strings: String = shared.iter().map(|text| format!("<si><t>{}</t></si>", escape(text))).collect();
    parts.push((
        "xl/sharedStrings.xml".to_owned(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{strings}</sst>"#,
            shared.len()
        ),
    ));
    parts.push((
        "xl/styles.xml".to_owned(),
        r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="hh:mm"/></numFmts><cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/><xf numFmtId="164" applyNumberFormat="1"/></cellXfs></styleSheet>"#.to_owned(),
    ));
    parts.push((
        "xl/workbook.xml".to_owned(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr date1904="{}"/><sheets>{entries}</sheets></workbook>"#,
            if date1904 { "1" } else { "0" }
        ),
    ));
    parts.push((
        "xl/_rels/workbook.xml.rels".to_owned(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
        ),
    ));
    parts.push((
        "[Content_Types].xml".to_owned(),
        r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_owned(),
    ));

    let parts: Vec<(&str, String)> = parts.iter().map(|(name, content)| (name.as_str(), content.clone())).collect();
    zip(&parts)
}

/// Builds an `.ods` workbook from raw `table:table` bodies.
pub fn ods(tables: &[(&str, &str)]) -> Vec<u8> {
    let body: String = tables
        .iter()
        .map(|(name, rows)| format!(r#"<table:table table:name="{name}">{rows}</table:table>"#))
        .collect();
    let content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:calcext="urn:org:documentfoundation:names:experimental:calc:xmlns:calcext:1.0" office:version="1.3"><office:body><office:spreadsheet>{body}</office:spreadsheet></office:body></office:document-content>"#
    );
    let manifest = r#"<?xml version="1.0" encoding="UTF-8"?><manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0"><manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/><manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/></manifest:manifest>"#;
    zip(&[
        ("mimetype", "application/vnd.oasis.opendocument.spreadsheet".to_owned()),
        ("content.xml", content),
        ("META-INF/manifest.xml", manifest.to_owned()),
    ])
}

pub fn string_cell(text: &str) -> String {
    format!(r#"<table:table-cell office:value-type="string"><text:p>{text}</text:p></table:table-cell>"#)
}

pub fn float_cell(value: f64) -> String {
    format!(r#"<table:table-cell office:value-type="float" office:value="{value}"><text:p>{value}</text:p></table:table-cell>"#)
}

pub fn row(cells: &[String]) -> String {
    format!("<table:table-row>{}</table:table-row>", cells.concat())
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Two sheets: `Sheet1` holds id/value rows, `Sheet2` a small wide table.
pub fn faults_xlsx() -> Vec<u8> {
    xlsx(
        &[
            (
                "Sheet1",
                vec![
                    vec![Text("id"), Text("value")],
                    vec![Number(1.0), Text("10")],
                    vec![Number(2.0), Text("20")],
                ],
            ),
            (
                "Sheet2",
                vec![
                    vec![Text("id"), Text("x"), Text("y")],
                    vec![Number(1.0), Number(5.0), Number(7.0)],
                ],
            ),
        ],
        false,
    )
}
