use crate::error::DecodeError;
use crate::helpers::reader::SourceReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::options::LoadOptions;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::io::Read;
use std::io::Seek;
use tracing::debug;
use zip::ZipArchive;

/// ODS file MIME type identifier
pub(crate) const MIME_TYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";
pub(crate) const CONTENT_PART: &str = "content.xml";
/// XML element name for spreadsheet root
const SPREADSHEET: QName = QName(b"office:spreadsheet");
/// XML element name for table (sheet)
const TABLE: QName = QName(b"table:table");
const TABLE_ROW: QName = QName(b"table:table-row");
const TABLE_CELL: QName = QName(b"table:table-cell");
/// XML element name for covered table cell (merged cells)
const TABLE_COVERED_CELL: QName = QName(b"table:covered-table-cell");
/// XML element name for annotations (comments)
const ANNOTATION: QName = QName(b"office:annotation");
const PARAGRAPH: QName = QName(b"text:p");
/// XML element name for runs of spaces
const STRING: QName = QName(b"text:s");
const FILE_ENTRY: QName = QName(b"manifest:file-entry");
const ENCRYPTION_DATA: QName = QName(b"manifest:encryption-data");

/// An OpenDocument spreadsheet (`.ods`).
pub(crate) struct OdsSpreadsheet {
    zip: ZipArchive<SourceReader>,
    sheet_names: Vec<String>,
}

impl OdsSpreadsheet {
    /// Validates the container and lists the sheets declared in `content.xml`.
    pub(crate) fn new(mut zip: ZipArchive<SourceReader>) -> Result<Self, DecodeError> {
        check_mime(&mut zip)?;
        if is_password_protected(&mut zip)? {
            Err(DecodeError::Unsupported("password protected OpenDocument file".to_owned()))?;
        }
        let sheet_names = load_sheet_names(&mut zip)?;
        debug!(sheets = sheet_names.len(), "opened ods workbook");
        Ok(OdsSpreadsheet { zip, sheet_names })
    }
}

impl Spreadsheet for OdsSpreadsheet {
    fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Finds the named table in `content.xml` and reads its cells, expanding
    /// repeated rows and columns.
    fn read_sheet(&mut self, sheet_name: &str, options: &LoadOptions) -> Result<Sheet, DecodeError> {
        let mut reader = self.zip.required_xml_reader(CONTENT_PART)?;
        let mut found = false;
        match_xml_events!(reader => {
            Event::End(event) if event.name() == SPREADSHEET => break,
            Event::Start(event) if event.name() == TABLE => {
                if event.get_attribute_value("table:name")?.map(|name| name == sheet_name).unwrap_or(false) {
                    found = true;
                    break;
                }
            }
        });
        if !found {
            Err(DecodeError::Other(format!("no table named '{sheet_name}'")))?;
        }

        let mut sheet = Sheet::new(sheet_name);
        let mut row = 0usize;
        let mut col = 0usize;
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        // Reading the paragraphs of a string cell
        let mut element_context = false;
        // Inside an annotation of the current cell
        let mut comment_context = false;
        // Depth of tables nested inside the current one
        let mut nested_tables = 0usize;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TABLE => nested_tables += 1,
            Event::End(event) if event.name() == TABLE => {
                if nested_tables == 0 {
                    break;
                }
                nested_tables -= 1;
            }
            Event::Start(event) if nested_tables == 0 && event.name() == TABLE_ROW => {
                row_count = event.parse_attribute_value("table:number-rows-repeated")?.unwrap_or(1);
                col = 0;
            }
            Event::End(event) if nested_tables == 0 && event.name() == TABLE_ROW => {
                row += row_count;
                if options.after_row_upper_bound(row, sheet.header_row()) {
                    break;
                }
            }
            Event::Start(event) if nested_tables == 0 && (event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL) => {
                value.clear();
                col_count = event.parse_attribute_value::<usize>("table:number-columns-repeated")?.unwrap_or(1);
                kind = CellType::Empty;
                if let Some(value_type) = event.get_attribute_value("office:value-type")? {
                    match value_type.as_ref() {
                        "string" => {
                            let is_error = event.get_attribute_value("calcext:value-type")?
                                .map(|cow| cow == "error")
                                .unwrap_or(false);
                            kind = if is_error { CellType::Error } else { CellType::InlineString };
                            element_context = true;
                        }
                        "boolean" => {
                            kind = CellType::Boolean;
                            let is_true = event.get_attribute_value("office:boolean-value")?
                                .map(|cow| cow != "false" && cow != "0")
                                .unwrap_or(false);
                            value.push(if is_true { '1' } else { '0' });
                        }
                        "date" => {
                            kind = CellType::IsoDateTime;
                            if let Some(data) = event.get_attribute_value("office:date-value")? {
                                value.push_str(&data);
                            }
                        }
                        "time" => {
                            kind = CellType::IsoDuration;
                            if let Some(data) = event.get_attribute_value("office:time-value")? {
                                value.push_str(&data);
                            }
                        }
                        _ => {
                            kind = CellType::Number;
                            if let Some(data) = event.get_attribute_value("office:value")? {
                                value.push_str(&data);
                            }
                        }
                    }
                }
            }
            Event::End(event) if nested_tables == 0 && (event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL) => {
                if kind != CellType::Empty && !value.is_empty() {
                    for row_number in row..row + row_count {
                        if options.before_row_lower_bound(row_number) {
                            continue;
                        } else if options.after_row_upper_bound(row_number, sheet.header_row()) {
                            break;
                        }
                        for col_number in col..col + col_count {
                            if options.contains_col(col_number) {
                                sheet.push(Cell {
                                    row: row_number,
                                    col: col_number,
                                    kind,
                                    value: value.to_owned(),
                                });
                            }
                        }
                    }
                }
                col += col_count;
                element_context = false;
                comment_context = false;
            }
            Event::Start(event) if element_context && event.name() == ANNOTATION => comment_context = true,
            Event::End(event) if element_context && comment_context && event.name() == ANNOTATION => comment_context = false,
            Event::Start(event) if element_context && !comment_context && event.name() == PARAGRAPH => {
                if !value.is_empty() {
                    value.push('\n');
                }
            }
            Event::Start(event) if element_context && !comment_context && event.name() == STRING => {
                let count = event.parse_attribute_value("text:c")?.unwrap_or(1);
                for _ in 0..count {
                    value.push(' ');
                }
            }
            Event::Text(event) if element_context && !comment_context => value.push_bytes_text(&event)?,
            Event::GeneralRef(event) if element_context && !comment_context => value.push_bytes_ref(&event)?,
        });
        debug!(sheet = sheet_name, cells = sheet.cells.len(), "read ods table");
        Ok(sheet)
    }
}

/// Validates the `mimetype` part when present.
fn check_mime<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<(), DecodeError> {
    if let Some(mut file) = zip.part("mimetype")? {
        let mut buffer = Vec::with_capacity(MIME_TYPE.len());
        file.read_to_end(&mut buffer)?;
        if buffer.trim_ascii() != MIME_TYPE {
            Err(DecodeError::Other(format!(
                "invalid OpenDocument mimetype '{}'",
                String::from_utf8_lossy(&buffer)
            )))?;
        }
    }
    Ok(())
}

/// Checks the manifest for encrypted entries; a missing manifest means no encryption.
fn is_password_protected<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<bool, DecodeError> {
    let mut reader = match zip.xml_reader("META-INF/manifest.xml")? {
        Some(reader) => reader,
        None => return Ok(false),
    };
    let mut in_file_entry = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == FILE_ENTRY => in_file_entry = true,
        Event::End(event) if event.name() == FILE_ENTRY => in_file_entry = false,
        Event::Start(event) if in_file_entry && event.name() == ENCRYPTION_DATA => {
            return Ok(true);
        }
    });
    Ok(false)
}

/// Lists top-level table names in document order.
fn load_sheet_names<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, DecodeError> {
    let mut reader = zip.required_xml_reader(CONTENT_PART)?;
    let mut names = Vec::<String>::new();
    let mut depth = 0usize;
    match_xml_events!(reader => {
        Event::End(event) if event.name() == SPREADSHEET => break,
        Event::Start(event) if event.name() == TABLE => {
            if depth == 0 {
                let name = event.get_attribute_value("table:name")?
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| format!("Sheet{}", names.len() + 1));
                names.push(name);
            }
            depth += 1;
        }
        Event::End(event) if event.name() == TABLE => depth = depth.saturating_sub(1),
    });
    Ok(names)
}
