//! Workbook reader for Office Open XML and OpenDocument spreadsheets.
//!
//! Containers are recognized by their magic bytes and extension, then decoded
//! natively from the zip parts with `quick-xml`.

pub(crate) mod cell;
mod excel;
mod ods;
mod options;
mod range;
pub(crate) mod reference;
pub(crate) mod sheet;
mod xlsx;

pub use options::LoadOptions;
pub use range::Range;

use crate::error::DecodeError;
use crate::error::Error;
use crate::error::Result;
use crate::error::ResultCorruption;
use crate::helpers::reader::SourceReader;
use crate::helpers::zip::ZipHelper;
use crate::spreadsheet::ods::OdsSpreadsheet;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use crate::table::Table;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;
use tracing::info;
use zip::ZipArchive;

/// Compound File Binary signature shared by `.xls` and encrypted OOXML files
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";
const EMPTY_ZIP_MAGIC: [u8; 4] = *b"PK\x05\x06";

/// Extensions of the containers this crate reads.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xltx", "xltm", "ods"];
const LEGACY_EXTENSIONS: &[&str] = &["xls", "xla", "xlsb"];

/// Per-format reader behind a [`Workbook`].
pub(crate) trait Spreadsheet {
    /// Sheet names in the order the workbook declares them.
    fn sheet_names(&self) -> &[String];

    /// Reads the raw cells of one sheet. The name must be one of [`Spreadsheet::sheet_names`].
    fn read_sheet(&mut self, sheet_name: &str, options: &LoadOptions) -> std::result::Result<Sheet, DecodeError>;
}

/// Container format of an open workbook.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    /// Office Open XML spreadsheet
    Xlsx,
    /// OpenDocument spreadsheet
    Ods,
}

/// An open multi-sheet workbook. The underlying file is released on drop.
pub struct Workbook {
    name: String,
    format: Format,
    inner: Box<dyn Spreadsheet>,
}

impl fmt::Debug for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbook")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("sheets", &self.inner.sheet_names())
            .finish()
    }
}

/// Opens a workbook file. See [`Workbook::open`].
pub fn open_workbook(path: impl AsRef<Path>) -> Result<Workbook> {
    Workbook::open(path)
}

/// Sheet names of `workbook` in file-declared order.
pub fn list_sheets(workbook: &Workbook) -> Vec<String> {
    workbook.sheet_names().to_vec()
}

/// Loads a sheet with default options. See [`Workbook::load_sheet`].
pub fn load_sheet(workbook: &mut Workbook, sheet_name: &str) -> Result<Table> {
    workbook.load_sheet(sheet_name)
}

/// Loads a sheet with explicit options. See [`Workbook::load_sheet_with`].
pub fn load_sheet_with(workbook: &mut Workbook, sheet_name: &str, options: &LoadOptions) -> Result<Table> {
    workbook.load_sheet_with(sheet_name, options)
}

impl Workbook {
    /// Opens a workbook file.
    ///
    /// Fails with [`Error::FileNotFound`] if nothing exists at `path`,
    /// [`Error::UnsupportedFormat`] for files that are not a readable
    /// spreadsheet container and [`Error::CorruptFile`] for containers that
    /// cannot be parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Workbook> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound(path.to_path_buf()));
            }
            Err(error) => return Err(DecodeError::Io(error).into_error(&name)),
        };
        if metadata.is_dir() {
            return Err(Error::UnsupportedFormat {
                name,
                reason: "is a directory".to_owned(),
            });
        }
        let file = File::open(path).map_err(DecodeError::Io).corrupt_in(&name)?;
        let extension = path.extension().map(|extension| extension.to_string_lossy().to_ascii_lowercase());
        Self::from_reader(name, extension, SourceReader::Local(BufReader::new(file)))
    }

    /// Opens a workbook held in memory. `name` is used for format detection
    /// by extension and in error messages.
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<Workbook> {
        let extension = Path::new(name)
            .extension()
            .map(|extension| extension.to_string_lossy().to_ascii_lowercase());
        Self::from_reader(name.to_owned(), extension, SourceReader::Memory(Cursor::new(bytes)))
    }

    fn from_reader(name: String, extension: Option<String>, mut reader: SourceReader) -> Result<Workbook> {
        let (magic, len) = reader.peek_magic::<8>().map_err(DecodeError::Io).corrupt_in(&name)?;
        if len == CFB_MAGIC.len() && magic == CFB_MAGIC {
            return Err(Error::UnsupportedFormat {
                name,
                reason: "legacy binary or encrypted Office file".to_owned(),
            });
        }
        let extension = extension.unwrap_or_default();
        if LEGACY_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::UnsupportedFormat {
                name,
                reason: format!("'.{extension}' workbooks are not supported"),
            });
        }

        let is_known = SUPPORTED_EXTENSIONS.contains(&extension.as_str());
        let is_zip = len >= 4 && (magic[..4] == ZIP_MAGIC || magic[..4] == EMPTY_ZIP_MAGIC);
        let zip = match (is_zip, is_known) {
            (true, _) => ZipArchive::new(reader).map_err(DecodeError::Zip),
            (false, true) => Err(DecodeError::Other("not a zip archive".to_owned())),
            (false, false) => {
                return Err(Error::UnsupportedFormat {
                    name,
                    reason: "not a spreadsheet container".to_owned(),
                })
            }
        };
        let zip = match zip {
            Ok(zip) => zip,
            Err(error) if is_known => return Err(error.into_error(&name)),
            Err(error) => {
                return Err(Error::UnsupportedFormat {
                    name,
                    reason: error.to_string(),
                })
            }
        };

        let format = match extension.as_str() {
            "ods" => Format::Ods,
            "xlsx" | "xlsm" | "xltx" | "xltm" => Format::Xlsx,
            _ => sniff_format(&zip).ok_or_else(|| Error::UnsupportedFormat {
                name: name.to_owned(),
                reason: "zip archive without workbook content".to_owned(),
            })?,
        };
        let inner: Box<dyn Spreadsheet> = match format {
            Format::Xlsx => Box::new(XlsxSpreadsheet::new(zip).corrupt_in(&name)?),
            Format::Ods => Box::new(OdsSpreadsheet::new(zip).corrupt_in(&name)?),
        };
        info!(file = %name, format = ?format, sheets = inner.sheet_names().len(), "opened workbook");
        Ok(Workbook { name, format, inner })
    }

    /// Name the workbook was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Sheet names in file-declared order; empty for a workbook without sheets.
    pub fn sheet_names(&self) -> &[String] {
        self.inner.sheet_names()
    }

    /// Loads a sheet with default [`LoadOptions`].
    pub fn load_sheet(&mut self, sheet_name: &str) -> Result<Table> {
        self.load_sheet_with(sheet_name, &LoadOptions::default())
    }

    /// Loads a sheet into a [`Table`]: the first non-empty row is the header
    /// and every later row up to the last used one is a data row.
    pub fn load_sheet_with(&mut self, sheet_name: &str, options: &LoadOptions) -> Result<Table> {
        if !self.inner.sheet_names().iter().any(|name| name == sheet_name) {
            return Err(Error::SheetNotFound {
                file: self.name.to_owned(),
                sheet: sheet_name.to_owned(),
            });
        }
        let table = self
            .inner
            .read_sheet(sheet_name, options)
            .and_then(|sheet| sheet.into_table(options))
            .map_err(|error| self.sheet_error(sheet_name, error))?;
        debug!(
            file = %self.name,
            sheet = sheet_name,
            columns = table.width(),
            rows = table.height(),
            "loaded sheet"
        );
        Ok(table)
    }

    /// Releases the underlying file.
    pub fn close(self) {
        debug!(file = %self.name, "closed workbook");
    }

    fn sheet_error(&self, sheet_name: &str, error: DecodeError) -> Error {
        match error {
            DecodeError::CellError { reference, value } => Error::CellError {
                file: self.name.to_owned(),
                sheet: sheet_name.to_owned(),
                reference,
                value,
            },
            error => error.into_error(&self.name),
        }
    }
}

/// Recognizes a zip archive by the parts each format requires.
fn sniff_format(zip: &ZipArchive<SourceReader>) -> Option<Format> {
    if zip.has_part(xlsx::WORKBOOK_PART) {
        Some(Format::Xlsx)
    } else if zip.has_part("mimetype") || zip.has_part(ods::CONTENT_PART) {
        Some(Format::Ods)
    } else {
        None
    }
}
