use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the locate, read and normalize stages.
///
/// Structural and referential problems abort the call. Per-value data quality
/// problems are never reported through this type; they are collected into a
/// [`ValidationReport`](crate::normalize::ValidationReport).
#[derive(Error, Debug)]
pub enum Error {
    /// Bad caller input, detected before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: '{}'", .0.display())]
    FileNotFound(PathBuf),

    /// Listing a dataset directory failed after it was found.
    #[error("Failed to read directory '{}': {source}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a spreadsheet container this crate can read.
    #[error("Unsupported format for '{name}': {reason}")]
    UnsupportedFormat { name: String, reason: String },

    /// The container was recognized but could not be parsed.
    #[error("Corrupt file '{name}': {reason}")]
    CorruptFile { name: String, reason: String },

    #[error("Sheet '{sheet}' not found in '{file}'")]
    SheetNotFound { file: String, sheet: String },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// Columns of a table under construction do not share one length.
    #[error("Column '{column}' has {found} values, expected {expected}")]
    RaggedColumns { column: String, expected: usize, found: usize },

    #[error("Duplicate key '{key}' in column '{column}' at rows {first} and {second}")]
    DuplicateKey { column: String, key: String, first: usize, second: usize },

    /// A spreadsheet error value (`#N/A`, `#DIV/0!`, ...) read with `error_as_null` unset.
    #[error("Error value '{value}' at {sheet}!{reference} in '{file}'")]
    CellError { file: String, sheet: String, reference: String, value: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Low level failure while decoding a container, before the file name is known.
///
/// Readers convert it with [`ResultCorruption::corrupt_in`] so the public error
/// carries the file it happened in.
#[derive(Error, Debug)]
pub(crate) enum DecodeError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    XmlHelper(#[from] crate::helpers::xml::XmlError),

    #[error("{0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("{0}")]
    StringEncoding(#[from] std::str::Utf8Error),

    #[error("missing part '{0}'")]
    MissingPart(String),

    /// An error value in a cell, surfaced as [`Error::CellError`] by the caller.
    #[error("error value '{value}' at {reference}")]
    CellError { reference: String, value: String },

    /// A readable container holding content this crate cannot decode.
    #[error("{0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

impl DecodeError {
    /// Attaches the file name, classifying the failure as corrupt or unsupported content.
    pub(crate) fn into_error(self, name: &str) -> Error {
        match self {
            DecodeError::Unsupported(reason) => Error::UnsupportedFormat {
                name: name.to_owned(),
                reason,
            },
            error => Error::CorruptFile {
                name: name.to_owned(),
                reason: error.to_string(),
            },
        }
    }
}

pub(crate) trait ResultCorruption<T> {
    /// Tags a decode failure with the file it came from.
    fn corrupt_in(self, name: &str) -> Result<T>;
}

impl<T> ResultCorruption<T> for std::result::Result<T, DecodeError> {
    fn corrupt_in(self, name: &str) -> Result<T> {
        self.map_err(|e| e.into_error(name))
    }
}
