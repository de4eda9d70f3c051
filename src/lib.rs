//! # tidy_sheet
//!
//! Load one sheet of a spreadsheet workbook into an in-memory table, inspect
//! it, declare a semantic type per column and reshape wide tables into tidy
//! long form.
//!
//! ## Features
//!
//! - **Native readers**: Office Open XML (`.xlsx`, `.xlsm`, `.xltx`, `.xltm`)
//!   and OpenDocument (`.ods`) decoded from the zip parts, no external tools
//! - **Date systems**: 1900 and 1904 epochs, built-in and custom number formats
//! - **Header handling**: blank header cells become `column{N}`, repeated names
//!   get `.1`, `.2` suffixes
//! - **Type declaration**: coercion to identifier, category, timestamp, date,
//!   numeric, integer, boolean and text columns, with a report of every value
//!   that does not fit
//! - **Tidy reshaping**: wide to long with duplicate observation checks
//!
//! ## Example
//!
//! ```no_run
//! use tidy_sheet::{declare_types, open_workbook, tidy, DatasetRef, SemanticType, TypeMap};
//!
//! # fn main() -> tidy_sheet::Result<()> {
//! let dataset = DatasetRef::new("data", "faults.xlsx")?;
//! let mut workbook = open_workbook(dataset.path())?;
//! let table = workbook.load_sheet("Sheet1")?;
//! workbook.close();
//!
//! let types = TypeMap::new()
//!     .with("id", SemanticType::Identifier)
//!     .with("x", SemanticType::Numeric)
//!     .with("y", SemanticType::Numeric);
//! let (typed, report) = declare_types(&table, &types)?;
//! for issue in &report {
//!     eprintln!("{issue}");
//! }
//! let (long, _) = tidy(&typed, &["id"], &["x", "y"])?;
//! # let _ = long;
//! # Ok(())
//! # }
//! ```

mod error;
mod helpers;
pub mod locate;
pub mod normalize;
pub mod pipeline;
pub mod spreadsheet;
pub mod table;

pub use error::Error;
pub use error::Result;
pub use locate::list_workbooks;
pub use locate::DatasetRef;
pub use normalize::declare_types;
pub use normalize::tidy;
pub use normalize::tidy_with;
pub use normalize::validate;
pub use normalize::ColumnSpec;
pub use normalize::Issue;
pub use normalize::Reason;
pub use normalize::TidyOptions;
pub use normalize::TypeMap;
pub use normalize::ValidationReport;
pub use pipeline::run;
pub use pipeline::PipelineConfig;
pub use pipeline::PipelineOutput;
pub use spreadsheet::list_sheets;
pub use spreadsheet::load_sheet;
pub use spreadsheet::load_sheet_with;
pub use spreadsheet::open_workbook;
pub use spreadsheet::Format;
pub use spreadsheet::LoadOptions;
pub use spreadsheet::Range;
pub use spreadsheet::Workbook;
pub use table::Column;
pub use table::Row;
pub use table::SemanticType;
pub use table::Table;
pub use table::Value;
