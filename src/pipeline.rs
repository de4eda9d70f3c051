//! One-call load: locate the workbook, read one sheet, declare column types
//! and optionally reshape to long form.

use crate::error::Error;
use crate::error::Result;
use crate::locate::DatasetRef;
use crate::normalize::declare_types;
use crate::normalize::tidy_with;
use crate::normalize::TidyOptions;
use crate::normalize::TypeMap;
use crate::normalize::ValidationReport;
use crate::spreadsheet::open_workbook;
use crate::spreadsheet::LoadOptions;
use crate::table::Table;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

/// Everything needed to turn one sheet into a typed table.
///
/// ```toml
/// base_dir = "data"
/// file_name = "faults.xlsx"
/// sheet_name = "Sheet1"
///
/// [load]
/// nulls = ["NA"]
///
/// [columns]
/// id = "identifier"
/// value = { type = "numeric", min = 0 }
///
/// [tidy]
/// id_columns = ["id"]
/// variable_columns = ["x", "y"]
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub base_dir: PathBuf,
    pub file_name: PathBuf,
    pub sheet_name: String,
    #[serde(default)]
    pub load: LoadOptions,
    /// Column declarations applied after loading
    #[serde(default)]
    pub columns: TypeMap,
    /// Reshape applied after type declaration
    #[serde(default)]
    pub tidy: Option<TidySpec>,
}

/// Parameters of the final reshape step.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TidySpec {
    pub id_columns: Vec<String>,
    pub variable_columns: Vec<String>,
    #[serde(default)]
    pub options: TidyOptions,
}

/// Result of [`run`].
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub table: Table,
    /// Issues found while declaring types; rows index the loaded sheet
    pub validation: ValidationReport,
    /// Duplicate observations found while reshaping; rows index `table`
    pub reshape: ValidationReport,
}

impl PipelineConfig {
    pub fn new(base_dir: impl Into<PathBuf>, file_name: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        PipelineConfig {
            base_dir: base_dir.into(),
            file_name: file_name.into(),
            sheet_name: sheet_name.into(),
            load: LoadOptions::default(),
            columns: TypeMap::default(),
            tidy: None,
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.message().to_owned()))
    }

    pub fn dataset(&self) -> Result<DatasetRef> {
        DatasetRef::new(&self.base_dir, &self.file_name)
    }
}

/// Runs locate, read and normalize in order. The workbook is closed before
/// normalization starts.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let path = config.dataset()?.path();
    info!(path = %path.display(), sheet = %config.sheet_name, "loading dataset");

    let mut workbook = open_workbook(&path)?;
    let loaded = workbook.load_sheet_with(&config.sheet_name, &config.load)?;
    workbook.close();

    let (typed, validation) = declare_types(&loaded, &config.columns)?;
    let (table, reshape) = match &config.tidy {
        Some(spec) => {
            let id_columns: Vec<&str> = spec.id_columns.iter().map(String::as_str).collect();
            let variable_columns: Vec<&str> = spec.variable_columns.iter().map(String::as_str).collect();
            tidy_with(&typed, &id_columns, &variable_columns, &spec.options)?
        }
        None => (typed, ValidationReport::default()),
    };
    info!(
        rows = table.height(),
        columns = table.width(),
        issues = validation.len() + reshape.len(),
        "dataset ready"
    );
    Ok(PipelineOutput {
        table,
        validation,
        reshape,
    })
}
