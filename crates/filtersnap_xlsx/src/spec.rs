//! Shared XLSX specification models.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::conf::{N_WIDTH_COLUMN_DEFAULT, derive_default_section_formats};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification used for section header rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,

    /// Top border style.
    pub top: Option<i64>,
    /// Bottom border style.
    pub bottom: Option<i64>,
    /// Right border style.
    pub right: Option<i64>,

    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bold: other.bold.or(self.bold),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            right: other.right.or(self.right),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SectionSpecification

/// Normalized cell value written into a section row.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Text value. Missing source values arrive here as `""`.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Header styling class of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EnumSectionKind {
    /// Bold header only.
    #[default]
    Plain,
    /// Styled table header (colored fill + borders).
    Table,
}

/// One labeled block of rows written sequentially into the sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecExportSection {
    /// Header row cells.
    pub headers: Vec<String>,
    /// Body rows; an empty row is written as a blank spacer line.
    pub rows: Vec<Vec<EnumCellValue>>,
    /// Header styling class.
    pub kind: EnumSectionKind,
}

impl SpecExportSection {
    /// Build a plain (bold-header) section.
    pub fn plain(headers: Vec<String>, rows: Vec<Vec<EnumCellValue>>) -> Self {
        Self {
            headers,
            rows,
            kind: EnumSectionKind::Plain,
        }
    }

    /// Build a styled table section.
    pub fn table(headers: Vec<String>, rows: Vec<Vec<EnumCellValue>>) -> Self {
        Self {
            headers,
            rows,
            kind: EnumSectionKind::Table,
        }
    }

    /// Widest row (header included) in this section.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Rows occupied on the sheet: header, body, trailing spacer.
    pub fn height(&self) -> usize {
        self.rows.len() + 2
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Writer-wide options controlling sheet layout and header styling.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecXlsxWriteOptions {
    /// Width applied to every used column.
    pub width_column_default: f64,
    /// Header format by section kind.
    pub header_formats: BTreeMap<EnumSectionKind, SpecCellFormat>,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            width_column_default: N_WIDTH_COLUMN_DEFAULT,
            header_formats: derive_default_section_formats(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportAndErrors

/// Per-workbook write report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Actual sheet name in workbook.
    pub sheet_name: String,
    /// Number of sections written.
    pub n_sections: usize,
    /// Number of sheet rows consumed (headers, bodies, spacers).
    pub n_rows_written: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

/// Workbook write failures.
#[derive(Debug, Error)]
pub enum XlsxWriteError {
    /// Writer was already saved.
    #[error("Cannot write after save().")]
    Closed,
    /// Sections exceed the Excel row limit.
    #[error("Excel row limit exceeded: {n_rows} rows requested, max {n_rows_max}.")]
    TooManyRows {
        /// Requested row count.
        n_rows: usize,
        /// Excel limit.
        n_rows_max: usize,
    },
    /// A section exceeds the Excel column limit.
    #[error("Excel column limit exceeded: {n_cols} columns requested, max {n_cols_max}.")]
    TooManyColumns {
        /// Requested column count.
        n_cols: usize,
        /// Excel limit.
        n_cols_max: usize,
    },
    /// Error raised by the underlying workbook library.
    #[error("xlsx write error: {0}")]
    Backend(#[from] rust_xlsxwriter::XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
