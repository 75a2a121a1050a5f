//! `filtersnap_xlsx` v1:
//! Section-oriented XLSX writer for filter snapshots.
//!
//! Modules:
//! - `conf`   : constants and default presets
//! - `spec`   : section/format models, options, errors
//! - `util`   : pure layout helpers
//! - `writer` : `rust_xlsxwriter`-backed writer kernel
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_XLSX_MIME_TYPE, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    N_WIDTH_COLUMN_DEFAULT, derive_default_section_formats,
};
pub use spec::{
    EnumCellValue, EnumSectionKind, SpecCellFormat, SpecExportSection, SpecXlsxReport,
    SpecXlsxWriteOptions, XlsxWriteError,
};
pub use util::{derive_used_width, plan_section_row_starts, sanitize_sheet_name};
pub use writer::XlsxWriter;
