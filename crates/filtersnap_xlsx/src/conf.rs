//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{EnumSectionKind, SpecCellFormat};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Width applied to every column a section touches.
pub const N_WIDTH_COLUMN_DEFAULT: f64 = 40.0;
/// Replacement for illegal sheet-name characters.
pub const C_SHEET_NAME_REPLACEMENT: &str = "_";
/// Fallback sheet name when sanitization leaves nothing.
pub const C_SHEET_NAME_FALLBACK: &str = "Sheet";

/// MIME type of the serialized workbook.
pub const C_XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Font color of styled table headers.
pub const C_COLOR_TABLE_HEADER_FONT: &str = "#9C6500";
/// Fill color of styled table headers.
pub const C_COLOR_TABLE_HEADER_FILL: &str = "#FFEB9C";

/// Build header format presets keyed by section kind.
pub fn derive_default_section_formats() -> BTreeMap<EnumSectionKind, SpecCellFormat> {
    let cfg_header_base = SpecCellFormat {
        bold: Some(true),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumSectionKind::Plain, cfg_header_base.clone());
    dict_fmt.insert(
        EnumSectionKind::Table,
        cfg_header_base.with_(SpecCellFormat {
            font_color: Some(C_COLOR_TABLE_HEADER_FONT.to_string()),
            bg_color: Some(C_COLOR_TABLE_HEADER_FILL.to_string()),
            top: Some(1),
            bottom: Some(1),
            right: Some(1),
            ..Default::default()
        }),
    );

    dict_fmt
}
