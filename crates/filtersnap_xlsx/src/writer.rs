//! XLSX writer kernel that lays export sections out on a single sheet.

use std::collections::BTreeMap;
use std::path::Path;

use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};
use tracing::{debug, warn};

use crate::conf::{C_SHEET_NAME_REPLACEMENT, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{
    EnumCellValue, EnumSectionKind, SpecCellFormat, SpecExportSection, SpecXlsxReport,
    SpecXlsxWriteOptions, XlsxWriteError,
};
use crate::util::{derive_used_width, plan_section_row_starts, sanitize_sheet_name};

/// Stateful single-sheet workbook writer.
///
/// Sections are appended top to bottom; the workbook stays in memory until
/// [`Self::save_to_buffer`] or [`Self::save`] is called.
pub struct XlsxWriter {
    workbook: Workbook,
    write_options: SpecXlsxWriteOptions,
    dict_fmt_header: BTreeMap<EnumSectionKind, Format>,
    n_row_cursor: usize,
    n_width_cols_set: usize,
    report: SpecXlsxReport,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer with one sheet named after `sheet_name` (sanitized).
    pub fn new(sheet_name: &str, write_options: SpecXlsxWriteOptions) -> Result<Self, XlsxWriteError> {
        let sheet_name_clean = sanitize_sheet_name(sheet_name, C_SHEET_NAME_REPLACEMENT);
        let mut report = SpecXlsxReport {
            sheet_name: sheet_name_clean.clone(),
            ..Default::default()
        };
        if sheet_name_clean != sheet_name {
            report.warn(format!(
                "Sheet name {sheet_name:?} sanitized to {sheet_name_clean:?}."
            ));
        }

        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name(&sheet_name_clean)?;

        let dict_fmt_header = write_options
            .header_formats
            .iter()
            .map(|(kind, spec)| (*kind, derive_rust_xlsx_format(spec)))
            .collect();

        Ok(Self {
            workbook,
            write_options,
            dict_fmt_header,
            n_row_cursor: 0,
            n_width_cols_set: 0,
            report,
            if_closed: false,
        })
    }

    /// Return snapshot of the write report.
    pub fn report(&self) -> SpecXlsxReport {
        self.report.clone()
    }

    /// Append sections in order: header row, body rows, one blank spacer row each.
    pub fn write_sections(&mut self, sections: &[SpecExportSection]) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }

        let l_row_starts = plan_section_row_starts(sections, self.n_row_cursor)?;
        let n_width_used = derive_used_width(sections);
        let fmt_header_fallback = Format::new().set_bold();

        let worksheet = self.workbook.worksheet_from_index(0)?;
        for (section, n_row_start) in sections.iter().zip(&l_row_starts) {
            let fmt_header = self
                .dict_fmt_header
                .get(&section.kind)
                .unwrap_or(&fmt_header_fallback);
            write_header(worksheet, *n_row_start, &section.headers, fmt_header)?;

            for (n_idx_row, row) in section.rows.iter().enumerate() {
                let n_row = *n_row_start + 1 + n_idx_row;
                for (n_idx_col, value) in row.iter().enumerate() {
                    write_cell(worksheet, n_row, n_idx_col, value)?;
                }
            }
            debug!(
                kind = ?section.kind,
                row_start = n_row_start,
                rows = section.rows.len(),
                "wrote section"
            );
        }

        for n_idx_col in self.n_width_cols_set..n_width_used {
            worksheet.set_column_width(
                cast_col_num(n_idx_col)?,
                self.write_options.width_column_default,
            )?;
        }
        self.n_width_cols_set = usize::max(self.n_width_cols_set, n_width_used);

        let n_rows_added: usize = sections.iter().map(SpecExportSection::height).sum();
        self.n_row_cursor += n_rows_added;
        self.report.n_sections += sections.len();
        self.report.n_rows_written += n_rows_added;
        Ok(())
    }

    /// Serialize workbook to xlsx bytes and close the writer for further writes.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, XlsxWriteError> {
        self.log_warnings();
        let v_bytes = self.workbook.save_to_buffer()?;
        self.if_closed = true;
        Ok(v_bytes)
    }

    /// Flush workbook to disk and close the writer for further writes.
    pub fn save(&mut self, path_file_out: &Path) -> Result<(), XlsxWriteError> {
        self.log_warnings();
        self.workbook.save(path_file_out)?;
        self.if_closed = true;
        Ok(())
    }

    fn log_warnings(&self) {
        if self.if_closed {
            return;
        }
        for c_warning in &self.report.warnings {
            warn!(sheet = %self.report.sheet_name, "{c_warning}");
        }
    }
}

fn write_header(
    worksheet: &mut Worksheet,
    row_idx: usize,
    headers: &[String],
    fmt_header: &Format,
) -> Result<(), XlsxWriteError> {
    for (col_idx, cell_value) in headers.iter().enumerate() {
        if cell_value.is_empty() {
            worksheet.write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, fmt_header)?;
        } else {
            worksheet.write_string_with_format(
                cast_row_num(row_idx)?,
                cast_col_num(col_idx)?,
                cell_value,
                fmt_header,
            )?;
        }
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
) -> Result<(), XlsxWriteError> {
    match value {
        // empty placeholder: leave the cell unset
        EnumCellValue::String(val) if val.is_empty() => {}
        EnumCellValue::String(val) => {
            worksheet.write_string(cast_row_num(row_idx)?, cast_col_num(col_idx)?, val)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number(cast_row_num(row_idx)?, cast_col_num(col_idx)?, *val)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean(cast_row_num(row_idx)?, cast_col_num(col_idx)?, *val)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxWriteError> {
    u32::try_from(value).map_err(|_| XlsxWriteError::TooManyRows {
        n_rows: value,
        n_rows_max: N_NROWS_EXCEL_MAX,
    })
}

fn cast_col_num(value: usize) -> Result<u16, XlsxWriteError> {
    u16::try_from(value).map_err(|_| XlsxWriteError::TooManyColumns {
        n_cols: value,
        n_cols_max: N_NCOLS_EXCEL_MAX,
    })
}
