//! Stateless helper utilities used by the XLSX writer kernel.

use crate::conf::{
    C_SHEET_NAME_FALLBACK, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{SpecExportSection, XlsxWriteError};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = C_SHEET_NAME_FALLBACK.to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SectionLayout

/// Compute the starting sheet row of each section, continuing from `n_row_cursor`.
///
/// Every section occupies its header, its body rows and one trailing spacer row.
pub fn plan_section_row_starts(
    sections: &[SpecExportSection],
    n_row_cursor: usize,
) -> Result<Vec<usize>, XlsxWriteError> {
    let mut l_row_starts = Vec::with_capacity(sections.len());
    let mut n_row_next = n_row_cursor;
    for section in sections {
        let n_cols = section.width();
        if n_cols > N_NCOLS_EXCEL_MAX {
            return Err(XlsxWriteError::TooManyColumns {
                n_cols,
                n_cols_max: N_NCOLS_EXCEL_MAX,
            });
        }
        l_row_starts.push(n_row_next);
        n_row_next += section.height();
    }

    // The trailing spacer row of the last section is never materialized as a cell.
    let n_rows_used = n_row_next.saturating_sub(1);
    if n_rows_used > N_NROWS_EXCEL_MAX {
        return Err(XlsxWriteError::TooManyRows {
            n_rows: n_rows_used,
            n_rows_max: N_NROWS_EXCEL_MAX,
        });
    }

    Ok(l_row_starts)
}

/// Widest row across all sections.
pub fn derive_used_width(sections: &[SpecExportSection]) -> usize {
    sections
        .iter()
        .map(SpecExportSection::width)
        .max()
        .unwrap_or(0)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumCellValue;

    #[test]
    fn test_sanitize_sheet_name_replaces_illegal_and_caps_length() {
        assert_eq!(sanitize_sheet_name("Sales/Profit [Q1]", "_"), "Sales_Profit _Q1_");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        let c_long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&c_long, "_").chars().count(), 31);
    }

    #[test]
    fn test_plan_section_row_starts_accounts_for_header_and_spacer() {
        let l_sections = vec![
            SpecExportSection::plain(
                vec!["File Extraction Time:".to_string()],
                vec![vec![EnumCellValue::from("now")], vec![]],
            ),
            SpecExportSection::plain(vec!["Results Filtered By:".to_string()], vec![]),
            SpecExportSection::table(
                vec!["Sales".to_string()],
                vec![vec![EnumCellValue::Number(1.0)]],
            ),
        ];

        assert_eq!(
            plan_section_row_starts(&l_sections, 0).unwrap(),
            vec![0, 4, 6]
        );
        assert_eq!(
            plan_section_row_starts(&l_sections, 10).unwrap(),
            vec![10, 14, 16]
        );
    }

    #[test]
    fn test_plan_section_row_starts_rejects_row_overflow() {
        let l_sections = vec![SpecExportSection::table(
            vec!["A".to_string()],
            vec![vec![]; N_NROWS_EXCEL_MAX],
        )];

        let err = plan_section_row_starts(&l_sections, 0).unwrap_err();
        assert!(matches!(err, XlsxWriteError::TooManyRows { .. }));
    }

    #[test]
    fn test_plan_section_row_starts_rejects_column_overflow() {
        let l_headers = vec![String::new(); N_NCOLS_EXCEL_MAX + 1];
        let l_sections = vec![SpecExportSection::table(l_headers, vec![])];

        let err = plan_section_row_starts(&l_sections, 0).unwrap_err();
        assert!(matches!(
            err,
            XlsxWriteError::TooManyColumns {
                n_cols,
                n_cols_max: N_NCOLS_EXCEL_MAX,
            } if n_cols == N_NCOLS_EXCEL_MAX + 1
        ));

        let l_sections_max = vec![SpecExportSection::table(
            vec![String::new(); N_NCOLS_EXCEL_MAX],
            vec![],
        )];
        assert!(plan_section_row_starts(&l_sections_max, 0).is_ok());
    }

    #[test]
    fn test_derive_used_width_takes_widest_row() {
        let l_sections = vec![
            SpecExportSection::plain(vec!["A".to_string()], vec![]),
            SpecExportSection::table(
                vec!["A".to_string(), "B".to_string()],
                vec![vec![
                    EnumCellValue::from("1"),
                    EnumCellValue::from("2"),
                    EnumCellValue::from("3"),
                ]],
            ),
        ];
        assert_eq!(derive_used_width(&l_sections), 3);
        assert_eq!(derive_used_width(&[]), 0);
    }
}
