//! Export section assembly: metadata, filter list, data table.

use filtersnap_xlsx::{EnumCellValue, SpecExportSection};

use crate::conf::{C_HEADER_EXTRACTION_TIME, C_HEADER_FILTERED_BY, C_INDENT_SECTION_ROW};
use crate::filter::format_filter_summary_line;
use crate::spec::{SpecFilterSummary, SpecSummaryData};
use crate::util::convert_json_to_cell;

/// Build the ordered workbook sections for one export.
///
/// Returns `None` when the summary data has no rows; nothing should be written then.
pub fn assemble_export_sections(
    summaries: &[SpecFilterSummary],
    summary_data: &SpecSummaryData,
    extraction_time: &str,
) -> Option<Vec<SpecExportSection>> {
    let section_table = derive_data_table(summary_data)?;
    Some(vec![
        derive_metadata_section(extraction_time),
        derive_filter_section(summaries),
        section_table,
    ])
}

/// Table section from summary data; `None` for zero rows.
pub fn derive_data_table(summary_data: &SpecSummaryData) -> Option<SpecExportSection> {
    if summary_data.data.is_empty() {
        return None;
    }

    let l_headers = summary_data
        .columns
        .iter()
        .map(|col| col.field_name.clone())
        .collect();
    let l_rows = summary_data
        .data
        .iter()
        .map(|row| row.iter().map(|cell| convert_json_to_cell(&cell.value)).collect())
        .collect();
    Some(SpecExportSection::table(l_headers, l_rows))
}

/// Extraction-time header, the indented timestamp, then a blank spacer row.
pub fn derive_metadata_section(extraction_time: &str) -> SpecExportSection {
    SpecExportSection::plain(
        vec![C_HEADER_EXTRACTION_TIME.to_string()],
        vec![
            vec![EnumCellValue::String(format!(
                "{C_INDENT_SECTION_ROW}{extraction_time}"
            ))],
            vec![],
        ],
    )
}

/// One indented `name → values` row per filter summary.
pub fn derive_filter_section(summaries: &[SpecFilterSummary]) -> SpecExportSection {
    SpecExportSection::plain(
        vec![C_HEADER_FILTERED_BY.to_string()],
        summaries
            .iter()
            .map(|summary| {
                vec![EnumCellValue::String(format!(
                    "{C_INDENT_SECTION_ROW}{}",
                    format_filter_summary_line(summary)
                ))]
            })
            .collect(),
    )
}
