//! Export labels, separators and environment keys.

/// Value list reported for a filter with everything selected.
pub const C_LABEL_ALL_SELECTED: &str = "All";
/// Separator between range bounds.
pub const C_SEP_RANGE: &str = " ⇔ ";
/// Separator between a filter name and its values.
pub const C_SEP_FILTER_NAME: &str = " → ";
/// Separator between filter values.
pub const C_SEP_FILTER_VALUES: &str = ", ";
/// Indent prefix for metadata and filter rows in the workbook.
pub const C_INDENT_SECTION_ROW: &str = "    ";

/// Relative-date value prefixes.
pub const C_PREFIX_PERIOD: &str = "Period: ";
pub const C_PREFIX_RANGE_N: &str = "RangeN: ";
pub const C_PREFIX_RANGE_TYPE: &str = "Range Type: ";

/// Platform filter type tags.
pub const C_FILTER_TYPE_CATEGORICAL: &str = "categorical";
pub const C_FILTER_TYPE_RANGE: &str = "range";
pub const C_FILTER_TYPE_RELATIVE_DATE: &str = "relative-date";
pub const C_FILTER_TYPE_HIERARCHICAL: &str = "hierarchical";

/// Metadata section header.
pub const C_HEADER_EXTRACTION_TIME: &str = "File Extraction Time:";
/// Filter section header.
pub const C_HEADER_FILTERED_BY: &str = "Results Filtered By:";

/// Output file name suffix appended to the worksheet name.
pub const C_FILE_NAME_SUFFIX: &str = "_filtered_data.xlsx";
/// Replacement for path separators, `..` and characters illegal in file names.
pub const C_FILE_NAME_REPLACEMENT: &str = "_";
/// File name stem used when sanitization leaves nothing.
pub const C_FILE_NAME_STEM_FALLBACK: &str = "worksheet";

/// Abbreviated-to-full field upgrades applied to the locale's date-time pattern.
pub const TUP_FMT_FULL_FIELD_UPGRADES: [(&str, &str); 5] = [
    ("%a", "%A"),
    ("%b", "%B"),
    ("%h", "%B"),
    ("%d", "%-d"),
    ("%e", "%-d"),
];
/// Locale used when the environment names none (or an unknown one).
pub const C_LOCALE_FALLBACK: &str = "en_US";
/// Environment variables consulted for the time locale, in priority order.
pub const TUP_LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_TIME", "LANG"];

/// Status messages.
pub const C_MSG_EMPTY_RESULT: &str =
    "No data to export for the selected worksheet with current filters.";
pub const C_MSG_EXPORT_FAILED_PREFIX: &str = "An error occurred during export: ";
