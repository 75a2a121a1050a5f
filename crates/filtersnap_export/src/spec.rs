//! Filter/summary-data models, export artifacts, status view and errors.

use std::path::PathBuf;

use filtersnap_xlsx::{SpecXlsxReport, XlsxWriteError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::conf::{
    C_FILTER_TYPE_CATEGORICAL, C_FILTER_TYPE_HIERARCHICAL, C_FILTER_TYPE_RANGE,
    C_FILTER_TYPE_RELATIVE_DATE, C_MSG_EMPTY_RESULT, C_MSG_EXPORT_FAILED_PREFIX,
};

////////////////////////////////////////////////////////////////////////////////
// #region FilterSpecification

/// One selected value of a categorical filter.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecCategoricalValue {
    /// Raw value as stored by the platform.
    #[serde(default)]
    pub value: Value,
    /// Display label, when the platform provides one.
    #[serde(default)]
    pub formatted_value: Option<String>,
}

/// One bound of a range filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecRangeBound {
    /// Display label of the bound.
    #[serde(default)]
    pub formatted_value: Option<String>,
}

/// Platform filter kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumFilterKind {
    /// Discrete set of selected values.
    Categorical {
        /// Selected values.
        applied_values: Vec<SpecCategoricalValue>,
    },
    /// Continuous range with optional bounds.
    Range {
        /// Lower bound.
        min_value: Option<SpecRangeBound>,
        /// Upper bound.
        max_value: Option<SpecRangeBound>,
    },
    /// Date window relative to the anchor date.
    RelativeDate {
        /// Period unit (`days`, `months`, ...).
        period_type: Option<String>,
        /// Window length in periods.
        range_n: Option<Value>,
        /// Window type (`last`, `next`, `lastn`, ...).
        range_type: Option<String>,
    },
    /// Hierarchical member selection. Values are not summarized.
    Hierarchical,
    /// Any tag this build does not know; the raw tag is kept for diagnostics.
    Unknown(String),
}

/// Platform filter descriptor, deserialized from the host's JSON shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "SpecFilterDescriptorRaw")]
pub struct SpecFilterDescriptor {
    /// Filtered field name.
    pub field_name: String,
    /// Set when the platform reports every value as selected.
    pub is_all_selected: Option<bool>,
    /// Kind-specific payload.
    pub kind: EnumFilterKind,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SpecFilterDescriptorRaw {
    field_name: String,
    filter_type: Option<String>,
    is_all_selected: Option<bool>,
    applied_values: Vec<SpecCategoricalValue>,
    min_value: Option<SpecRangeBound>,
    max_value: Option<SpecRangeBound>,
    period_type: Option<String>,
    range_n: Option<Value>,
    range_type: Option<String>,
}

impl From<SpecFilterDescriptorRaw> for SpecFilterDescriptor {
    fn from(raw: SpecFilterDescriptorRaw) -> Self {
        let c_filter_type = raw.filter_type.unwrap_or_default();
        let kind = match c_filter_type.as_str() {
            C_FILTER_TYPE_CATEGORICAL => EnumFilterKind::Categorical {
                applied_values: raw.applied_values,
            },
            C_FILTER_TYPE_RANGE => EnumFilterKind::Range {
                min_value: raw.min_value,
                max_value: raw.max_value,
            },
            C_FILTER_TYPE_RELATIVE_DATE => EnumFilterKind::RelativeDate {
                period_type: raw.period_type,
                range_n: raw.range_n,
                range_type: raw.range_type,
            },
            C_FILTER_TYPE_HIERARCHICAL => EnumFilterKind::Hierarchical,
            _ => EnumFilterKind::Unknown(c_filter_type),
        };
        Self {
            field_name: raw.field_name,
            is_all_selected: raw.is_all_selected,
            kind,
        }
    }
}

/// Display summary of one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFilterSummary {
    /// Filtered field name.
    pub name: String,
    /// Display values.
    pub values: Vec<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SummaryDataSpecification

/// Column descriptor of worksheet summary data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecSummaryColumn {
    /// Field name shown as the column header.
    pub field_name: String,
}

/// One cell of worksheet summary data.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct SpecSummaryCell {
    /// Raw cell value; `null` when missing.
    #[serde(default)]
    pub value: Value,
}

/// Tabular result currently displayed by a worksheet.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct SpecSummaryData {
    /// Columns in display order.
    #[serde(default)]
    pub columns: Vec<SpecSummaryColumn>,
    /// Row-major cells.
    #[serde(default)]
    pub data: Vec<Vec<SpecSummaryCell>>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportArtifact

/// Serialized workbook ready to hand to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecExportArtifact {
    /// Download file name.
    pub file_name: String,
    /// MIME type of `v_bytes`.
    pub mime_type: String,
    /// Workbook bytes.
    pub v_bytes: Vec<u8>,
    /// Writer report.
    pub report: SpecXlsxReport,
}

/// Status line state shown next to the export control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecStatusView {
    /// Error text; empty when there is nothing to report.
    pub error_msg: String,
    /// Loading indicator visibility.
    pub if_show_loading: bool,
}

impl SpecStatusView {
    /// Export running.
    pub fn loading() -> Self {
        Self {
            error_msg: String::new(),
            if_show_loading: true,
        }
    }

    /// Nothing to report.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Map a failed export to its user-facing message.
    pub fn from_error(err: &ExportError) -> Self {
        let error_msg = match err {
            ExportError::WorksheetNotFound(_) | ExportError::EmptyResult => err.to_string(),
            _ => format!("{C_MSG_EXPORT_FAILED_PREFIX}{err}"),
        };
        Self {
            error_msg,
            if_show_loading: false,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Host platform access failures.
#[derive(Debug, Error)]
pub enum HostError {
    /// Snapshot file could not be read.
    #[error("Failed to read dashboard snapshot {path}: {source}")]
    Read {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Snapshot content is not a valid dashboard document.
    #[error("Failed to parse dashboard snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    /// Worksheet is not part of the dashboard.
    #[error("Worksheet {0:?} is not part of the dashboard.")]
    WorksheetMissing(String),
}

/// Export pipeline failures.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Requested worksheet is not on the dashboard.
    #[error("Worksheet \"{0}\" not found.")]
    WorksheetNotFound(String),
    /// Summary data has zero rows.
    #[error("{}", C_MSG_EMPTY_RESULT)]
    EmptyResult,
    /// Another export on the same session has not finished.
    #[error("An export is already in progress.")]
    ExportInProgress,
    /// Host call failed.
    #[error(transparent)]
    Host(#[from] HostError),
    /// Workbook serialization failed.
    #[error(transparent)]
    Xlsx(#[from] XlsxWriteError),
    /// Artifact file name would resolve outside the output directory.
    #[error("Refusing to save {0:?}: not a plain file name.")]
    InvalidFileName(String),
    /// Artifact could not be written to the output directory.
    #[error("Failed to save {path}: {source}")]
    Save {
        /// Target path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn descriptor_dispatches_on_filter_type_tag() {
        let l_filters: Vec<SpecFilterDescriptor> = serde_json::from_value(json!([
            {"fieldName": "Region", "filterType": "categorical",
             "appliedValues": [{"value": "West"}, {"value": 3, "formattedValue": "Three"}]},
            {"fieldName": "Sales", "filterType": "range",
             "minValue": {"formattedValue": "$1"}, "maxValue": null},
            {"fieldName": "Order Date", "filterType": "relative-date",
             "periodType": "months", "rangeN": 3, "rangeType": "lastn"},
            {"fieldName": "Geo", "filterType": "hierarchical", "isAllSelected": false},
            {"fieldName": "Mystery", "filterType": "spatial"},
            {"fieldName": "Untagged"}
        ]))
        .unwrap();

        assert!(matches!(
            &l_filters[0].kind,
            EnumFilterKind::Categorical { applied_values } if applied_values.len() == 2
        ));
        assert_eq!(
            l_filters[1].kind,
            EnumFilterKind::Range {
                min_value: Some(SpecRangeBound {
                    formatted_value: Some("$1".to_string())
                }),
                max_value: None,
            }
        );
        assert!(matches!(l_filters[2].kind, EnumFilterKind::RelativeDate { .. }));
        assert_eq!(l_filters[3].kind, EnumFilterKind::Hierarchical);
        assert_eq!(l_filters[3].is_all_selected, Some(false));
        assert_eq!(l_filters[4].kind, EnumFilterKind::Unknown("spatial".to_string()));
        assert_eq!(l_filters[5].kind, EnumFilterKind::Unknown(String::new()));
    }

    #[test]
    fn status_view_messages_follow_error_class() {
        assert_eq!(
            SpecStatusView::from_error(&ExportError::WorksheetNotFound("Sales".to_string()))
                .error_msg,
            "Worksheet \"Sales\" not found."
        );
        assert_eq!(
            SpecStatusView::from_error(&ExportError::EmptyResult).error_msg,
            "No data to export for the selected worksheet with current filters."
        );
        let view = SpecStatusView::from_error(&ExportError::Host(HostError::WorksheetMissing(
            "Map".to_string(),
        )));
        assert_eq!(
            view.error_msg,
            "An error occurred during export: Worksheet \"Map\" is not part of the dashboard."
        );
        assert!(!view.if_show_loading);
        assert!(SpecStatusView::loading().if_show_loading);
        assert_eq!(SpecStatusView::idle().error_msg, "");
    }
}
