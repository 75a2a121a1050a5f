//! Filter normalization: platform filter descriptors to display summaries.

use crate::conf::{
    C_LABEL_ALL_SELECTED, C_PREFIX_PERIOD, C_PREFIX_RANGE_N, C_PREFIX_RANGE_TYPE, C_SEP_FILTER_NAME,
    C_SEP_FILTER_VALUES, C_SEP_RANGE,
};
use crate::spec::{
    EnumFilterKind, SpecCategoricalValue, SpecFilterDescriptor, SpecFilterSummary, SpecRangeBound,
};
use crate::util::{compare_collated, derive_json_scalar_text, sort_collated};

/// Summarize every filter, sorted by name.
///
/// Filters of unknown kind are kept with an empty value list.
pub fn derive_filter_summaries(filters: &[SpecFilterDescriptor]) -> Vec<SpecFilterSummary> {
    let mut l_summaries: Vec<SpecFilterSummary> = filters
        .iter()
        .map(|filter| SpecFilterSummary {
            name: filter.field_name.clone(),
            values: derive_filter_values(filter),
        })
        .collect();
    l_summaries.sort_by(|a, b| compare_collated(&a.name, &b.name));
    l_summaries
}

/// Display values of one filter.
pub fn derive_filter_values(filter: &SpecFilterDescriptor) -> Vec<String> {
    if filter.is_all_selected == Some(true) {
        return vec![C_LABEL_ALL_SELECTED.to_string()];
    }

    match &filter.kind {
        EnumFilterKind::Categorical { applied_values } => {
            let mut l_values: Vec<String> = applied_values
                .iter()
                .map(derive_categorical_label)
                .collect();
            sort_collated(&mut l_values);
            l_values
        }
        EnumFilterKind::Range {
            min_value,
            max_value,
        } => vec![derive_range_label(min_value.as_ref(), max_value.as_ref())],
        EnumFilterKind::RelativeDate {
            period_type,
            range_n,
            range_type,
        } => vec![
            format!(
                "{C_PREFIX_PERIOD}{}",
                period_type.as_deref().unwrap_or_default()
            ),
            format!(
                "{C_PREFIX_RANGE_N}{}",
                range_n
                    .as_ref()
                    .map(derive_json_scalar_text)
                    .unwrap_or_default()
            ),
            format!(
                "{C_PREFIX_RANGE_TYPE}{}",
                range_type.as_deref().unwrap_or_default()
            ),
        ],
        EnumFilterKind::Hierarchical | EnumFilterKind::Unknown(_) => vec![],
    }
}

fn derive_categorical_label(value: &SpecCategoricalValue) -> String {
    match value.formatted_value.as_deref() {
        Some(c_label) if !c_label.is_empty() => c_label.to_string(),
        _ => derive_json_scalar_text(&value.value),
    }
}

fn derive_range_label(
    min_value: Option<&SpecRangeBound>,
    max_value: Option<&SpecRangeBound>,
) -> String {
    let c_min = min_value
        .and_then(|bound| bound.formatted_value.as_deref())
        .unwrap_or_default();
    let c_max = max_value
        .and_then(|bound| bound.formatted_value.as_deref())
        .unwrap_or_default();
    let c_sep = if min_value.is_some() && max_value.is_some() {
        C_SEP_RANGE
    } else {
        ""
    };
    format!("{c_min}{c_sep}{c_max}")
}

/// One display line: `name → v1, v2`.
pub fn format_filter_summary_line(summary: &SpecFilterSummary) -> String {
    format!(
        "{}{C_SEP_FILTER_NAME}{}",
        summary.name,
        summary.values.join(C_SEP_FILTER_VALUES)
    )
}

/// Live filter display: one summary per line.
pub fn render_filter_display(summaries: &[SpecFilterSummary]) -> String {
    summaries
        .iter()
        .map(format_filter_summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}
