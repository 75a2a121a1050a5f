//! `filtersnap_export` v1:
//! Filter snapshot export core.
//!
//! Modules:
//! - `conf`     : labels, separators, environment keys
//! - `spec`     : filter/summary-data models, artifacts, errors
//! - `util`     : collation, file-name, JSON scalar and locale helpers
//! - `filter`   : filter normalization and live display rendering
//! - `assemble` : workbook section assembly
//! - `host`     : dashboard platform seam and JSON snapshot host
//! - `export`   : export pipeline and artifact saving
pub mod assemble;
pub mod conf;
pub mod export;
pub mod filter;
pub mod host;
pub mod spec;
pub mod util;

pub use assemble::{
    assemble_export_sections, derive_data_table, derive_filter_section, derive_metadata_section,
};
pub use export::{
    ExportContext, ExportSession, derive_export_file_name, export_worksheet, save_artifact,
};
pub use filter::{
    derive_filter_summaries, derive_filter_values, format_filter_summary_line,
    render_filter_display,
};
pub use host::{
    FilterChangedListener, HostDashboard, SnapshotHost, SpecDashboardSnapshot,
    SpecWorksheetSnapshot, SubscriptionHandle, find_worksheet_by_name,
};
pub use spec::{
    EnumFilterKind, ExportError, HostError, SpecCategoricalValue, SpecExportArtifact,
    SpecFilterDescriptor, SpecFilterSummary, SpecRangeBound, SpecStatusView, SpecSummaryCell,
    SpecSummaryColumn, SpecSummaryData,
};
pub use util::{
    compare_collated, derive_extraction_time_pattern, format_extraction_time,
    resolve_locale_from_env, sanitize_file_name_stem,
};
