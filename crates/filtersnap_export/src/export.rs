//! Export pipeline: host reads, normalization, assembly, serialization, save.

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, FixedOffset, Local, Locale};
use filtersnap_xlsx::{C_XLSX_MIME_TYPE, SpecXlsxWriteOptions, XlsxWriter};
use tracing::{debug, info};

use crate::assemble::assemble_export_sections;
use crate::conf::C_FILE_NAME_SUFFIX;
use crate::filter::derive_filter_summaries;
use crate::host::{HostDashboard, find_worksheet_by_name};
use crate::spec::{ExportError, SpecExportArtifact};
use crate::util::{
    format_extraction_time, resolve_locale_from_env, sanitize_file_name_stem,
};

/// Everything one export run needs from its surroundings.
pub struct ExportContext<'a> {
    /// Dashboard platform handle.
    pub host: &'a dyn HostDashboard,
    /// Locale used for the extraction timestamp.
    pub locale: Locale,
    /// Pinned extraction time; the local clock is read when `None`.
    pub at_fixed: Option<DateTime<FixedOffset>>,
    /// Workbook layout options.
    pub write_options: SpecXlsxWriteOptions,
}

impl<'a> ExportContext<'a> {
    /// Context with the environment locale, the local clock and default layout.
    pub fn new(host: &'a dyn HostDashboard) -> Self {
        Self {
            host,
            locale: resolve_locale_from_env(),
            at_fixed: None,
            write_options: SpecXlsxWriteOptions::default(),
        }
    }

    /// Override the timestamp locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Pin the extraction time.
    pub fn with_fixed_time(mut self, at: DateTime<FixedOffset>) -> Self {
        self.at_fixed = Some(at);
        self
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.at_fixed
            .unwrap_or_else(|| Local::now().fixed_offset())
    }
}

/// Download file name for a worksheet export; always a single path component.
pub fn derive_export_file_name(worksheet_name: &str) -> String {
    format!(
        "{}{C_FILE_NAME_SUFFIX}",
        sanitize_file_name_stem(worksheet_name)
    )
}

/// Run one export for `worksheet_name` without concurrency guarding.
pub fn export_worksheet(
    ctx: &ExportContext<'_>,
    worksheet_name: &str,
) -> Result<SpecExportArtifact, ExportError> {
    let worksheet = find_worksheet_by_name(ctx.host, worksheet_name)
        .ok_or_else(|| ExportError::WorksheetNotFound(worksheet_name.to_string()))?;

    let l_filters = ctx.host.get_filters()?;
    let summary_data = ctx.host.get_summary_data(&worksheet)?;
    debug!(
        worksheet = %worksheet,
        filters = l_filters.len(),
        rows = summary_data.data.len(),
        "fetched export inputs"
    );

    let l_summaries = derive_filter_summaries(&l_filters);
    let extraction_time = format_extraction_time(&ctx.now(), ctx.locale);
    let l_sections = assemble_export_sections(&l_summaries, &summary_data, &extraction_time)
        .ok_or(ExportError::EmptyResult)?;

    let mut writer = XlsxWriter::new(&worksheet, ctx.write_options.clone())?;
    writer.write_sections(&l_sections)?;
    let v_bytes = writer.save_to_buffer()?;

    let artifact = SpecExportArtifact {
        file_name: derive_export_file_name(&worksheet),
        mime_type: C_XLSX_MIME_TYPE.to_string(),
        v_bytes,
        report: writer.report(),
    };
    info!(
        file = %artifact.file_name,
        bytes = artifact.v_bytes.len(),
        rows = summary_data.data.len(),
        "export ready"
    );
    Ok(artifact)
}

/// Export entry point that refuses overlapping runs.
#[derive(Debug, Default)]
pub struct ExportSession {
    if_in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportSession {
    /// Fresh idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is currently active.
    pub fn is_in_flight(&self) -> bool {
        self.if_in_flight.load(Ordering::Acquire)
    }

    /// Run one export; fails with [`ExportError::ExportInProgress`] while another
    /// run on this session is active.
    pub fn run(
        &self,
        ctx: &ExportContext<'_>,
        worksheet_name: &str,
    ) -> Result<SpecExportArtifact, ExportError> {
        let _guard = self.try_begin()?;
        export_worksheet(ctx, worksheet_name)
    }

    fn try_begin(&self) -> Result<InFlightGuard<'_>, ExportError> {
        self.if_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::ExportInProgress)?;
        Ok(InFlightGuard(&self.if_in_flight))
    }
}

/// Write the artifact to `dir_out/<file_name>` via a temp file in the same directory.
pub fn save_artifact(artifact: &SpecExportArtifact, dir_out: &Path) -> Result<PathBuf, ExportError> {
    let path_out = dir_out.join(&artifact.file_name);
    if path_out.parent() != Some(dir_out)
        || Path::new(&artifact.file_name).file_name() != Some(OsStr::new(&artifact.file_name))
    {
        return Err(ExportError::InvalidFileName(artifact.file_name.clone()));
    }
    let map_save_err = |source: std::io::Error| ExportError::Save {
        path: path_out.clone(),
        source,
    };

    let mut file_tmp = tempfile::NamedTempFile::new_in(dir_out).map_err(map_save_err)?;
    file_tmp.write_all(&artifact.v_bytes).map_err(map_save_err)?;
    file_tmp
        .persist(&path_out)
        .map_err(|err| map_save_err(err.error))?;
    debug!(path = %path_out.display(), "artifact saved");
    Ok(path_out)
}
