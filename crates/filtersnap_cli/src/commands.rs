//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use anyhow::{Context, bail};
use filtersnap_endpoint::EndpointClient;
use filtersnap_export::{
    ExportContext, ExportSession, HostDashboard, SnapshotHost, SpecStatusView,
    SubscriptionHandle, derive_filter_summaries, render_filter_display, save_artifact,
};
use tracing::{debug, error, info, warn};

/// Options of the `filters` subcommand.
#[derive(Debug, Clone, Default)]
pub struct SpecFiltersOptions {
    pub if_json: bool,
    pub if_watch: bool,
    pub worksheet: Option<String>,
    pub interval_ms: u64,
}

fn load_host(path_snapshot: &Path) -> anyhow::Result<SnapshotHost> {
    SnapshotHost::from_path(path_snapshot)
        .with_context(|| format!("cannot load dashboard snapshot {}", path_snapshot.display()))
}

/// Worksheet picked when the user names none: the picker's first entry.
pub fn resolve_worksheet_name(
    host: &dyn HostDashboard,
    worksheet: Option<&str>,
) -> anyhow::Result<String> {
    if let Some(c_name) = worksheet {
        return Ok(c_name.to_string());
    }
    match host.worksheet_names().into_iter().next() {
        Some(c_name) => Ok(c_name),
        None => bail!("dashboard {:?} has no worksheets", host.dashboard_name()),
    }
}

pub fn run_worksheets(path_snapshot: &Path) -> anyhow::Result<ExitCode> {
    let host = load_host(path_snapshot)?;
    for c_name in host.worksheet_names() {
        println!("{c_name}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Render the filter display for the host's current filters.
pub fn render_filters(host: &dyn HostDashboard, if_json: bool) -> anyhow::Result<String> {
    let l_summaries = derive_filter_summaries(&host.get_filters()?);
    if if_json {
        return Ok(serde_json::to_string_pretty(&l_summaries)?);
    }
    Ok(render_filter_display(&l_summaries))
}

pub fn run_filters(path_snapshot: &Path, options: &SpecFiltersOptions) -> anyhow::Result<ExitCode> {
    let host = Arc::new(load_host(path_snapshot)?);
    println!("{}", render_filters(host.as_ref(), options.if_json)?);
    if !options.if_watch {
        return Ok(ExitCode::SUCCESS);
    }

    let worksheet = resolve_worksheet_name(host.as_ref(), options.worksheet.as_deref())?;
    let _subscription =
        subscribe_filter_display(&host, &worksheet, options.if_json, |c_display| {
            println!("{c_display}")
        })?;
    info!(worksheet = %worksheet, path = %path_snapshot.display(), "watching filters");

    watch_snapshot(
        host.as_ref(),
        path_snapshot,
        Duration::from_millis(options.interval_ms.max(1)),
        None,
    );
    Ok(ExitCode::SUCCESS)
}

/// Re-render the filter display through `on_render` on every filter change of `worksheet`.
///
/// The listener holds a weak host handle so the subscription never keeps the host alive.
pub fn subscribe_filter_display(
    host: &Arc<SnapshotHost>,
    worksheet: &str,
    if_json: bool,
    on_render: impl Fn(String) + Send + Sync + 'static,
) -> anyhow::Result<SubscriptionHandle> {
    let host_weak: Weak<SnapshotHost> = Arc::downgrade(host);
    let subscription = host.subscribe_filter_changed(
        worksheet,
        Arc::new(move || {
            let Some(host) = host_weak.upgrade() else {
                return;
            };
            match render_filters(host.as_ref(), if_json) {
                Ok(c_display) => on_render(c_display),
                Err(err) => error!("{err:#}"),
            }
        }),
    )?;
    Ok(subscription)
}

/// Modification stamp of the snapshot file; length catches rewrites within one mtime tick.
fn read_file_stamp(path: &Path) -> Option<(SystemTime, u64)> {
    let meta = std::fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

/// Poll `path_snapshot` every `interval` and reload it into `host` when it changes.
///
/// Runs forever when `n_polls_max` is `None`. Returns the number of reloads that
/// changed the filters.
pub fn watch_snapshot(
    host: &SnapshotHost,
    path_snapshot: &Path,
    interval: Duration,
    n_polls_max: Option<usize>,
) -> usize {
    let mut stamp_last = read_file_stamp(path_snapshot);
    let mut n_polls = 0;
    let mut n_changes = 0;
    while n_polls_max.is_none_or(|n_max| n_polls < n_max) {
        std::thread::sleep(interval);
        n_polls += 1;

        let stamp = read_file_stamp(path_snapshot);
        if stamp == stamp_last {
            continue;
        }
        stamp_last = stamp;
        match host.reload_from_path(path_snapshot) {
            Ok(if_changed) => {
                debug!(if_changed, "snapshot reloaded");
                if if_changed {
                    n_changes += 1;
                }
            }
            Err(err) => warn!("{err}"),
        }
    }
    n_changes
}

pub fn run_export(
    path_snapshot: &Path,
    worksheet: Option<&str>,
    dir_out: &Path,
) -> anyhow::Result<ExitCode> {
    let host = load_host(path_snapshot)?;
    let worksheet = resolve_worksheet_name(&host, worksheet)?;
    let ctx = ExportContext::new(&host);
    let session = ExportSession::new();

    report_status(&SpecStatusView::loading());
    match export_to_dir(&session, &ctx, &worksheet, dir_out) {
        Ok(path_out) => {
            report_status(&SpecStatusView::idle());
            println!("{}", path_out.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(%err, "Error exporting data");
            report_status(&SpecStatusView::from_error(&err));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn export_to_dir(
    session: &ExportSession,
    ctx: &ExportContext<'_>,
    worksheet: &str,
    dir_out: &Path,
) -> Result<PathBuf, filtersnap_export::ExportError> {
    let artifact = session.run(ctx, worksheet)?;
    save_artifact(&artifact, dir_out)
}

fn report_status(view: &SpecStatusView) {
    if view.if_show_loading {
        eprintln!("Exporting...");
    }
    if !view.error_msg.is_empty() {
        eprintln!("{}", view.error_msg);
    }
}

pub fn run_endpoint_get(url: &str) -> anyhow::Result<ExitCode> {
    if let Some(data) = EndpointClient::new(url).fetch_filter_data() {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_endpoint_post(url: &str, path_body: &Path) -> anyhow::Result<ExitCode> {
    let text = std::fs::read_to_string(path_body)
        .with_context(|| format!("cannot read {}", path_body.display()))?;
    let data: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path_body.display()))?;
    EndpointClient::new(url).post_filter_data(&data);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const C_SNAPSHOT: &str = r#"{
        "dashboard": "Overview",
        "worksheets": [
            {"name": "Sales", "summaryData": {
                "columns": [{"fieldName": "Sales"}],
                "data": [[{"value": 100}]]
            }},
            {"name": "Empty"}
        ],
        "filters": [
            {"fieldName": "Region", "filterType": "categorical",
             "appliedValues": [{"value": "West"}, {"value": "East"}]}
        ]
    }"#;

    fn write_snapshot(dir: &Path) -> PathBuf {
        let path_snapshot = dir.join("dashboard.json");
        std::fs::write(&path_snapshot, C_SNAPSHOT).unwrap();
        path_snapshot
    }

    #[test]
    fn worksheet_defaults_to_first_picker_entry() {
        let host = SnapshotHost::from_json_str(C_SNAPSHOT).unwrap();
        assert_eq!(resolve_worksheet_name(&host, None).unwrap(), "Sales");
        assert_eq!(resolve_worksheet_name(&host, Some("Empty")).unwrap(), "Empty");

        let host_bare = SnapshotHost::from_json_str(r#"{"dashboard": "Bare"}"#).unwrap();
        assert!(resolve_worksheet_name(&host_bare, None).is_err());
    }

    #[test]
    fn filters_render_as_text_or_json() {
        let host = SnapshotHost::from_json_str(C_SNAPSHOT).unwrap();
        assert_eq!(render_filters(&host, false).unwrap(), "Region → East, West");

        let value: serde_json::Value =
            serde_json::from_str(&render_filters(&host, true).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"name": "Region", "values": ["East", "West"]}])
        );
    }

    #[test]
    fn watch_reloads_changed_snapshot_and_rerenders() {
        let dir = tempfile::tempdir().unwrap();
        let path_snapshot = write_snapshot(dir.path());
        let host = Arc::new(SnapshotHost::from_path(&path_snapshot).unwrap());

        let l_renders = Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
        let l_renders_listener = Arc::clone(&l_renders);
        let _subscription = subscribe_filter_display(&host, "Sales", false, move |c_display| {
            l_renders_listener.lock().push(c_display);
        })
        .unwrap();

        let path_writer = path_snapshot.clone();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            let c_changed = C_SNAPSHOT.replace(
                r#""appliedValues": [{"value": "West"}, {"value": "East"}]"#,
                r#""isAllSelected": true"#,
            );
            let path_tmp = path_writer.with_extension("json.tmp");
            std::fs::write(&path_tmp, c_changed).unwrap();
            std::fs::rename(&path_tmp, &path_writer).unwrap();
        });

        let n_changes = watch_snapshot(
            host.as_ref(),
            &path_snapshot,
            Duration::from_millis(10),
            Some(100),
        );
        writer.join().unwrap();

        assert_eq!(n_changes, 1);
        assert_eq!(l_renders.lock().as_slice(), ["Region → All".to_string()]);
    }

    #[test]
    fn watch_without_changes_stops_after_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path_snapshot = write_snapshot(dir.path());
        let host = SnapshotHost::from_path(&path_snapshot).unwrap();

        assert_eq!(
            watch_snapshot(&host, &path_snapshot, Duration::from_millis(1), Some(3)),
            0
        );
    }

    #[test]
    fn export_writes_file_and_reports_failures_by_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path_snapshot = write_snapshot(dir.path());

        assert_eq!(
            run_export(&path_snapshot, Some("Sales"), dir.path()).unwrap(),
            ExitCode::SUCCESS
        );
        assert!(dir.path().join("Sales_filtered_data.xlsx").is_file());

        assert_eq!(
            run_export(&path_snapshot, Some("Empty"), dir.path()).unwrap(),
            ExitCode::FAILURE
        );
        assert!(!dir.path().join("Empty_filtered_data.xlsx").exists());

        assert!(run_export(&dir.path().join("missing.json"), None, dir.path()).is_err());
    }
}
