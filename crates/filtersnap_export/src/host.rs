//! Host dashboard seam and the JSON snapshot host.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use tracing::debug;

use crate::spec::{HostError, SpecFilterDescriptor, SpecSummaryData};

/// Callback fired on every filter change.
pub type FilterChangedListener = Arc<dyn Fn() + Send + Sync>;

/// Dashboard platform handle, passed explicitly to every operation.
pub trait HostDashboard: Send + Sync {
    /// Dashboard display name.
    fn dashboard_name(&self) -> String;

    /// Worksheet names in dashboard order.
    fn worksheet_names(&self) -> Vec<String>;

    /// Filters currently applied on the dashboard.
    fn get_filters(&self) -> Result<Vec<SpecFilterDescriptor>, HostError>;

    /// Summary data currently displayed by `worksheet`.
    fn get_summary_data(&self, worksheet: &str) -> Result<SpecSummaryData, HostError>;

    /// Register `listener` for filter changes affecting `worksheet`.
    fn subscribe_filter_changed(
        &self,
        worksheet: &str,
        listener: FilterChangedListener,
    ) -> Result<SubscriptionHandle, HostError>;
}

/// Resolve a worksheet by exact name.
pub fn find_worksheet_by_name(host: &dyn HostDashboard, name: &str) -> Option<String> {
    host.worksheet_names()
        .into_iter()
        .find(|c_name| c_name == name)
}

/// Active subscription; unsubscribes on [`Self::cancel`] or drop.
pub struct SubscriptionHandle {
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    /// Wrap the host-specific unsubscribe action.
    pub fn new(on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// Stop receiving events.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region SnapshotHost

/// Worksheet entry of a dashboard snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecWorksheetSnapshot {
    /// Worksheet name.
    pub name: String,
    /// Summary data displayed by the worksheet.
    #[serde(default)]
    pub summary_data: SpecSummaryData,
}

/// Serialized dashboard state.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecDashboardSnapshot {
    /// Dashboard name.
    #[serde(default)]
    pub dashboard: String,
    /// Worksheets in dashboard order.
    #[serde(default)]
    pub worksheets: Vec<SpecWorksheetSnapshot>,
    /// Dashboard-level filters.
    #[serde(default)]
    pub filters: Vec<SpecFilterDescriptor>,
}

#[derive(Default)]
struct ListenerRegistry {
    n_id_next: u64,
    dict_listeners: BTreeMap<u64, (String, FilterChangedListener)>,
}

/// Host backed by a JSON dashboard snapshot held in memory.
pub struct SnapshotHost {
    state: RwLock<SpecDashboardSnapshot>,
    listeners: Arc<Mutex<ListenerRegistry>>,
}

impl SnapshotHost {
    /// Build from an already parsed snapshot.
    pub fn new(snapshot: SpecDashboardSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
        }
    }

    /// Parse a snapshot document.
    pub fn from_json_str(text: &str) -> Result<Self, HostError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    /// Read and parse a snapshot file.
    pub fn from_path(path: &Path) -> Result<Self, HostError> {
        Ok(Self::new(read_snapshot(path)?))
    }

    /// Swap the dashboard filters and notify listeners.
    pub fn replace_filters(&self, filters: Vec<SpecFilterDescriptor>) {
        self.state.write().filters = filters;
        self.notify_filter_changed();
    }

    /// Re-read the snapshot file; listeners fire only when the filters differ.
    ///
    /// Returns whether the filters changed.
    pub fn reload_from_path(&self, path: &Path) -> Result<bool, HostError> {
        let snapshot = read_snapshot(path)?;
        let if_filters_changed = {
            let mut state = self.state.write();
            let if_changed = state.filters != snapshot.filters;
            *state = snapshot;
            if_changed
        };
        if if_filters_changed {
            self.notify_filter_changed();
        }
        Ok(if_filters_changed)
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().dict_listeners.len()
    }

    fn notify_filter_changed(&self) {
        let l_listeners: Vec<FilterChangedListener> = {
            let state = self.state.read();
            self.listeners
                .lock()
                .dict_listeners
                .values()
                .filter(|(c_sheet, _)| state.worksheets.iter().any(|ws| &ws.name == c_sheet))
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };
        debug!(listeners = l_listeners.len(), "filter change");
        // Called without holding locks so listeners may query the host.
        for listener in l_listeners {
            listener();
        }
    }

    fn find_worksheet(&self, worksheet: &str) -> Result<SpecWorksheetSnapshot, HostError> {
        self.state
            .read()
            .worksheets
            .iter()
            .find(|ws| ws.name == worksheet)
            .cloned()
            .ok_or_else(|| HostError::WorksheetMissing(worksheet.to_string()))
    }
}

impl HostDashboard for SnapshotHost {
    fn dashboard_name(&self) -> String {
        self.state.read().dashboard.clone()
    }

    fn worksheet_names(&self) -> Vec<String> {
        self.state
            .read()
            .worksheets
            .iter()
            .map(|ws| ws.name.clone())
            .collect()
    }

    fn get_filters(&self) -> Result<Vec<SpecFilterDescriptor>, HostError> {
        Ok(self.state.read().filters.clone())
    }

    fn get_summary_data(&self, worksheet: &str) -> Result<SpecSummaryData, HostError> {
        Ok(self.find_worksheet(worksheet)?.summary_data)
    }

    fn subscribe_filter_changed(
        &self,
        worksheet: &str,
        listener: FilterChangedListener,
    ) -> Result<SubscriptionHandle, HostError> {
        self.find_worksheet(worksheet)?;

        let n_id = {
            let mut registry = self.listeners.lock();
            let n_id = registry.n_id_next;
            registry.n_id_next += 1;
            registry
                .dict_listeners
                .insert(n_id, (worksheet.to_string(), listener));
            n_id
        };

        let listeners_weak: Weak<Mutex<ListenerRegistry>> = Arc::downgrade(&self.listeners);
        Ok(SubscriptionHandle::new(move || {
            if let Some(listeners) = listeners_weak.upgrade() {
                listeners.lock().dict_listeners.remove(&n_id);
            }
        }))
    }
}

fn read_snapshot(path: &Path) -> Result<SpecDashboardSnapshot, HostError> {
    let text = std::fs::read_to_string(path).map_err(|source| HostError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    fn derive_sample_host() -> SnapshotHost {
        SnapshotHost::from_json_str(
            &json!({
                "dashboard": "Overview",
                "worksheets": [
                    {"name": "Sales", "summaryData": {
                        "columns": [{"fieldName": "Sales"}],
                        "data": [[{"value": 100}]]
                    }},
                    {"name": "Map"}
                ],
                "filters": [
                    {"fieldName": "Region", "filterType": "categorical",
                     "appliedValues": [{"value": "West"}]}
                ]
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn snapshot_host_exposes_dashboard_state() {
        let host = derive_sample_host();
        assert_eq!(host.dashboard_name(), "Overview");
        assert_eq!(host.worksheet_names(), vec!["Sales", "Map"]);
        assert_eq!(host.get_filters().unwrap().len(), 1);
        assert_eq!(host.get_summary_data("Sales").unwrap().data.len(), 1);
        assert!(host.get_summary_data("Map").unwrap().data.is_empty());
        assert!(matches!(
            host.get_summary_data("Nope"),
            Err(HostError::WorksheetMissing(_))
        ));

        assert_eq!(find_worksheet_by_name(&host, "Map").as_deref(), Some("Map"));
        assert_eq!(find_worksheet_by_name(&host, "map"), None);
    }

    #[test]
    fn listeners_fire_until_cancelled() {
        let host = derive_sample_host();
        let n_calls = Arc::new(AtomicUsize::new(0));
        let n_calls_listener = Arc::clone(&n_calls);

        let handle = host
            .subscribe_filter_changed(
                "Sales",
                Arc::new(move || {
                    n_calls_listener.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        assert_eq!(host.listener_count(), 1);

        host.replace_filters(vec![]);
        assert_eq!(n_calls.load(Ordering::SeqCst), 1);

        handle.cancel();
        assert_eq!(host.listener_count(), 0);
        host.replace_filters(vec![]);
        assert_eq!(n_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_handle_unsubscribes() {
        let host = derive_sample_host();
        {
            let _handle = host
                .subscribe_filter_changed("Map", Arc::new(|| {}))
                .unwrap();
            assert_eq!(host.listener_count(), 1);
        }
        assert_eq!(host.listener_count(), 0);
        assert!(host.subscribe_filter_changed("Nope", Arc::new(|| {})).is_err());
    }

    #[test]
    fn reload_fires_only_on_filter_change() {
        let dir = tempfile::tempdir().unwrap();
        let path_snapshot = dir.path().join("dashboard.json");
        let host = derive_sample_host();

        let n_calls = Arc::new(AtomicUsize::new(0));
        let n_calls_listener = Arc::clone(&n_calls);
        let _handle = host
            .subscribe_filter_changed(
                "Sales",
                Arc::new(move || {
                    n_calls_listener.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        let value_same = json!({
            "dashboard": "Overview",
            "worksheets": [{"name": "Sales"}],
            "filters": [{"fieldName": "Region", "filterType": "categorical",
                         "appliedValues": [{"value": "West"}]}]
        });
        std::fs::write(&path_snapshot, value_same.to_string()).unwrap();
        assert!(!host.reload_from_path(&path_snapshot).unwrap());
        assert_eq!(n_calls.load(Ordering::SeqCst), 0);

        let value_changed = json!({
            "dashboard": "Overview",
            "worksheets": [{"name": "Sales"}],
            "filters": [{"fieldName": "Region", "filterType": "categorical",
                         "isAllSelected": true}]
        });
        std::fs::write(&path_snapshot, value_changed.to_string()).unwrap();
        assert!(host.reload_from_path(&path_snapshot).unwrap());
        assert_eq!(n_calls.load(Ordering::SeqCst), 1);

        assert!(matches!(
            host.reload_from_path(&dir.path().join("missing.json")),
            Err(HostError::Read { .. })
        ));
    }
}
