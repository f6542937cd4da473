//! In-memory record store.
//!
//! The store is the only mutable state of the running service. It is created
//! once from the loader output and afterwards only grows through
//! [`RecordStore::append`]. Reads and appends are serialized through an
//! [`RwLock`], so a reader sees either none or all of a batch.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sensor_core::error::Result;
use sensor_core::models::SensorRecord;
use sensor_core::settings::LoaderConfig;
use sensor_data::loader::load_sensor_records;
use serde::Serialize;

// ── Public types ──────────────────────────────────────────────────────────────

/// Observable lifecycle of a [`RecordStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    /// Holds exactly the loader output.
    Initialized,
    /// At least one append has been applied.
    Appended,
}

/// Outcome of a successful [`RecordStore::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppendReport {
    /// Records added by this call.
    pub appended: usize,
    /// Collection size after the call.
    pub total: usize,
}

#[derive(Debug)]
struct Inner {
    records: Vec<SensorRecord>,
    state: StoreState,
}

// ── RecordStore ───────────────────────────────────────────────────────────────

/// Ordered, append-only collection of [`SensorRecord`]s.
///
/// Duplicates are allowed; insertion order is preserved.
#[derive(Debug)]
pub struct RecordStore {
    inner: RwLock<Inner>,
}

impl RecordStore {
    /// Create a store seeded with `records`.
    pub fn new(records: Vec<SensorRecord>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                records,
                state: StoreState::Initialized,
            }),
        }
    }

    /// Run the source loader and seed a store with its output.
    pub fn from_source(config: &LoaderConfig) -> Result<Self> {
        let records = load_sensor_records(config)?;
        Ok(Self::new(records))
    }

    /// Snapshot of the full collection, in insertion order.
    pub fn get_all(&self) -> Vec<SensorRecord> {
        self.read().records.clone()
    }

    /// Append already-validated records to the end of the collection.
    ///
    /// Purely additive: no deduplication and no date-window or threshold
    /// checks. The batch is applied under a single write lock.
    pub fn append(&self, records: Vec<SensorRecord>) -> AppendReport {
        let mut inner = self.write();
        let appended = records.len();
        inner.records.extend(records);
        inner.state = StoreState::Appended;
        let total = inner.records.len();
        drop(inner);

        tracing::info!(appended, total, "sensor records appended");
        AppendReport { appended, total }
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    pub fn state(&self) -> StoreState {
        self.read().state
    }

    // ── Private helpers ───────────────────────────────────────────────────

    // A panic while holding the lock cannot leave a half-extended Vec
    // visible, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use sensor_core::filters::{DateWindow, ValueThresholds};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn record(sensor: &str, value: f64) -> SensorRecord {
        SensorRecord {
            date: NaiveDate::from_ymd_opt(2018, 4, 5).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            sensor: sensor.to_string(),
            measurement: value,
            status: "NORMAL".to_string(),
        }
    }

    #[test]
    fn test_new_store_is_initialized() {
        let store = RecordStore::new(vec![record("sensor_07", 25.0)]);
        assert_eq!(store.state(), StoreState::Initialized);
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_default_store_is_empty() {
        let store = RecordStore::default();
        assert!(store.is_empty());
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn test_get_all_is_idempotent() {
        let store = RecordStore::new(vec![record("sensor_07", 25.0), record("sensor_47", 22.0)]);
        let first = store.get_all();
        let second = store.get_all();
        assert_eq!(first, second);
        assert_eq!(store.state(), StoreState::Initialized);
    }

    #[test]
    fn test_append_extends_in_order() {
        let initial = vec![record("sensor_07", 25.0)];
        let store = RecordStore::new(initial.clone());

        let batch = vec![record("sensor_47", 21.0), record("sensor_07", 29.0)];
        let report = store.append(batch.clone());

        assert_eq!(report, AppendReport { appended: 2, total: 3 });
        let all = store.get_all();
        assert_eq!(all[..1], initial[..]);
        assert_eq!(all[1..], batch[..]);
        assert_eq!(store.state(), StoreState::Appended);
    }

    #[test]
    fn test_append_keeps_duplicates_and_skips_load_rules() {
        let store = RecordStore::new(vec![record("sensor_07", 25.0)]);
        store.append(vec![record("sensor_07", 25.0), record("other", 500.0)]);
        let all = store.get_all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], all[1]);
        assert_eq!(all[2].measurement, 500.0);
    }

    #[test]
    fn test_empty_append_moves_to_appended() {
        let store = RecordStore::default();
        let report = store.append(Vec::new());
        assert_eq!(report, AppendReport { appended: 0, total: 0 });
        assert_eq!(store.state(), StoreState::Appended);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(RecordStore::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..50 {
                        store.append(vec![record(&format!("s{i}"), 1.0), record("x", 2.0)]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let all = store.get_all();
        assert_eq!(all.len(), 8 * 50 * 2);
        // Each batch lands contiguously.
        for pair in all.chunks(2) {
            assert!(pair[0].sensor.starts_with('s'));
            assert_eq!(pair[1].sensor, "x");
        }
    }

    #[test]
    fn test_from_source_seeds_loader_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sensor.csv");
        std::fs::write(
            &path,
            "timestamp,sensor_07,machine_status\n\
             2018-04-05 10:00:00,25.0,NORMAL\n\
             2018-05-05 10:00:00,25.0,NORMAL\n",
        )
        .unwrap();
        let config = LoaderConfig::new(
            &path,
            DateWindow::new(
                NaiveDate::from_ymd_opt(2018, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2018, 4, 30).unwrap(),
            )
            .unwrap(),
            ValueThresholds::new(20.0, 30.0).unwrap(),
            vec!["sensor_07".to_string()],
        )
        .unwrap();

        let store = RecordStore::from_source(&config).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_all()[0], record("sensor_07", 25.0));
    }

    #[test]
    fn test_from_source_propagates_load_error() {
        let dir = TempDir::new().unwrap();
        let config = LoaderConfig::new(
            dir.path().join("missing.csv"),
            DateWindow::new(
                NaiveDate::from_ymd_opt(2018, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2018, 4, 30).unwrap(),
            )
            .unwrap(),
            ValueThresholds::new(20.0, 30.0).unwrap(),
            vec!["sensor_07".to_string()],
        )
        .unwrap();

        let err = RecordStore::from_source(&config).unwrap_err();
        assert!(err.is_load_error());
    }
}
