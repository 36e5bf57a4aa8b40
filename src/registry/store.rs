//! Snapshot store
//!
//! Holds the currently published [`Snapshot`] together with its refresh
//! metadata. Both live in one immutable [`Published`] value behind an
//! [`ArcSwap`], so publishing is a single pointer swap: readers never block,
//! and a reader sees either the old or the new snapshot for a whole call.

use crate::registry::record::RegistrationRecord;
use crate::registry::snapshot::Snapshot;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Refresh bookkeeping published alongside the snapshot
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StoreStatus {
    /// Number of records in the current snapshot
    pub records: usize,
    /// Time of the last successful refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    /// Time of the next scheduled refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_update: Option<DateTime<Utc>>,
    /// Time of the last refresh attempt, successful or not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
    /// Error message of the last attempt, cleared on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Lines skipped while building the current snapshot
    pub skipped_lines: usize,
    pub refresh_count: u64,
    pub failure_count: u64,
}

/// One published snapshot and its metadata
#[derive(Debug, Default)]
struct Published {
    snapshot: Arc<Snapshot>,
    status: StoreStatus,
}

/// Holder of the current snapshot
pub struct SnapshotStore {
    current: ArcSwap<Published>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Create a store serving an empty snapshot
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Published::default()),
        }
    }

    /// Look up one record by domain name (case-insensitive)
    pub fn get(&self, domain: &str) -> Option<RegistrationRecord> {
        self.current.load().snapshot.get(domain).cloned()
    }

    /// The full current snapshot
    pub fn get_all(&self) -> Arc<Snapshot> {
        self.current.load().snapshot.clone()
    }

    /// Current refresh metadata
    pub fn status(&self) -> StoreStatus {
        self.current.load().status.clone()
    }

    /// Replace the current snapshot.
    ///
    /// `skipped_lines` is the number of lines dropped while building it.
    pub fn publish(
        &self,
        snapshot: Snapshot,
        skipped_lines: usize,
        next_update: Option<DateTime<Utc>>,
    ) {
        let now = Utc::now();
        let last_update = snapshot.built_at().unwrap_or(now);
        let snapshot = Arc::new(snapshot);
        self.current.rcu(|old| Published {
            snapshot: snapshot.clone(),
            status: StoreStatus {
                records: snapshot.len(),
                last_update: Some(last_update),
                next_update,
                last_attempt: Some(now),
                last_error: None,
                skipped_lines,
                refresh_count: old.status.refresh_count + 1,
                failure_count: old.status.failure_count,
            },
        });
    }

    /// Record a failed refresh; the current snapshot stays in place
    pub fn record_failure(&self, error: &str, next_update: Option<DateTime<Utc>>) {
        let now = Utc::now();
        self.current.rcu(|old| {
            let mut status = old.status.clone();
            status.last_attempt = Some(now);
            status.last_error = Some(error.to_string());
            status.next_update = next_update;
            status.failure_count += 1;
            Published {
                snapshot: old.snapshot.clone(),
                status,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::snapshot::build_snapshot;
    use chrono::TimeZone;

    fn snapshot_at(rows: &str, ts: DateTime<Utc>) -> Snapshot {
        build_snapshot(&format!("header\n{}", rows), None, ts).snapshot
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = SnapshotStore::new();
        assert!(store.get_all().is_empty());
        assert!(store.get("LBL.GOV").is_none());

        let status = store.status();
        assert_eq!(status.records, 0);
        assert!(status.last_update.is_none());
        assert_eq!(status.refresh_count, 0);
    }

    #[test]
    fn test_publish_and_get() {
        let store = SnapshotStore::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let next = ts + chrono::Duration::days(14);
        store.publish(
            snapshot_at("LBL.GOV,Federal,DOE,LBNL,Berkeley,CA", ts),
            2,
            Some(next),
        );

        assert_eq!(store.get("lbl.gov"), store.get("LBL.GOV"));
        assert_eq!(store.get("LBL.GOV").unwrap().city, "Berkeley");

        let status = store.status();
        assert_eq!(status.records, 1);
        assert_eq!(status.last_update, Some(ts));
        assert_eq!(status.next_update, Some(next));
        assert_eq!(status.skipped_lines, 2);
        assert_eq!(status.refresh_count, 1);
    }

    #[test]
    fn test_held_snapshot_survives_publish() {
        let store = SnapshotStore::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        store.publish(snapshot_at("A.GOV,Federal,A,B,C,D", ts), 0, None);

        let held = store.get_all();
        store.publish(snapshot_at("B.GOV,Federal,A,B,C,D", ts), 0, None);

        assert!(held.contains("A.GOV"));
        assert!(!held.contains("B.GOV"));
        assert!(store.get_all().contains("B.GOV"));
        assert!(!store.get_all().contains("A.GOV"));
    }

    #[test]
    fn test_record_failure_keeps_snapshot() {
        let store = SnapshotStore::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        store.publish(snapshot_at("A.GOV,Federal,A,B,C,D", ts), 0, None);
        let before = store.get_all();

        let next = ts + chrono::Duration::days(14);
        store.record_failure("unexpected HTTP status 503", Some(next));

        assert!(Arc::ptr_eq(&before, &store.get_all()));
        let status = store.status();
        assert_eq!(status.failure_count, 1);
        assert_eq!(status.refresh_count, 1);
        assert_eq!(status.last_update, Some(ts));
        assert_eq!(status.next_update, Some(next));
        assert_eq!(
            status.last_error.as_deref(),
            Some("unexpected HTTP status 503")
        );

        // a later success clears the error
        store.publish(snapshot_at("A.GOV,Federal,A,B,C,D", ts), 0, None);
        assert!(store.status().last_error.is_none());
        assert_eq!(store.status().failure_count, 1);
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let store = Arc::new(SnapshotStore::new());
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let small = "A.GOV,Federal,A,B,C,D";
        let large = "A.GOV,Federal,A,B,C,D\nB.GOV,Federal,A,B,C,D\nC.GOV,Federal,A,B,C,D";
        store.publish(snapshot_at(small, ts), 0, None);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let snapshot = store.get_all();
                        // either the one-record or the three-record snapshot
                        let len = snapshot.len();
                        assert!(len == 1 || len == 3);
                        assert_eq!(snapshot.contains("C.GOV"), len == 3);
                    }
                })
            })
            .collect();

        for i in 0..200 {
            let rows = if i % 2 == 0 { large } else { small };
            store.publish(snapshot_at(rows, ts), 0, None);
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
