//! Refresh scheduler
//!
//! Runs fetch, build and publish cycles against a [`SnapshotStore`]. A cycle
//! that fails leaves the previously published snapshot in place; the next
//! attempt happens one full interval later (fixed-interval retry, no backoff).

use crate::registry::fetch::{FetchError, Fetcher};
use crate::registry::snapshot::build_snapshot;
use crate::registry::store::SnapshotStore;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Default interval between refreshes (14 days)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Scheduler behavior knobs
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub refresh_interval: Duration,
    /// Refresh once immediately when the loop starts
    pub initial_fetch_on_startup: bool,
    /// Publish a snapshot built from a document without data rows
    pub publish_empty_snapshot: bool,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            initial_fetch_on_startup: true,
            publish_empty_snapshot: true,
        }
    }
}

/// Outcome of a successful refresh cycle
#[derive(Debug, Clone)]
pub struct RefreshSummary {
    pub source: String,
    pub records: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub published_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Failure of one refresh cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// The document could not be retrieved
    Fetch(FetchError),
    /// The document had no data rows and empty snapshots are not published
    EmptyDocument,
    /// The blocking refresh task panicked or was cancelled
    Task(String),
}

impl From<FetchError> for RefreshError {
    fn from(e: FetchError) -> Self {
        RefreshError::Fetch(e)
    }
}

impl std::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshError::Fetch(e) => write!(f, "fetch failed: {}", e),
            RefreshError::EmptyDocument => write!(f, "registry document has no data rows"),
            RefreshError::Task(e) => write!(f, "refresh task failed: {}", e),
        }
    }
}

impl std::error::Error for RefreshError {}

/// Periodic re-ingestion of the registry into a [`SnapshotStore`]
///
/// Cloning is cheap; clones share the store, fetcher and cycle lock.
#[derive(Clone)]
pub struct RefreshScheduler {
    store: Arc<SnapshotStore>,
    fetcher: Arc<dyn Fetcher>,
    settings: RefreshSettings,
    // serializes cycles so each build sees the previous publish
    cycle_lock: Arc<Mutex<()>>,
}

impl RefreshScheduler {
    pub fn new(
        store: Arc<SnapshotStore>,
        fetcher: Arc<dyn Fetcher>,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            store,
            fetcher,
            settings,
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    fn next_update(&self) -> Option<DateTime<Utc>> {
        chrono::Duration::from_std(self.settings.refresh_interval)
            .ok()
            .and_then(|d| Utc::now().checked_add_signed(d))
    }

    /// Run one refresh cycle on the blocking pool
    pub async fn refresh_now(&self) -> Result<RefreshSummary, RefreshError> {
        let this = self.clone();
        match tokio::task::spawn_blocking(move || this.refresh_blocking()).await {
            Ok(result) => result,
            Err(e) => {
                let err = RefreshError::Task(e.to_string());
                error!("registry refresh failed: {}", err);
                self.store.record_failure(&err.to_string(), self.next_update());
                Err(err)
            }
        }
    }

    /// Run one refresh cycle on the current thread.
    ///
    /// Failures are logged and recorded in the store metadata before being
    /// returned.
    pub fn refresh_blocking(&self) -> Result<RefreshSummary, RefreshError> {
        let _guard = self
            .cycle_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match self.cycle() {
            Ok(summary) => {
                info!(
                    "registry refresh finished: {} records from {} ({} skipped, {} duplicates) in {:.2?}",
                    summary.records,
                    summary.source,
                    summary.skipped,
                    summary.duplicates,
                    summary.elapsed
                );
                Ok(summary)
            }
            Err(e) => {
                error!(
                    "registry refresh from {} failed, keeping previous snapshot: {}",
                    self.fetcher.source(),
                    e
                );
                self.store.record_failure(&e.to_string(), self.next_update());
                Err(e)
            }
        }
    }

    fn cycle(&self) -> Result<RefreshSummary, RefreshError> {
        let started = Instant::now();
        let source = self.fetcher.source();

        let bytes = self.fetcher.fetch()?;
        let document = String::from_utf8_lossy(&bytes);

        let now = Utc::now();
        let previous = self.store.get_all();
        let report = build_snapshot(&document, Some(previous.as_ref()), now);

        if report.skipped_count() > 0 {
            warn!(
                "skipped {} malformed lines while parsing {}",
                report.skipped_count(),
                source
            );
        }

        if report.is_empty_document() {
            if !self.settings.publish_empty_snapshot {
                return Err(RefreshError::EmptyDocument);
            }
            warn!(
                "registry document from {} has no data rows, publishing an empty snapshot; \
                 the upstream format may have changed",
                source
            );
        }

        let summary = RefreshSummary {
            source,
            records: report.snapshot.len(),
            skipped: report.skipped_count(),
            duplicates: report.duplicates,
            published_at: now,
            elapsed: started.elapsed(),
        };
        self.store
            .publish(report.snapshot, summary.skipped, self.next_update());

        Ok(summary)
    }

    /// Refresh loop: optional startup refresh, then one cycle per interval
    /// until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "registry refresh scheduler started for {} (interval: {})",
            self.fetcher.source(),
            humantime::format_duration(self.settings.refresh_interval)
        );

        if self.settings.initial_fetch_on_startup {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("registry refresh scheduler stopped");
                    return;
                }
                // errors are logged and recorded by refresh_now
                _ = self.refresh_now() => {}
            }
        }

        loop {
            // the interval restarts after every cycle, successful or not
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.refresh_interval) => {}
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.refresh_now() => {}
            }
        }

        info!("registry refresh scheduler stopped");
    }

    /// Spawn [`RefreshScheduler::run`] as a tokio task
    pub fn spawn(&self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.clone().run(cancel))
    }
}
