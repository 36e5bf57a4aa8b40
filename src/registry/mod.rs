//! Dotgov registry ingestion
//!
//! This module holds the ingestion pipeline:
//! - `record`: registration records and the CSV line parser
//! - `snapshot`: immutable snapshots and the document-level builder
//! - `fetch`: retrieving the raw document over HTTP(S) or from disk
//! - `store`: the atomically swapped current snapshot and its metadata
//! - `scheduler`: periodic fetch, build and publish cycles

mod fetch;
mod record;
mod scheduler;
mod snapshot;
mod store;

pub use fetch::{
    fetcher_for_source, FetchError, Fetcher, FileFetcher, HttpFetcher, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_MAX_BODY_BYTES, DOTGOV_REGISTRY_URL,
};
pub use record::{normalize_domain, LineParseError, RegistrationRecord, NON_FEDERAL_AGENCY};
pub use scheduler::{
    RefreshError, RefreshScheduler, RefreshSettings, RefreshSummary, DEFAULT_REFRESH_INTERVAL,
};
pub use snapshot::{build_snapshot, BuildReport, SkippedLine, Snapshot};
pub use store::{SnapshotStore, StoreStatus};
