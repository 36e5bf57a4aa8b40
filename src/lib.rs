#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! isitgov - a .gov domain registry lookup service
//!
//! isitgov downloads the published .gov domain registry (a CSV document),
//! builds an immutable in-memory snapshot keyed by domain name, refreshes it
//! periodically and answers lookups against the latest snapshot. It can be
//! used as both a command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Registry parsing, snapshots, store, scheduler, lens | `ureq`, `arc-swap`, `tokio` |
//! | `server` | Read-only HTTP API | `axum`, `tower-http` |
//! | `cli` | The `isitgov` binary | All above + `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`registry`]**: ingestion and storage
//!   - `record`: CSV line parsing into [`RegistrationRecord`]
//!   - `snapshot`: building a [`Snapshot`] from a full document, carrying
//!     creation timestamps over from the previous snapshot
//!   - `fetch`: retrieving the document over HTTP or from a local file
//!   - `store`: the atomically swapped current snapshot
//!   - `scheduler`: periodic refresh cycles
//!
//! - **[`lens`]**: query operations and output formatting over the store
//!
//! - **[`config`]**: Configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use isitgov::registry::{fetcher_for_source, RefreshScheduler, SnapshotStore};
//! use isitgov::lens::domain::DomainLens;
//! use isitgov::IsitgovConfig;
//! use std::sync::Arc;
//!
//! let config = IsitgovConfig::default();
//! let fetcher = fetcher_for_source(&config.source_url, config.fetch_timeout, config.max_body_bytes);
//! let store = Arc::new(SnapshotStore::new());
//! let scheduler = RefreshScheduler::new(store.clone(), Arc::from(fetcher), config.refresh_settings());
//! scheduler.refresh_blocking()?;
//!
//! let lens = DomainLens::new(store);
//! if let Some(record) = lens.get_by_domain("lbl.gov") {
//!     println!("{} is run by {}", record.domain_name, record.organization);
//! }
//! ```

pub mod config;
pub mod lens;
pub mod registry;

// Server module - requires server feature
#[cfg(feature = "server")]
pub mod server;

pub use config::IsitgovConfig;

pub use registry::{
    build_snapshot, fetcher_for_source, BuildReport, FetchError, Fetcher, LineParseError,
    RefreshError, RefreshScheduler, RefreshSettings, RegistrationRecord, Snapshot, SnapshotStore,
    StoreStatus,
};

pub use lens::domain::{DomainLens, DomainSearchArgs};
pub use lens::utils::OutputFormat;
