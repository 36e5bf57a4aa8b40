pub mod config;
pub mod list;
pub mod lookup;
pub mod serve;

use anyhow::{anyhow, Result};
use isitgov::lens::domain::DomainLens;
use isitgov::registry::{fetcher_for_source, RefreshScheduler, SnapshotStore};
use isitgov::IsitgovConfig;
use std::sync::Arc;
use tracing::warn;

/// Build a scheduler for the configured source around a fresh store
pub(crate) fn scheduler_from_config(config: &IsitgovConfig) -> RefreshScheduler {
    let fetcher = fetcher_for_source(
        &config.source_url,
        config.fetch_timeout,
        config.max_body_bytes,
    );
    RefreshScheduler::new(
        Arc::new(SnapshotStore::new()),
        Arc::from(fetcher),
        config.refresh_settings(),
    )
}

/// Fetch the registry once and return a lens over it (one-shot commands)
pub(crate) fn load_registry(config: &IsitgovConfig) -> Result<DomainLens> {
    let scheduler = scheduler_from_config(config);
    scheduler
        .refresh_blocking()
        .map_err(|e| anyhow!("unable to load registry from {}: {}", config.source_url, e))?;
    let lens = DomainLens::new(scheduler.store().clone());
    if !lens.is_data_available() {
        warn!("registry from {} contains no registrations", config.source_url);
    }
    Ok(lens)
}
