//! Domain lens
//!
//! Read-only query service over the published registry snapshot. All domain
//! names are trimmed and uppercased before lookup, so `lbl.gov` and
//! `LBL.GOV` resolve to the same record.

pub mod args;
pub mod types;

pub use args::DomainSearchArgs;
pub use types::{DomainLookupResult, DomainRecordConcise, StateOrLocalResult};

use crate::lens::utils::{truncate_name, OutputFormat, DEFAULT_NAME_MAX_LEN};
use crate::registry::{normalize_domain, RegistrationRecord, Snapshot, SnapshotStore, StoreStatus};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tabled::settings::Style;
use tabled::Table;

/// Domain lens for querying the registry snapshot
///
/// Each call reads the snapshot that is current at that moment; a refresh
/// published concurrently is picked up by the next call.
#[derive(Clone)]
pub struct DomainLens {
    store: Arc<SnapshotStore>,
}

impl DomainLens {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }

    /// Check whether any registrations have been published yet
    pub fn is_data_available(&self) -> bool {
        !self.store.get_all().is_empty()
    }

    /// The full current snapshot
    pub fn get_all(&self) -> Arc<Snapshot> {
        self.store.get_all()
    }

    pub fn get_by_domain(&self, name: &str) -> Option<RegistrationRecord> {
        self.store.get(name)
    }

    pub fn is_state_or_local(&self, name: &str) -> Option<bool> {
        self.store.get(name).map(|r| r.is_state_or_local)
    }

    pub fn state_or_local(&self, name: &str) -> Option<StateOrLocalResult> {
        self.store.get(name).map(|r| StateOrLocalResult {
            domain: r.domain_name,
            is_state_or_local: r.is_state_or_local,
        })
    }

    /// Refresh metadata of the store
    pub fn status(&self) -> StoreStatus {
        self.store.status()
    }

    /// Look up several domains against one snapshot
    pub fn lookup(&self, names: &[String]) -> DomainLookupResult {
        let snapshot = self.store.get_all();
        let mut result = DomainLookupResult::default();
        for name in names {
            match snapshot.get(name) {
                Some(record) => result.found.push(record.clone()),
                None => result.missing.push(normalize_domain(name)),
            }
        }
        result
    }

    /// List records matching the filters, sorted by domain name
    pub fn search(&self, args: &DomainSearchArgs) -> Result<Vec<RegistrationRecord>> {
        args.validate().map_err(|e| anyhow!(e))?;

        let query = args.query.as_ref().map(|q| q.trim().to_lowercase());
        let state = args.state.as_ref().map(|s| s.trim().to_uppercase());
        let domain_type = args.domain_type.as_ref().map(|t| t.trim().to_lowercase());

        let snapshot = self.store.get_all();
        let matches = snapshot
            .sorted_records()
            .into_iter()
            .filter(|r| {
                query.as_ref().map_or(true, |q| {
                    r.domain_name.to_lowercase().contains(q.as_str())
                        || r.organization.to_lowercase().contains(q.as_str())
                })
            })
            .filter(|r| state.as_ref().map_or(true, |s| r.state.eq_ignore_ascii_case(s)))
            .filter(|r| {
                domain_type
                    .as_ref()
                    .map_or(true, |t| r.domain_type.to_lowercase() == *t)
            })
            .filter(|r| !args.state_or_local_only || r.is_state_or_local)
            .filter(|r| !args.federal_only || !r.is_state_or_local)
            .take(args.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(matches)
    }

    /// Format records for output
    ///
    /// `full_table` includes the created/last-update timestamps. When
    /// `truncate_names` is true, agency and organization are shortened in
    /// table output; JSON and PSV output are never truncated.
    pub fn format_records(
        &self,
        records: &[RegistrationRecord],
        format: &OutputFormat,
        full_table: bool,
        truncate_names: bool,
    ) -> String {
        match format {
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let value = if full_table {
                    serde_json::to_value(records)
                } else {
                    let concise: Vec<DomainRecordConcise> = records.iter().map(Into::into).collect();
                    serde_json::to_value(concise)
                };
                let value = value.unwrap_or_default();
                if *format == OutputFormat::JsonPretty {
                    serde_json::to_string_pretty(&value).unwrap_or_default()
                } else {
                    value.to_string()
                }
            }
            OutputFormat::JsonLine => records
                .iter()
                .map(|r| {
                    if full_table {
                        serde_json::to_string(r).unwrap_or_default()
                    } else {
                        serde_json::to_string(&DomainRecordConcise::from(r)).unwrap_or_default()
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Psv => {
                let mut output = String::new();
                if full_table {
                    output.push_str("domain_name|domain_type|agency|organization|city|state|is_state_or_local|created_date|last_update\n");
                    for r in records {
                        output.push_str(&format!(
                            "{}|{}|{}|{}|{}|{}|{}|{}|{}\n",
                            r.domain_name,
                            r.domain_type,
                            r.agency,
                            r.organization,
                            r.city,
                            r.state,
                            r.is_state_or_local,
                            r.created_date.to_rfc3339(),
                            r.last_update.to_rfc3339()
                        ));
                    }
                } else {
                    output.push_str(
                        "domain_name|domain_type|agency|organization|city|state|is_state_or_local\n",
                    );
                    for r in records {
                        output.push_str(&format!(
                            "{}|{}|{}|{}|{}|{}|{}\n",
                            r.domain_name,
                            r.domain_type,
                            r.agency,
                            r.organization,
                            r.city,
                            r.state,
                            r.is_state_or_local
                        ));
                    }
                }
                output
            }
            OutputFormat::Table | OutputFormat::Markdown => {
                let style_markdown = *format == OutputFormat::Markdown;
                let mut table = if full_table {
                    let display: Vec<RegistrationRecord> = records
                        .iter()
                        .map(|r| {
                            let mut r = r.clone();
                            if truncate_names {
                                r.agency = truncate_name(&r.agency, DEFAULT_NAME_MAX_LEN);
                                r.organization = truncate_name(&r.organization, DEFAULT_NAME_MAX_LEN);
                            }
                            r
                        })
                        .collect();
                    Table::new(display)
                } else {
                    let concise: Vec<DomainRecordConcise> = records
                        .iter()
                        .map(|r| {
                            let c = DomainRecordConcise::from(r);
                            if truncate_names {
                                c.truncated(DEFAULT_NAME_MAX_LEN)
                            } else {
                                c
                            }
                        })
                        .collect();
                    Table::new(concise)
                };
                if style_markdown {
                    table.with(Style::markdown()).to_string()
                } else {
                    table.with(Style::rounded()).to_string()
                }
            }
        }
    }
}
