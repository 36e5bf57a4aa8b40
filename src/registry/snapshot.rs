//! Immutable registry snapshots and the document-level builder
//!
//! A [`Snapshot`] is built once per refresh cycle from the full CSV text and
//! never mutated afterwards. Building consults the previous snapshot so that
//! `created_date` survives refreshes for domains that stay in the feed.

use crate::registry::record::{normalize_domain, LineParseError, RegistrationRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Complete mapping from normalized domain name to record
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    records: HashMap<String, RegistrationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    built_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// An empty snapshot, used before the first successful refresh
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, domain: &str) -> Option<&RegistrationRecord> {
        self.records.get(&normalize_domain(domain))
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.records.contains_key(&normalize_domain(domain))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Time the snapshot was built, `None` for the initial empty snapshot
    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    /// Read-only view of all records
    pub fn records(&self) -> &HashMap<String, RegistrationRecord> {
        &self.records
    }

    /// Records sorted by domain name
    pub fn sorted_records(&self) -> Vec<&RegistrationRecord> {
        let mut records: Vec<&RegistrationRecord> = self.records.values().collect();
        records.sort_by(|a, b| a.domain_name.cmp(&b.domain_name));
        records
    }
}

/// A data line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source document (header is line 1)
    pub line_number: usize,
    pub error: LineParseError,
}

/// Result of building a snapshot from one document
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub snapshot: Snapshot,
    pub skipped: Vec<SkippedLine>,
    /// Rows whose domain appeared earlier in the same document
    pub duplicates: usize,
    /// Non-blank rows after the header
    pub data_lines: usize,
}

impl BuildReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// True when the document had no data rows after the header
    pub fn is_empty_document(&self) -> bool {
        self.data_lines == 0
    }
}

/// Build a new snapshot from raw CSV text.
///
/// The first line is treated as the header and discarded. Every record's
/// `last_update` is `now`; `created_date` is carried over from `previous`
/// when the domain was already present there, otherwise it is `now`.
pub fn build_snapshot(
    document: &str,
    previous: Option<&Snapshot>,
    now: DateTime<Utc>,
) -> BuildReport {
    let normalized = document.replace('\r', "");
    let mut records: HashMap<String, RegistrationRecord> = HashMap::new();
    let mut skipped = Vec::new();
    let mut duplicates = 0;
    let mut data_lines = 0;

    for (idx, line) in normalized.trim().split('\n').enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        data_lines += 1;

        let mut record = match RegistrationRecord::parse_line(line, now) {
            Ok(record) => record,
            Err(error) => {
                debug!("skipping line {}: {}", idx + 1, error);
                skipped.push(SkippedLine {
                    line_number: idx + 1,
                    error,
                });
                continue;
            }
        };

        if let Some(prev) = previous.and_then(|p| p.records.get(&record.domain_name)) {
            record.created_date = prev.created_date;
        }

        if records.insert(record.domain_name.clone(), record).is_some() {
            duplicates += 1;
        }
    }

    BuildReport {
        snapshot: Snapshot {
            records,
            built_at: Some(now),
        },
        skipped,
        duplicates,
        data_lines,
    }
}
