//! Domain lens result types

use crate::lens::utils::truncate_name;
use crate::registry::RegistrationRecord;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Registration without the refresh timestamps
#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
pub struct DomainRecordConcise {
    pub domain_name: String,
    pub domain_type: String,
    pub agency: String,
    pub organization: String,
    pub city: String,
    pub state: String,
    pub is_state_or_local: bool,
}

impl From<&RegistrationRecord> for DomainRecordConcise {
    fn from(record: &RegistrationRecord) -> Self {
        Self {
            domain_name: record.domain_name.clone(),
            domain_type: record.domain_type.clone(),
            agency: record.agency.clone(),
            organization: record.organization.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            is_state_or_local: record.is_state_or_local,
        }
    }
}

impl DomainRecordConcise {
    /// Copy with agency and organization truncated for table display
    pub fn truncated(&self, max_len: usize) -> Self {
        Self {
            agency: truncate_name(&self.agency, max_len),
            organization: truncate_name(&self.organization, max_len),
            ..self.clone()
        }
    }
}

/// Answer to "is this domain state or local?"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateOrLocalResult {
    pub domain: String,
    pub is_state_or_local: bool,
}

/// Outcome of looking up several domains at once
#[derive(Debug, Clone, Default)]
pub struct DomainLookupResult {
    pub found: Vec<RegistrationRecord>,
    /// Normalized names with no registration
    pub missing: Vec<String>,
}
