//! Domain lens arguments
//!
//! Usable from the CLI (clap derives behind the `cli` feature) and as HTTP
//! query parameters (serde).

use serde::{Deserialize, Serialize};

/// Filters for listing registry records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct DomainSearchArgs {
    /// Case-insensitive substring matched against domain name and organization
    #[cfg_attr(feature = "cli", clap(value_name = "QUERY"))]
    #[serde(default)]
    pub query: Option<String>,

    /// Two-letter state code, e.g. "CA"
    #[cfg_attr(feature = "cli", clap(short, long))]
    #[serde(default)]
    pub state: Option<String>,

    /// Domain type, e.g. "Federal" or "City"
    #[cfg_attr(feature = "cli", clap(short = 't', long))]
    #[serde(default)]
    pub domain_type: Option<String>,

    /// Only state or local registrations
    #[cfg_attr(feature = "cli", clap(short = 'L', long))]
    #[serde(default)]
    pub state_or_local_only: bool,

    /// Only federal registrations
    #[cfg_attr(feature = "cli", clap(short = 'F', long))]
    #[serde(default)]
    pub federal_only: bool,

    /// Maximum number of results
    #[cfg_attr(feature = "cli", clap(short, long))]
    #[serde(default)]
    pub limit: Option<usize>,
}

impl DomainSearchArgs {
    pub fn new(query: &str) -> Self {
        Self {
            query: Some(query.to_string()),
            ..Default::default()
        }
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    pub fn state_or_local_only(mut self) -> Self {
        self.state_or_local_only = true;
        self
    }

    pub fn federal_only(mut self) -> Self {
        self.federal_only = true;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns an error message if the arguments are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.state_or_local_only && self.federal_only {
            return Err("Cannot combine state-or-local-only and federal-only".to_string());
        }
        if self.limit == Some(0) {
            return Err("limit must be greater than zero".to_string());
        }
        Ok(())
    }
}
