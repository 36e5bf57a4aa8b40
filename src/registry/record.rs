//! Registration records and the line parser for the dotgov registry CSV
//!
//! The registry CSV is not RFC 4180: most rows are six plain comma-separated
//! fields, but an organization name containing commas is wrapped in double
//! quotes and otherwise left unescaped. The parser therefore uses a
//! two-branch rule keyed on the comma field count:
//!
//! - exactly 6 fields: positional mapping
//! - any other count: the organization is the text between the first pair
//!   of quotes, city and state are the last two comma fields

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Agency value marking a registration as state or local rather than federal
pub const NON_FEDERAL_AGENCY: &str = "Non-Federal Agency";

/// Number of columns in a plain (unquoted) data row
const PLAIN_FIELD_COUNT: usize = 6;

/// Minimum comma fields needed to read domain, type and agency
const MIN_FIELD_COUNT: usize = 3;

/// Minimum comma fields for the quoted branch: the three leading columns, an
/// organization split by at least one embedded comma, then city and state
const MIN_COMPOUND_FIELD_COUNT: usize = 7;

/// One registered domain from the dotgov registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct RegistrationRecord {
    pub domain_name: String,
    pub domain_type: String,
    pub agency: String,
    pub organization: String,
    pub city: String,
    pub state: String,
    pub is_state_or_local: bool,
    /// First time this process observed the domain
    #[tabled(display = "display_timestamp")]
    pub created_date: DateTime<Utc>,
    /// Most recent refresh that re-confirmed the domain
    #[tabled(display = "display_timestamp")]
    pub last_update: DateTime<Utc>,
}

fn display_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Normalize a domain name into the key used by snapshots and lookups
pub fn normalize_domain(name: &str) -> String {
    name.trim().to_uppercase()
}

impl RegistrationRecord {
    /// Parse one data row of the registry CSV.
    ///
    /// `seen_at` is used for both timestamps; the snapshot builder replaces
    /// `created_date` when the domain was already known.
    pub fn parse_line(line: &str, seen_at: DateTime<Utc>) -> Result<Self, LineParseError> {
        if line.trim().is_empty() {
            return Err(LineParseError::Empty);
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < MIN_FIELD_COUNT {
            return Err(LineParseError::TooFewFields {
                found: fields.len(),
            });
        }

        let (organization, city, state) = if fields.len() == PLAIN_FIELD_COUNT {
            (fields[3].trim(), fields[4], fields[5])
        } else {
            if fields.len() < MIN_COMPOUND_FIELD_COUNT {
                return Err(LineParseError::TooFewCompoundFields {
                    found: fields.len(),
                });
            }
            let quoted: Vec<&str> = line.split('"').collect();
            if quoted.len() < 3 {
                return Err(LineParseError::UnbalancedQuotes);
            }
            let n = fields.len();
            (quoted[1], fields[n - 2], fields[n - 1])
        };

        let domain_name = normalize_domain(fields[0]);
        if domain_name.is_empty() {
            return Err(LineParseError::EmptyDomainName);
        }
        let agency = fields[2].trim().to_string();

        Ok(RegistrationRecord {
            domain_name,
            domain_type: fields[1].trim().to_string(),
            is_state_or_local: agency == NON_FEDERAL_AGENCY,
            agency,
            organization: organization.to_string(),
            city: city.trim().to_string(),
            state: state.trim().to_string(),
            created_date: seen_at,
            last_update: seen_at,
        })
    }
}

/// Reasons a single CSV line cannot be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineParseError {
    /// Line is empty or whitespace only
    Empty,
    /// Not enough comma-separated fields
    TooFewFields { found: usize },
    /// Not six fields, and too few to hold a comma-split quoted organization
    TooFewCompoundFields { found: usize },
    /// Row needs the quoted-organization branch but has no complete quoted segment
    UnbalancedQuotes,
    /// First column is blank
    EmptyDomainName,
}

impl std::fmt::Display for LineParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineParseError::Empty => write!(f, "empty line"),
            LineParseError::TooFewFields { found } => {
                write!(f, "too few fields: found {}", found)
            }
            LineParseError::TooFewCompoundFields { found } => write!(
                f,
                "expected 6 fields or at least {} with a quoted organization, found {}",
                MIN_COMPOUND_FIELD_COUNT, found
            ),
            LineParseError::UnbalancedQuotes => {
                write!(f, "unexpected field count without a quoted organization")
            }
            LineParseError::EmptyDomainName => write!(f, "empty domain name"),
        }
    }
}

impl std::error::Error for LineParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_parse_plain_line() {
        let record =
            RegistrationRecord::parse_line("LBL.GOV,Federal,Department of Energy,Lawrence Berkeley National Laboratory,Berkeley,CA", ts())
                .unwrap();

        assert_eq!(record.domain_name, "LBL.GOV");
        assert_eq!(record.domain_type, "Federal");
        assert_eq!(record.agency, "Department of Energy");
        assert_eq!(record.organization, "Lawrence Berkeley National Laboratory");
        assert_eq!(record.city, "Berkeley");
        assert_eq!(record.state, "CA");
        assert!(!record.is_state_or_local);
        assert_eq!(record.created_date, ts());
        assert_eq!(record.last_update, ts());
    }

    #[test]
    fn test_parse_quoted_organization() {
        let record = RegistrationRecord::parse_line(
            "AGENCY.GOV,Federal,Department X,\"Org, With Comma\",Springfield,IL",
            ts(),
        )
        .unwrap();

        assert_eq!(record.domain_name, "AGENCY.GOV");
        assert_eq!(record.domain_type, "Federal");
        assert_eq!(record.agency, "Department X");
        assert_eq!(record.organization, "Org, With Comma");
        assert_eq!(record.city, "Springfield");
        assert_eq!(record.state, "IL");
    }

    #[test]
    fn test_parse_quoted_organization_many_commas() {
        let record = RegistrationRecord::parse_line(
            "ANYTOWN.GOV,City,Non-Federal Agency,\"Town of Anytown, County of Somewhere, State\",Anytown,NY",
            ts(),
        )
        .unwrap();

        assert_eq!(
            record.organization,
            "Town of Anytown, County of Somewhere, State"
        );
        assert_eq!(record.city, "Anytown");
        assert_eq!(record.state, "NY");
        assert!(record.is_state_or_local);
    }

    #[test]
    fn test_state_or_local_sentinel() {
        let local =
            RegistrationRecord::parse_line("CITY.GOV,City,Non-Federal Agency,City of X,X,TX", ts())
                .unwrap();
        assert!(local.is_state_or_local);

        // sentinel must match exactly
        let federal = RegistrationRecord::parse_line(
            "CITY.GOV,City,non-federal agency,City of X,X,TX",
            ts(),
        )
        .unwrap();
        assert!(!federal.is_state_or_local);
    }

    #[test]
    fn test_domain_normalized_to_uppercase() {
        let record =
            RegistrationRecord::parse_line(" lbl.gov ,Federal,DOE,LBNL,Berkeley,CA", ts()).unwrap();
        assert_eq!(record.domain_name, "LBL.GOV");
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!(
            RegistrationRecord::parse_line("", ts()),
            Err(LineParseError::Empty)
        );
        assert_eq!(
            RegistrationRecord::parse_line("   \t", ts()),
            Err(LineParseError::Empty)
        );
        assert_eq!(
            RegistrationRecord::parse_line("ONLY.GOV,Federal", ts()),
            Err(LineParseError::TooFewFields { found: 2 })
        );
        assert_eq!(
            RegistrationRecord::parse_line("A.GOV,Federal,Agency,Org", ts()),
            Err(LineParseError::TooFewCompoundFields { found: 4 })
        );
        // quoted organization without an embedded comma would shift city/state
        assert_eq!(
            RegistrationRecord::parse_line("A.GOV,Federal,Agency,\"Org\",City", ts()),
            Err(LineParseError::TooFewCompoundFields { found: 5 })
        );
        assert_eq!(
            RegistrationRecord::parse_line("A.GOV,Federal,Agency,Org,Extra,City,ST", ts()),
            Err(LineParseError::UnbalancedQuotes)
        );
        assert_eq!(
            RegistrationRecord::parse_line(",Federal,Agency,Org,City,ST", ts()),
            Err(LineParseError::EmptyDomainName)
        );
    }

    #[test]
    fn test_line_parse_error_display() {
        let err = LineParseError::TooFewFields { found: 2 };
        assert!(err.to_string().contains("too few fields"));

        let err = LineParseError::TooFewCompoundFields { found: 4 };
        assert_eq!(
            err.to_string(),
            "expected 6 fields or at least 7 with a quoted organization, found 4"
        );
    }
}
