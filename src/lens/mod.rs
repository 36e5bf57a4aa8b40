//! Lens module
//!
//! Lenses combine read access to the registry snapshot with output
//! formatting, so the same operations serve the CLI and the HTTP server.
//!
//! - `domain`: [`domain::DomainLens`], the read-only query service over a
//!   [`SnapshotStore`](crate::registry::SnapshotStore)
//! - `utils`: shared output format helpers
//!
//! ```rust,ignore
//! use isitgov::lens::domain::DomainLens;
//!
//! let lens = DomainLens::new(store.clone());
//! if let Some(local) = lens.is_state_or_local("austintexas.gov") {
//!     println!("state or local: {}", local);
//! }
//! ```

pub mod domain;
pub mod utils;
