//! Display projection for Cohort demographic records.
//!
//! Converts one stored [`DemographicRecord`] into the flat, display-ready
//! form consumed by researcher-facing exports. Pure and synchronous; no
//! database dependencies. Nothing here is ever persisted.
//!
//! # Quick start
//!
//! ```no_run
//! # fn example(record: cohort_core::record::DemographicRecord) {
//! let projection = cohort_report::project(&record);
//! if !projection.unresolved.is_empty() {
//!   eprintln!("{} stale codes", projection.unresolved.len());
//! }
//! println!("{}", serde_json::to_string_pretty(&projection.display).unwrap());
//! # }
//! ```

pub mod error;
mod project;

pub use error::{Error, Result};
pub use project::{
  DisplayRecord, Projection, UnresolvedCode, project, project_strict,
};
