//! Pure rule evaluation (no IO).
//!
//! Input: a manifest, plus dependency manifests supplied through [`DependencyLookup`].
//! Output: violations accumulated in a [`ReportSink`], and in-place autofix edits.

#![forbid(unsafe_code)]

pub mod checks;
pub mod error;
pub mod lookup;
pub mod model;
pub mod policy;
pub mod range;
pub mod report;
pub mod suppress;

mod fingerprint;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use error::Error;
pub use lookup::{DependencyLookup, InMemoryLookup};
pub use model::{DepType, DependencyManifest, Manifest};
pub use report::{ReportSink, Reporter};
pub use suppress::{OnlyWarnsFor, OnlyWarnsForMapping, ScopedOnlyWarnsFor, SuppressionConfig};
