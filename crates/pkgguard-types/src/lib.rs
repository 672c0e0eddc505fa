//! Stable DTOs and IDs used across the pkgguard workspace.
//!
//! This crate is intentionally boring:
//! - violation records and the emitted JSON report
//! - stable rule IDs and their display titles
//! - canonical manifest path handling
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod path;
pub mod receipt;

pub use explain::{ExamplePair, Explanation, lookup_explanation};
pub use path::ManifestPath;
pub use receipt::{
    PkgguardReport, SCHEMA_REPORT_V1, Severity, SeverityCounts, ToolMeta, Verdict, Violation,
};
