//! Use case orchestration for pkgguard.
//!
//! This crate provides the application layer: the manifest and workspace
//! checkers, and the use cases that coordinate the domain, repo, settings and
//! render layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod check;
mod checker;
mod explain;
mod render;
mod report;
mod workspace;

#[cfg(test)]
mod test_support;

pub use check::{CheckInput, CheckOutput, run_check, verdict_exit_code};
pub use checker::ManifestChecker;
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use render::{render_annotations, render_console, render_markdown};
pub use report::{
    build_report, parse_report_json, renderable_violation, runtime_error_report, serialize_report,
    to_renderable,
};
pub use workspace::WorkspaceChecker;
