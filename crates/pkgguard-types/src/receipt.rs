use crate::ManifestPath;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for pkgguard reports.
pub const SCHEMA_REPORT_V1: &str = "pkgguard.report.v1";

/// A violation is either advisory (suppressed via `onlyWarnsFor`) or fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn from_only_warn(only_warn: bool) -> Self {
        if only_warn {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub check_id: String,
    /// Rule title the console groups under (may carry a prefix, e.g. "Monorepo ").
    pub rule: String,
    pub manifest: ManifestPath,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub severity: Severity,
    #[serde(default)]
    pub fixable: bool,

    /// Stable identifier intended for dedup and trending: a hash of
    /// `check_id + manifest + title`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl Violation {
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeverityCounts {
    pub warning: u32,
    pub error: u32,
}

impl SeverityCounts {
    pub fn from_violations(violations: &[Violation]) -> Self {
        let mut counts = SeverityCounts::default();
        for v in violations {
            match v.severity {
                Severity::Warning => counts.warning += 1,
                Severity::Error => counts.error += 1,
            }
        }
        counts
    }

    pub fn verdict(&self) -> Verdict {
        if self.error > 0 {
            Verdict::Fail
        } else if self.warning > 0 {
            Verdict::Warn
        } else {
            Verdict::Pass
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// The JSON report written by `pkgguard check --report-out`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PkgguardReport {
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub verdict: Verdict,
    pub counts: SeverityCounts,
    /// Manifests rewritten by autofix during this run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed_manifests: Vec<ManifestPath>,
    pub violations: Vec<Violation>,
}
