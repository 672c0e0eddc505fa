use anyhow::Context;
use pkgguard_domain::ReportSink;
use pkgguard_render::{
    RenderableReport, RenderableSeverity, RenderableVerdictStatus, RenderableViolation,
};
use pkgguard_types::{
    ManifestPath, PkgguardReport, SCHEMA_REPORT_V1, Severity, SeverityCounts, ToolMeta, Verdict,
    Violation, ids,
};
use time::OffsetDateTime;

pub fn build_report(
    started_at: OffsetDateTime,
    violations: Vec<Violation>,
    fixed_manifests: Vec<ManifestPath>,
) -> PkgguardReport {
    let counts = SeverityCounts::from_violations(&violations);
    PkgguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        verdict: counts.verdict(),
        counts,
        fixed_manifests,
        violations,
    }
}

/// A failed report carrying the error chain as its only violation.
pub fn runtime_error_report(message: &str) -> PkgguardReport {
    let mut sink = ReportSink::new();
    sink.reporter(ids::CHECK_TOOL_RUNTIME, &ManifestPath::default())
        .error("pkgguard could not complete the check", Some(message.to_string()));
    build_report(OffsetDateTime::now_utc(), sink.into_violations(), Vec::new())
}

fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "pkgguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

pub fn parse_report_json(text: &str) -> anyhow::Result<PkgguardReport> {
    let report: PkgguardReport = serde_json::from_str(text).context("parse report json")?;
    if report.schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {}", report.schema);
    }
    Ok(report)
}

pub fn serialize_report(report: &PkgguardReport) -> anyhow::Result<Vec<u8>> {
    let mut data = serde_json::to_vec_pretty(report).context("serialize report")?;
    data.push(b'\n');
    Ok(data)
}

pub fn to_renderable(report: &PkgguardReport) -> RenderableReport {
    RenderableReport {
        verdict: match report.verdict {
            Verdict::Pass => RenderableVerdictStatus::Pass,
            Verdict::Warn => RenderableVerdictStatus::Warn,
            Verdict::Fail => RenderableVerdictStatus::Fail,
        },
        warnings: report.counts.warning,
        errors: report.counts.error,
        violations: report.violations.iter().map(renderable_violation).collect(),
    }
}

pub fn renderable_violation(v: &Violation) -> RenderableViolation {
    RenderableViolation {
        severity: match v.severity {
            Severity::Warning => RenderableSeverity::Warning,
            Severity::Error => RenderableSeverity::Error,
        },
        check_id: v.check_id.clone(),
        rule: v.rule.clone(),
        manifest: v.manifest.as_str().to_string(),
        title: v.title.clone(),
        detail: v.detail.clone(),
        fixable: v.fixable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trips_through_json() {
        let mut sink = ReportSink::new();
        sink.reporter(ids::CHECK_EXACT_VERSIONS, &ManifestPath::default())
            .report("Unexpected range", Some("detail".to_string()), true);
        let report = build_report(OffsetDateTime::now_utc(), sink.into_violations(), Vec::new());
        assert_eq!(report.verdict, Verdict::Warn);

        let bytes = serialize_report(&report).expect("serialize");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(text.contains("\"schema\": \"pkgguard.report.v1\""));
        let parsed = parse_report_json(&text).expect("parse");
        assert_eq!(parsed, report);
    }

    #[test]
    fn foreign_schema_is_rejected() {
        let report = runtime_error_report("boom");
        let mut value = serde_json::to_value(&report).expect("to value");
        value["schema"] = serde_json::json!("other.report.v1");
        let err = parse_report_json(&value.to_string()).expect_err("schema");
        assert!(err.to_string().contains("unknown report schema"));
    }

    #[test]
    fn runtime_error_report_fails() {
        let report = runtime_error_report("config is broken");
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.violations[0].check_id, ids::CHECK_TOOL_RUNTIME);
        assert_eq!(report.violations[0].detail.as_deref(), Some("config is broken"));

        let renderable = to_renderable(&report);
        assert_eq!(renderable.errors, 1);
        assert_eq!(renderable.violations[0].rule, "Runtime");
    }
}
