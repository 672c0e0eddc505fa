use crate::{RenderableReport, RenderableSeverity, RenderableVerdictStatus};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# pkgguard report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Warn => "WARN",
        RenderableVerdictStatus::Fail => "FAIL",
    };
    out.push_str(&format!(
        "- Verdict: **{verdict}**\n- Violations: {} error(s), {} warning(s)\n\n",
        report.errors, report.warnings
    ));

    if report.violations.is_empty() {
        out.push_str("No violations.\n");
        return out;
    }

    let mut last_group: Option<(&str, &str)> = None;
    for v in &report.violations {
        let group = (v.rule.as_str(), v.manifest.as_str());
        if last_group != Some(group) {
            out.push_str(&format!("\n## {} in `{}`\n\n", v.rule, v.manifest));
            last_group = Some(group);
        }
        let sev = match v.severity {
            RenderableSeverity::Warning => "WARN",
            RenderableSeverity::Error => "ERROR",
        };
        out.push_str(&format!("- [{sev}] {}", v.title));
        if let Some(detail) = &v.detail {
            out.push_str(&format!(": {detail}"));
        }
        if v.fixable {
            out.push_str(" _(fixable)_");
        }
        out.push('\n');
    }

    out
}
