use crate::{RenderableReport, RenderableSeverity};

/// Render violations as GitHub Actions workflow command annotations.
///
/// Format:
/// `::{level} file={manifest},title={rule}::{message}`
pub fn render_github_annotations(report: &RenderableReport) -> Vec<String> {
    report
        .violations
        .iter()
        .map(|v| {
            let level = match v.severity {
                RenderableSeverity::Error => "error",
                RenderableSeverity::Warning => "warning",
            };
            let mut message = v.title.clone();
            if let Some(detail) = &v.detail {
                message.push_str(": ");
                message.push_str(detail);
            }
            format!(
                "::{level} file={},title={}::{}",
                escape_property(&v.manifest),
                escape_property(&v.rule),
                escape_data(&message)
            )
        })
        .collect()
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RenderableVerdictStatus, RenderableViolation};

    #[test]
    fn annotations_carry_level_file_and_escaped_message() {
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            warnings: 1,
            errors: 1,
            violations: vec![
                RenderableViolation {
                    severity: RenderableSeverity::Error,
                    check_id: "no_dependencies".to_string(),
                    rule: "No dependencies".to_string(),
                    manifest: "package.json".to_string(),
                    title: "Unexpected dependencies".to_string(),
                    detail: Some("100%\nmove".to_string()),
                    fixable: false,
                },
                RenderableViolation {
                    severity: RenderableSeverity::Warning,
                    check_id: "exact_versions".to_string(),
                    rule: "Exact versions".to_string(),
                    manifest: "packages/a,b/package.json".to_string(),
                    title: "t".to_string(),
                    detail: None,
                    fixable: false,
                },
            ],
        };
        let lines = render_github_annotations(&report);
        assert_eq!(
            lines[0],
            "::error file=package.json,title=No dependencies::Unexpected dependencies: 100%25%0Amove"
        );
        assert_eq!(
            lines[1],
            "::warning file=packages/a%2Cb/package.json,title=Exact versions::t"
        );
    }
}
