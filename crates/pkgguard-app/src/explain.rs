//! The `explain` use case: look up rule documentation.

use pkgguard_types::explain::{self, Explanation};

#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(Explanation),
    /// Unknown identifier; includes the known check ids.
    NotFound {
        identifier: String,
        available_check_ids: &'static [&'static str],
    },
}

pub fn run_explain(identifier: &str) -> ExplainOutput {
    match explain::lookup_explanation(identifier) {
        Some(exp) => ExplainOutput::Found(exp),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_check_ids: explain::all_check_ids(),
        },
    }
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &Explanation) -> String {
    let mut out = String::new();

    out.push_str(exp.title);
    out.push('\n');
    out.push_str(&"=".repeat(exp.title.len()));
    out.push_str("\n\n");
    out.push_str(exp.description);
    out.push_str("\n\n");
    out.push_str("Remediation\n");
    out.push_str("-----------\n");
    out.push_str(exp.remediation);
    out.push_str("\n\n");
    out.push_str("Examples\n");
    out.push_str("--------\n\n");
    out.push_str("Before (violation):\n");
    out.push_str("```json\n");
    out.push_str(exp.examples.before);
    out.push('\n');
    out.push_str("```\n\n");
    out.push_str("After (fixed):\n");
    out.push_str("```json\n");
    out.push_str(exp.examples.after);
    out.push('\n');
    out.push_str("```\n");

    out
}

pub fn format_not_found(identifier: &str, check_ids: &[&'static str]) -> String {
    let mut out = format!("Unknown check_id: {identifier}\n\nAvailable check_ids:\n");
    for id in check_ids {
        out.push_str(&format!("  - {id}\n"));
    }
    out
}
