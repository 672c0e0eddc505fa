use crate::{RenderableSeverity, RenderableViolation};

const WARNING_GLYPH: &str = "⚠";
const ERROR_GLYPH: &str = "❌";

/// Streams violations as grouped console lines.
///
/// A `== {rule} in {manifest} ==` header is emitted whenever the rule or the
/// manifest differs from the previous violation.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    last_header: Option<String>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for one violation, header first when the group changes.
    pub fn render(&mut self, violation: &RenderableViolation) -> Vec<String> {
        let mut out = Vec::new();
        let header = format!("== {} in {} ==", violation.rule, violation.manifest);
        if self.last_header.as_deref() != Some(header.as_str()) {
            if self.last_header.is_some() {
                out.push(String::new());
            }
            out.push(header.clone());
            self.last_header = Some(header);
        }

        let glyph = match violation.severity {
            RenderableSeverity::Warning => WARNING_GLYPH,
            RenderableSeverity::Error => ERROR_GLYPH,
        };
        let mut line = format!("{glyph} {}", violation.title);
        if let Some(detail) = &violation.detail {
            line.push_str(": ");
            line.push_str(detail);
        }
        if violation.fixable {
            line.push_str(" (fixable with --fix)");
        }
        out.push(line);
        out
    }

    /// Renders a whole list from a fresh grouping state.
    pub fn render_all(violations: &[RenderableViolation]) -> String {
        let mut renderer = Self::new();
        let mut out = String::new();
        for violation in violations {
            for line in renderer.render(violation) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }
}
