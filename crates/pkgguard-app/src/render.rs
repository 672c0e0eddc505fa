//! Render use cases: console lines, markdown, and GitHub annotations.

use pkgguard_render::{ConsoleRenderer, RenderableReport};
use pkgguard_types::Violation;

use crate::report::renderable_violation;

pub fn render_markdown(report: &RenderableReport) -> String {
    pkgguard_render::render_markdown(report)
}

pub fn render_annotations(report: &RenderableReport, max: usize) -> Vec<String> {
    pkgguard_render::render_github_annotations(report)
        .into_iter()
        .take(max)
        .collect()
}

/// Console lines for one violation, grouped with the ones before it.
pub fn render_console(renderer: &mut ConsoleRenderer, violation: &Violation) -> Vec<String> {
    renderer.render(&renderable_violation(violation))
}
