//! Rendering utilities for the console and CI surfaces (Markdown, GitHub annotations).

#![forbid(unsafe_code)]

mod console;
mod gha;
mod markdown;
mod model;

pub use console::ConsoleRenderer;
pub use gha::render_github_annotations;
pub use markdown::render_markdown;
pub use model::{RenderableReport, RenderableSeverity, RenderableVerdictStatus, RenderableViolation};
