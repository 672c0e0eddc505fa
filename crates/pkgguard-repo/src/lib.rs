//! Repository adapters: read and write `package.json`, resolve installed
//! dependencies, discover workspace members.
//!
//! This crate is allowed to do filesystem IO. It should not spawn external
//! processes or touch the network.

#![forbid(unsafe_code)]

mod discover;
mod io;
mod resolve;

pub use discover::discover_workspace_members;
pub use io::{read_manifest, render_manifest, write_manifest};
pub use resolve::NodeModulesResolver;

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use pkgguard_domain::Manifest;
    use pkgguard_types::ManifestPath;

    /// Parse arbitrary text as a manifest and read its `workspaces` field.
    ///
    /// **Never panics** on any input.
    pub fn parse_manifest(text: &str) -> anyhow::Result<()> {
        let path = ManifestPath::default();
        let manifest = Manifest::parse(path.as_str(), text)?;
        let _ = manifest.workspaces(&path)?;
        Ok(())
    }

    /// Expand workspace glob patterns against a list of candidate directories.
    ///
    /// Returns `Ok(matched)` if every pattern compiles. **Never panics** on any input.
    pub fn expand_globs(patterns: &[String], candidates: &[String]) -> anyhow::Result<Vec<String>> {
        let matcher = super::discover::PatternSet::compile(patterns)?;
        Ok(candidates
            .iter()
            .filter(|c| matcher.is_match(c))
            .cloned()
            .collect())
    }
}
