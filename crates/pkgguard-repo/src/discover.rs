use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Workspace patterns split into includes and `!`-prefixed excludes.
pub(crate) struct PatternSet {
    include: GlobSet,
    exclude: GlobSet,
}

impl PatternSet {
    pub(crate) fn compile(patterns: &[String]) -> anyhow::Result<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        for pattern in patterns {
            let (builder, pattern) = match pattern.strip_prefix('!') {
                Some(negated) => (&mut exclude, negated),
                None => (&mut include, pattern.as_str()),
            };
            let pattern = normalize(pattern);
            // `*` stays within one path segment, as in npm/yarn workspaces.
            let glob = GlobBuilder::new(&pattern)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid workspace pattern {pattern:?}"))?;
            builder.add(glob);
        }
        Ok(Self {
            include: include.build().context("compile workspace globs")?,
            exclude: exclude.build().context("compile workspace globs")?,
        })
    }

    pub(crate) fn is_match(&self, rel_dir: &str) -> bool {
        self.include.is_match(rel_dir) && !self.exclude.is_match(rel_dir)
    }
}

/// Workspace globs are written relative to the root, sometimes with a
/// leading `./` or a trailing `/`.
fn normalize(pattern: &str) -> String {
    let mut p = pattern.replace('\\', "/");
    while let Some(rest) = p.strip_prefix("./") {
        p = rest.to_string();
    }
    p.trim_end_matches('/').to_string()
}

/// Directories under `root_dir` matched by the `workspaces` patterns.
///
/// Returns paths relative to `root_dir`, sorted. `node_modules` and hidden
/// directories are never descended into.
pub fn discover_workspace_members(
    root_dir: &Utf8Path,
    patterns: &[String],
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let matcher = PatternSet::compile(patterns)?;

    let mut out: Vec<Utf8PathBuf> = WalkDir::new(root_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            name != "node_modules" && !name.starts_with('.')
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter_map(|e| pathbuf_to_utf8(e.path().to_path_buf()))
        .filter_map(|abs| {
            let rel = abs.strip_prefix(root_dir).ok()?.as_str().replace('\\', "/");
            matcher.is_match(&rel).then(|| Utf8PathBuf::from(rel))
        })
        .collect();

    // Stable order.
    out.sort();
    out.dedup();

    tracing::debug!(root = %root_dir, count = out.len(), "discovered workspace members");
    Ok(out)
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
