use super::utils::FirstError;
use crate::lookup::DependencyLookup;
use crate::model::{DepType, Manifest};
use crate::range::{self, RangeOptions};
use crate::report::ReportSink;
use crate::suppress::OnlyWarnsFor;
use crate::Error;
use pkgguard_types::{ManifestPath, ids};

#[derive(Clone, Debug, Default)]
pub struct ExactVersionsOptions {
    pub dep_types: Vec<DepType>,
    /// Rewrite ranges to the installed version when it satisfies them.
    pub fix: bool,
    /// Names never checked, e.g. sibling workspace members.
    pub internal_ignore: Vec<String>,
}

/// Every entry of `opts.dep_types` must be pinned.
///
/// With `fix`, unsuppressed ranges are rewritten in `manifest` to the
/// installed version. A dependency that cannot be resolved during autofix
/// becomes an unfixable violation rather than an error.
pub fn check_exact_versions(
    manifest: &mut Manifest,
    path: &ManifestPath,
    lookup: &dyn DependencyLookup,
    opts: &ExactVersionsOptions,
    only_warns_for: &mut OnlyWarnsFor,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let mut reporter = sink.reporter(ids::CHECK_EXACT_VERSIONS, path);
    let mut first_error = FirstError::default();

    for &dep_type in &opts.dep_types {
        for (name, declared) in manifest.owned_entries(dep_type) {
            if opts.internal_ignore.contains(&name) || range::is_local_reference(&declared) {
                continue;
            }
            let version_range = match range::strip_npm_alias(&declared) {
                Ok(v) => v,
                Err(err) => {
                    first_error.record(err);
                    continue;
                }
            };
            if range::is_exact(version_range) {
                continue;
            }

            let title = format!("Unexpected range dependency in \"{dep_type}\" for \"{name}\"");
            let only_warn = only_warns_for.should_warn(&name);

            if !opts.fix || only_warn {
                // tags and URLs have nothing autofix could check the installed version against
                let fixable = !only_warn && range::is_valid_range(version_range);
                let detail = match range::with_operator(version_range, "") {
                    Some(exact) => format!("expecting \"{version_range}\" to be exact \"{exact}\"."),
                    None => format!("expecting \"{version_range}\" to be exact."),
                };
                reporter.report_fixable(title, Some(detail), only_warn, fixable);
                continue;
            }

            let installed = match lookup.lookup(&name) {
                Ok(dep) => dep.manifest.version().map(str::to_string),
                Err(_) => {
                    reporter.error(
                        title,
                        Some(format!(
                            "expecting \"{version_range}\" to be exact, autofix failed to resolve \"{name}\"."
                        )),
                    );
                    continue;
                }
            };

            match installed {
                Some(version)
                    if range::satisfies(&version, version_range, RangeOptions::default()) =>
                {
                    let pinned = range::replace_npm_alias_version(&declared, &version)?;
                    manifest.set_range(dep_type, &name, pinned);
                }
                Some(version) => reporter.error(
                    title,
                    Some(format!(
                        "expecting \"{version_range}\" to be exact, autofix failed as \"{name}\"'s resolved version is \"{version}\" and doesn't satisfy \"{version_range}\"."
                    )),
                ),
                None => reporter.error(
                    title,
                    Some(format!(
                        "expecting \"{version_range}\" to be exact, autofix failed as \"{name}\" has no version."
                    )),
                ),
            }
        }
    }

    if !first_error.is_set() {
        reporter.report_unconsumed(only_warns_for);
    }
    first_error.finish()
}
