use crate::model::{DepType, Manifest};
use crate::range::{self, RangeOptions};
use crate::report::ReportSink;
use crate::Error;
use pkgguard_types::{ManifestPath, ids};

/// Rejects an explanation text with a reason, e.g. a missing ticket reference.
pub type ExplanationValidator<'a> = &'a dyn Fn(&str, &str) -> Option<String>;

const PATCH_KEY_MARKER: &str = "@npm:";

/// `(dependency name, pinned version)` of a `resolutions` entry.
///
/// Yarn patch entries are keyed `name@npm:version` with a `patch:` value; the
/// version then comes from the key.
fn pinned_resolution<'a>(key: &'a str, value: &'a str) -> Result<Option<(&'a str, &'a str)>, Error> {
    if value.starts_with("patch:") {
        return Ok(key
            .rfind(PATCH_KEY_MARKER)
            .filter(|&at| at > 0)
            .map(|at| (&key[..at], &key[at + PATCH_KEY_MARKER.len()..])));
    }
    if range::is_local_reference(value) {
        return Ok(None);
    }
    Ok(Some((key, range::strip_npm_alias(value)?)))
}

/// Entries also declared in dependencies/devDependencies must admit the
/// pinned resolution. With `fix`, the entry is rewritten to the pinned version.
pub fn check_resolutions_versions_match(
    manifest: &mut Manifest,
    path: &ManifestPath,
    fix: bool,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let mut reporter = sink.reporter(ids::CHECK_RESOLUTIONS_VERSIONS_MATCH, path);

    for (key, value) in manifest.owned_entries(DepType::Resolutions) {
        let Some((name, pinned)) = pinned_resolution(&key, &value)? else {
            continue;
        };
        for dep_type in [DepType::Dependencies, DepType::DevDependencies] {
            let Some(declared) = manifest.range(dep_type, name).map(str::to_string) else {
                continue;
            };
            if range::is_local_reference(&declared) {
                continue;
            }
            let declared_range = range::strip_npm_alias(&declared)?;
            if range::satisfies(pinned, declared_range, RangeOptions::default()) {
                continue;
            }
            if fix {
                let rewritten = range::replace_npm_alias_version(&declared, pinned)?;
                manifest.set_range(dep_type, name, rewritten);
            } else {
                reporter.report_fixable(
                    format!("Invalid \"{name}\" in {dep_type}"),
                    Some(format!(
                        "expecting \"{declared}\" be \"{pinned}\" from resolutions."
                    )),
                    false,
                    true,
                );
            }
        }
    }
    Ok(())
}

/// `resolutions` and `resolutionsExplained` must have the same keys.
pub fn check_resolutions_has_explanation(
    manifest: &Manifest,
    path: &ManifestPath,
    validator: Option<ExplanationValidator<'_>>,
    sink: &mut ReportSink,
) {
    let mut reporter = sink.reporter(ids::CHECK_RESOLUTIONS_HAS_EXPLANATION, path);

    for (name, _) in manifest.entries(DepType::Resolutions) {
        match manifest.resolution_explanation(name) {
            None => reporter.error(format!("Missing \"{name}\" in resolutionsExplained."), None),
            Some(text) => {
                if let Some(reason) = validator.and_then(|validate| validate(name, text)) {
                    reporter.error(
                        format!("Invalid \"{name}\" in resolutionsExplained"),
                        Some(reason),
                    );
                }
            }
        }
    }

    for (name, _) in manifest.resolutions_explained() {
        if manifest.range(DepType::Resolutions, name).is_none() {
            reporter.error(
                format!("Found \"{name}\" in resolutionsExplained but not in resolutions"),
                None,
            );
        }
    }
}
