use crate::lookup::DependencyLookup;
use crate::model::{DepType, Manifest};
use crate::range::{self, RangeOptions};
use crate::report::{ReportSink, Reporter};
use crate::suppress::OnlyWarnsFor;
use crate::Error;
use pkgguard_types::{ManifestPath, ids};
use std::collections::BTreeMap;

/// Required ranges per name; `None` means the name must be absent.
pub type Requirements = BTreeMap<String, Option<String>>;

/// The minimum version of each declared range must satisfy the required range.
pub fn check_satisfies_versions(
    manifest: &Manifest,
    path: &ManifestPath,
    dep_type: DepType,
    requirements: &Requirements,
    only_warns_for: &mut OnlyWarnsFor,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let mut reporter = sink.reporter(ids::CHECK_SATISFIES_VERSIONS, path);
    for (name, required) in requirements {
        check_one(
            &mut reporter,
            manifest,
            dep_type,
            name,
            required.as_deref(),
            None,
            only_warns_for,
        )?;
    }
    reporter.report_unconsumed(only_warns_for);
    Ok(())
}

/// Names in `dep_type` must satisfy what `dependency` declares in its own
/// `dependency_section`.
#[derive(Clone, Copy, Debug)]
pub struct SatisfiesFromDependency<'a> {
    pub dependency: &'a str,
    pub dependency_section: DepType,
    pub dep_type: DepType,
    pub names: &'a [String],
}

pub fn check_satisfies_versions_from_dependency(
    manifest: &Manifest,
    path: &ManifestPath,
    lookup: &dyn DependencyLookup,
    opts: SatisfiesFromDependency<'_>,
    only_warns_for: &mut OnlyWarnsFor,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let check_id = match opts.dependency_section {
        DepType::DevDependencies => ids::CHECK_SATISFIES_VERSIONS_IN_DEV_DEPENDENCIES_OF_DEPENDENCY,
        _ => ids::CHECK_SATISFIES_VERSIONS_FROM_DEPENDENCY,
    };
    let source = lookup.lookup(opts.dependency)?;
    let mut reporter = sink.reporter(check_id, path);
    satisfy_from(
        &mut reporter,
        manifest,
        &source.manifest,
        opts,
        only_warns_for,
    )?;
    reporter.report_unconsumed(only_warns_for);
    Ok(())
}

/// `target`'s own `dep_type` entries must satisfy `source`'s `dependencies`.
#[derive(Clone, Copy, Debug)]
pub struct SatisfiesBetween<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub dep_type: DepType,
    pub names: &'a [String],
}

/// Compares two installed dependencies; violations are reported against the
/// target's manifest.
pub fn check_satisfies_versions_between_dependencies(
    lookup: &dyn DependencyLookup,
    opts: SatisfiesBetween<'_>,
    only_warns_for: &mut OnlyWarnsFor,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let source = lookup.lookup(opts.source)?;
    let target = lookup.lookup(opts.target)?;
    let mut reporter = sink.reporter(ids::CHECK_SATISFIES_VERSIONS_BETWEEN_DEPENDENCIES, &target.path);
    satisfy_from(
        &mut reporter,
        &target.manifest,
        &source.manifest,
        SatisfiesFromDependency {
            dependency: opts.source,
            dependency_section: DepType::Dependencies,
            dep_type: opts.dep_type,
            names: opts.names,
        },
        only_warns_for,
    )?;
    reporter.report_unconsumed(only_warns_for);
    Ok(())
}

/// Explicit requirements checked inside an installed dependency's manifest.
pub fn check_satisfies_versions_in_dependency(
    lookup: &dyn DependencyLookup,
    dependency: &str,
    dep_type: DepType,
    requirements: &Requirements,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let target = lookup.lookup(dependency)?;
    let mut reporter = sink.reporter(ids::CHECK_SATISFIES_VERSIONS_IN_DEPENDENCY, &target.path);
    let mut nothing_suppressed = OnlyWarnsFor::empty("satisfies_versions_in_dependency");
    for (name, required) in requirements {
        check_one(
            &mut reporter,
            &target.manifest,
            dep_type,
            name,
            required.as_deref(),
            None,
            &mut nothing_suppressed,
        )?;
    }
    Ok(())
}

fn satisfy_from(
    reporter: &mut Reporter<'_>,
    target: &Manifest,
    source: &Manifest,
    opts: SatisfiesFromDependency<'_>,
    only_warns_for: &mut OnlyWarnsFor,
) -> Result<(), Error> {
    for name in opts.names {
        let Some(required) = source.range(opts.dependency_section, name) else {
            reporter.error(
                format!(
                    "Unexpected missing dependency \"{name}\" in \"{}\"",
                    opts.dependency
                ),
                Some(format!(
                    "\"{}\" has no \"{name}\" in {}",
                    opts.dependency, opts.dependency_section
                )),
            );
            continue;
        };
        let from = format!("\"{}\" {}", opts.dependency, opts.dependency_section);
        check_one(
            reporter,
            target,
            opts.dep_type,
            name,
            Some(required),
            Some(&from),
            only_warns_for,
        )?;
    }
    Ok(())
}

fn check_one(
    reporter: &mut Reporter<'_>,
    target: &Manifest,
    dep_type: DepType,
    name: &str,
    required: Option<&str>,
    from: Option<&str>,
    only_warns_for: &mut OnlyWarnsFor,
) -> Result<(), Error> {
    let from = from.map(|f| format!(" from {f}")).unwrap_or_default();
    let declared = target.range(dep_type, name);

    match (declared, required) {
        (None, None) => {}
        (Some(declared), None) => {
            let only_warn = only_warns_for.should_warn(name);
            reporter.report(
                format!("Invalid \"{name}\" in {dep_type}"),
                Some(format!("\"{declared}\" should not be present{from}.")),
                only_warn,
            );
        }
        (None, Some(required)) => {
            let only_warn = only_warns_for.should_warn(name);
            reporter.report(
                format!("Missing \"{name}\" in {dep_type}"),
                Some(format!("should satisfies \"{required}\"{from}.")),
                only_warn,
            );
        }
        (Some(declared), Some(required)) => {
            if range::is_local_reference(declared) {
                return Ok(());
            }
            let declared_range = range::strip_npm_alias(declared)?;
            let satisfied = range::min_version(declared_range)
                .is_some_and(|min| range::satisfies(&min, required, RangeOptions::default()));
            if !satisfied {
                let only_warn = only_warns_for.should_warn(name);
                reporter.report(
                    format!("Invalid \"{name}\" in {dep_type}"),
                    Some(format!(
                        "\"{declared}\" (in \"{name}\") should satisfies \"{required}\"{from}."
                    )),
                    only_warn,
                );
            }
        }
    }
    Ok(())
}
