use crate::lookup::DependencyLookup;
use crate::model::{DepType, Manifest};
use crate::range;
use crate::report::{ReportSink, Reporter};
use crate::suppress::OnlyWarnsFor;
use crate::Error;
use pkgguard_types::{ManifestPath, ids};
use std::collections::BTreeMap;

/// For every `leader -> [followers]` group, followers must be declared in
/// `dep_type` with exactly the leader's version string.
pub fn check_identical_versions(
    manifest: &Manifest,
    path: &ManifestPath,
    dep_type: DepType,
    groups: &BTreeMap<String, Vec<String>>,
    only_warns_for: &mut OnlyWarnsFor,
    sink: &mut ReportSink,
) {
    let mut reporter = sink.reporter(ids::CHECK_IDENTICAL_VERSIONS, path);

    for (leader, followers) in groups {
        let Some(version) = manifest.range(dep_type, leader) else {
            reporter.error(
                format!("Unexpected missing {dep_type} for \"{leader}\""),
                None,
            );
            continue;
        };
        for follower in followers {
            expect_identical(
                &mut reporter,
                manifest,
                dep_type,
                follower,
                version,
                only_warns_for,
            );
        }
    }

    reporter.report_unconsumed(only_warns_for);
}

/// `names` in `dep_type` must use exactly the version `dependency` declares in
/// its own `dependency_section`.
#[derive(Clone, Copy, Debug)]
pub struct IdenticalThanDependency<'a> {
    pub dependency: &'a str,
    pub dependency_section: DepType,
    pub dep_type: DepType,
    pub names: &'a [String],
}

/// The reference must be an exact version: comparing ranges is what the
/// satisfies checks are for.
pub fn check_identical_versions_than_dependency(
    manifest: &Manifest,
    path: &ManifestPath,
    lookup: &dyn DependencyLookup,
    opts: IdenticalThanDependency<'_>,
    only_warns_for: &mut OnlyWarnsFor,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let IdenticalThanDependency {
        dependency,
        dependency_section,
        dep_type,
        names,
    } = opts;
    let check_id = match dependency_section {
        DepType::DevDependencies => ids::CHECK_IDENTICAL_VERSIONS_THAN_DEV_DEPENDENCY_OF_DEPENDENCY,
        _ => ids::CHECK_IDENTICAL_VERSIONS_THAN_DEPENDENCY,
    };
    let dep = lookup.lookup(dependency)?;
    let mut reporter = sink.reporter(check_id, path);

    for name in names {
        let Some(reference) = dep.manifest.range(dependency_section, name) else {
            reporter.error(
                format!("Unexpected missing dependency \"{name}\" in \"{dependency}\""),
                Some(format!("\"{dependency}\" has no \"{name}\" in {dependency_section}")),
            );
            continue;
        };
        if !range::is_exact(reference) {
            reporter.error(
                format!("Unsupported range \"{reference}\" for \"{name}\" in \"{dependency}\""),
                Some("use a satisfies check for ranges".to_string()),
            );
            continue;
        }
        expect_identical(
            &mut reporter,
            manifest,
            dep_type,
            name,
            reference,
            only_warns_for,
        );
    }

    reporter.report_unconsumed(only_warns_for);
    Ok(())
}

fn expect_identical(
    reporter: &mut Reporter<'_>,
    manifest: &Manifest,
    dep_type: DepType,
    name: &str,
    expected: &str,
    only_warns_for: &mut OnlyWarnsFor,
) {
    match manifest.range(dep_type, name) {
        None => {
            let only_warn = only_warns_for.should_warn(name);
            reporter.report(
                format!("Missing \"{name}\" in \"{dep_type}\""),
                Some(format!("it should be \"{expected}\".")),
                only_warn,
            );
        }
        Some(value) if value != expected => {
            let only_warn = only_warns_for.should_warn(name);
            reporter.report(
                format!("Invalid \"{name}\" in \"{dep_type}\""),
                Some(format!("expecting \"{value}\" to be \"{expected}\".")),
                only_warn,
            );
        }
        Some(_) => {}
    }
}
