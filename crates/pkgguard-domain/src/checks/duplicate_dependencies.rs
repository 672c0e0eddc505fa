use super::utils::{FirstError, sections_declaring, unique_names};
use crate::lookup::DependencyLookup;
use crate::model::{DepType, Manifest};
use crate::policy::DUPLICATE_SEARCH_IN;
use crate::range::{self, INCLUDE_PRERELEASE};
use crate::report::{ReportSink, Reporter};
use crate::suppress::{OnlyWarnsForMapping, ScopedOnlyWarnsFor};
use crate::Error;
use pkgguard_types::{ManifestPath, ids};

/// What a dependency (or a sibling workspace member) requires.
struct Requirement<'a> {
    name: &'a str,
    manifest: &'a Manifest,
    dep_type: DepType,
}

/// Ranges the manifest declares for packages its direct dependencies also
/// depend on must overlap with what those dependencies require.
pub fn check_direct_duplicate_dependencies(
    manifest: &Manifest,
    path: &ManifestPath,
    lookup: &dyn DependencyLookup,
    only_warns_for: &mut OnlyWarnsForMapping,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let mut reporter = sink.reporter(ids::CHECK_DIRECT_DUPLICATE_DEPENDENCIES, path);
    let mut first_error = FirstError::default();

    for dep_name in unique_names(manifest, &DUPLICATE_SEARCH_IN) {
        let dependency = match lookup.lookup(&dep_name) {
            Ok(dependency) => dependency,
            Err(err) => {
                first_error.record(err);
                continue;
            }
        };
        let requirement = Requirement {
            name: dependency.display_name(),
            manifest: &dependency.manifest,
            dep_type: DepType::Dependencies,
        };
        let mut scoped = only_warns_for.scoped(&dep_name);
        if let Err(err) = check_duplicates(
            &mut reporter,
            manifest,
            &requirement,
            &DUPLICATE_SEARCH_IN,
            &mut scoped,
        ) {
            first_error.record(err);
        }
    }

    if first_error.is_set() {
        return first_error.finish();
    }
    reporter.report_unconsumed_mapping(only_warns_for);
    Ok(())
}

/// Compares one workspace member with another manifest of the same workspace
/// (the root or a member processed earlier).
///
/// Suppressions are looked up under `member_name`. Staleness is reported by
/// the caller once every pair has been compared.
pub fn check_monorepo_duplicate_dependencies(
    member: &Manifest,
    member_name: &str,
    member_path: &ManifestPath,
    other_name: &str,
    other: &Manifest,
    only_warns_for: &mut OnlyWarnsForMapping,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let mut reporter = sink.reporter(ids::CHECK_MONOREPO_DUPLICATE_DEPENDENCIES, member_path);
    let mut scoped = only_warns_for.scoped(member_name);

    let regular = [DepType::Dependencies, DepType::DevDependencies];
    for dep_type in regular {
        let requirement = Requirement {
            name: other_name,
            manifest: other,
            dep_type,
        };
        check_duplicates(&mut reporter, member, &requirement, &regular, &mut scoped)?;
    }

    let peers = Requirement {
        name: other_name,
        manifest: other,
        dep_type: DepType::PeerDependencies,
    };
    check_duplicates(
        &mut reporter,
        member,
        &peers,
        &[DepType::PeerDependencies],
        &mut scoped,
    )
}

fn check_duplicates(
    reporter: &mut Reporter<'_>,
    manifest: &Manifest,
    requirement: &Requirement<'_>,
    search_in: &[DepType],
    only_warns_for: &mut ScopedOnlyWarnsFor<'_>,
) -> Result<(), Error> {
    let search_in: Vec<DepType> = search_in
        .iter()
        .copied()
        .filter(|t| manifest.has_section(*t))
        .collect();

    for (name, required) in requirement.manifest.entries(requirement.dep_type) {
        if manifest.name() == Some(name) {
            continue;
        }
        let found_in = sections_declaring(manifest, &search_in, name);
        let section = match found_in.as_slice() {
            [] => continue,
            [section] => *section,
            sections => {
                reporter.error(
                    format!(
                        "\"{name}\" is present in both {}",
                        sections
                            .iter()
                            .map(|s| s.key())
                            .collect::<Vec<_>>()
                            .join(" and ")
                    ),
                    Some("please place it only in dependencies".to_string()),
                );
                continue;
            }
        };
        let Some(declared) = manifest.range(section, name) else {
            continue;
        };
        if range::is_local_reference(declared) || range::is_local_reference(required) {
            continue;
        }
        let declared_range = range::strip_npm_alias(declared)?;
        let required_range = range::strip_npm_alias(required)?;
        if !range::is_valid_range(declared_range) || !range::is_valid_range(required_range) {
            continue;
        }
        if range::intersects(declared_range, required_range)
            || range::min_version(declared_range)
                .is_some_and(|min| range::satisfies(&min, required_range, INCLUDE_PRERELEASE))
        {
            continue;
        }
        if manifest.range(DepType::Resolutions, name).is_some() {
            continue;
        }

        let only_warn = only_warns_for.should_warn(name);
        reporter.report(
            format!("Invalid duplicate dependency \"{name}\""),
            Some(format!(
                "\"{declared}\" (in {section}) should satisfies \"{required}\" from \"{}\" {}.",
                requirement.name, requirement.dep_type
            )),
            only_warn,
        );
    }
    Ok(())
}
