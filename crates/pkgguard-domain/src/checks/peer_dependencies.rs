use super::utils::{FirstError, sections_declaring};
use crate::lookup::DependencyLookup;
use crate::model::{DepType, DependencyManifest, Manifest};
use crate::policy::{REGULAR_DEP_TYPES, allowed_peer_sections, describe_sections};
use crate::range::{self, INCLUDE_PRERELEASE};
use crate::report::{ReportSink, Reporter};
use crate::suppress::OnlyWarnsForMapping;
use crate::Error;
use pkgguard_types::{ManifestPath, ids};

/// Suppressions of the peer check, keyed by the dependency declaring the peer.
///
/// A legacy flat list answers for both missing and invalid peers, so an entry
/// is stale only when neither kind of violation used it.
#[derive(Debug)]
pub struct PeerSuppressions {
    missing: OnlyWarnsForMapping,
    invalid: Option<OnlyWarnsForMapping>,
}

impl PeerSuppressions {
    pub fn separate(missing: OnlyWarnsForMapping, invalid: OnlyWarnsForMapping) -> Self {
        Self {
            missing,
            invalid: Some(invalid),
        }
    }

    pub fn shared(suppressions: OnlyWarnsForMapping) -> Self {
        Self {
            missing: suppressions,
            invalid: None,
        }
    }

    fn missing_mut(&mut self) -> &mut OnlyWarnsForMapping {
        &mut self.missing
    }

    fn invalid_mut(&mut self) -> &mut OnlyWarnsForMapping {
        match &mut self.invalid {
            Some(invalid) => invalid,
            None => &mut self.missing,
        }
    }
}

/// Peer requirements of every direct dependency must be met by the manifest.
pub fn check_direct_peer_dependencies(
    manifest: &Manifest,
    path: &ManifestPath,
    lookup: &dyn DependencyLookup,
    library: bool,
    suppressions: &mut PeerSuppressions,
    sink: &mut ReportSink,
) -> Result<(), Error> {
    let mut reporter = sink.reporter(ids::CHECK_PEER_DEPENDENCIES, path);
    let mut first_error = FirstError::default();

    for dep_type in REGULAR_DEP_TYPES {
        for (dep_name, _) in manifest.entries(dep_type) {
            let dependency = match lookup.lookup(dep_name) {
                Ok(dependency) => dependency,
                Err(err) => {
                    first_error.record(err);
                    continue;
                }
            };
            let allowed = allowed_peer_sections(dep_type, library);
            check_peers_of(
                &mut reporter,
                manifest,
                &dependency,
                dep_type.key(),
                allowed,
                suppressions,
            );
        }
    }

    if first_error.is_set() {
        return first_error.finish();
    }
    reporter.report_unconsumed_mapping(&suppressions.missing);
    if let Some(invalid) = &suppressions.invalid {
        reporter.report_unconsumed_mapping(invalid);
    }
    Ok(())
}

fn check_peers_of(
    reporter: &mut Reporter<'_>,
    manifest: &Manifest,
    dependency: &DependencyManifest,
    dep_type: &str,
    allowed: &[DepType],
    suppressions: &mut PeerSuppressions,
) {
    let dep_name = dependency.name.as_str();
    for (peer, required) in dependency.manifest.entries(DepType::PeerDependencies) {
        if manifest.name() == Some(peer) {
            continue;
        }
        let found_in = sections_declaring(manifest, allowed, peer);
        match found_in.as_slice() {
            [] => {
                if dependency.manifest.peer_is_optional(peer) {
                    continue;
                }
                let only_warn = suppressions.missing_mut().scoped(dep_name).should_warn(peer);
                reporter.report(
                    format!("Missing \"{peer}\" peer dependency from \"{dep_name}\" in {dep_type}"),
                    Some(format!(
                        "it should satisfies \"{required}\" and be in {}",
                        describe_sections(allowed)
                    )),
                    only_warn,
                );
            }
            [section] => {
                let Some(declared) = manifest.range(*section, peer) else {
                    continue;
                };
                if range::is_npm_alias(declared) || range::is_local_reference(declared) {
                    continue;
                }
                let satisfied = range::min_version(declared)
                    .is_some_and(|min| range::satisfies(&min, required, INCLUDE_PRERELEASE));
                if satisfied {
                    continue;
                }
                let only_warn = suppressions.invalid_mut().scoped(dep_name).should_warn(peer);
                reporter.report(
                    format!("Invalid \"{peer}\" peer dependency"),
                    Some(format!(
                        "\"{declared}\" (in {section}) should satisfies \"{required}\" from \"{dep_name}\" {dep_type}"
                    )),
                    only_warn,
                );
            }
            sections => {
                reporter.error(
                    format!("Invalid \"{peer}\" peer dependency"),
                    Some(format!(
                        "\"{peer}\" is present in {}, it should be in only one of them",
                        sections
                            .iter()
                            .map(|s| s.key())
                            .collect::<Vec<_>>()
                            .join(" and ")
                    )),
                );
            }
        }
    }
}
