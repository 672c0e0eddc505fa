//! Which sections a manifest may use, depending on the library policy.

use crate::model::DepType;
use crate::suppress::SuppressionConfig;
use std::collections::BTreeMap;

/// Sections whose entries are direct dependencies.
pub const REGULAR_DEP_TYPES: [DepType; 3] = [
    DepType::Dependencies,
    DepType::DevDependencies,
    DepType::OptionalDependencies,
];

/// Sections searched for duplicates of a dependency's own requirements.
pub const DUPLICATE_SEARCH_IN: [DepType; 2] = [DepType::DevDependencies, DepType::Dependencies];

/// Sections that must hold exact versions.
///
/// `dependencies` only joins the set when ranges are not allowed there.
pub fn exact_version_dep_types(allow_range_versions_in_dependencies: bool) -> &'static [DepType] {
    if allow_range_versions_in_dependencies {
        &[DepType::DevDependencies, DepType::Resolutions]
    } else {
        &[
            DepType::Dependencies,
            DepType::DevDependencies,
            DepType::Resolutions,
        ]
    }
}

/// Sections of the current manifest that may satisfy a peer requirement of a
/// dependency declared in `dep_type`.
///
/// Libraries forward peers of their runtime dependencies to their own
/// consumers through `peerDependencies`.
pub fn allowed_peer_sections(dep_type: DepType, library: bool) -> &'static [DepType] {
    match (dep_type, library) {
        (DepType::Dependencies, true) => &[DepType::Dependencies, DepType::PeerDependencies],
        (DepType::OptionalDependencies, true) => &[
            DepType::Dependencies,
            DepType::OptionalDependencies,
            DepType::PeerDependencies,
        ],
        (DepType::DevDependencies, _) => &[DepType::DevDependencies, DepType::Dependencies],
        _ => &[DepType::DevDependencies, DepType::Dependencies],
    }
}

/// `devDependencies or dependencies`.
pub fn describe_sections(sections: &[DepType]) -> String {
    sections
        .iter()
        .map(|s| s.key())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Suppressions for one dependency context of the recommended checks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencySuppressions {
    pub duplicate_direct_dependency: Vec<String>,
    pub missing_peer_dependency: Vec<String>,
    pub invalid_peer_dependency_version: Vec<String>,
}

impl DependencySuppressions {
    /// Per-key union; entries of `other` are appended after `self`'s.
    pub fn merged_with(&self, other: &DependencySuppressions) -> DependencySuppressions {
        fn union(a: &[String], b: &[String]) -> Vec<String> {
            let mut out = a.to_vec();
            for name in b {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            out
        }
        DependencySuppressions {
            duplicate_direct_dependency: union(
                &self.duplicate_direct_dependency,
                &other.duplicate_direct_dependency,
            ),
            missing_peer_dependency: union(
                &self.missing_peer_dependency,
                &other.missing_peer_dependency,
            ),
            invalid_peer_dependency_version: union(
                &self.invalid_peer_dependency_version,
                &other.invalid_peer_dependency_version,
            ),
        }
    }
}

/// Suppressions of the peer and duplicate checks of the recommended policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecommendedSuppressions {
    pub missing_peer: SuppressionConfig,
    /// `None` when the missing-peer suppressions answer for invalid peers too.
    pub invalid_peer: Option<SuppressionConfig>,
    pub duplicate_direct: SuppressionConfig,
}

/// Legacy flat lists or the unified per-dependency mapping.
///
/// The mapping wins when both are given; the returned flag tells the caller
/// to warn about the ignored legacy lists.
pub fn recommended_suppressions(
    mapping: Option<&BTreeMap<String, DependencySuppressions>>,
    legacy_peer: &[String],
    legacy_duplicate: &[String],
) -> (RecommendedSuppressions, bool) {
    let Some(mapping) = mapping else {
        return (
            RecommendedSuppressions {
                missing_peer: SuppressionConfig::Flat(legacy_peer.to_vec()),
                invalid_peer: None,
                duplicate_direct: SuppressionConfig::Flat(legacy_duplicate.to_vec()),
            },
            false,
        );
    };

    let pick = |select: fn(&DependencySuppressions) -> &Vec<String>| {
        SuppressionConfig::Scoped(
            mapping
                .iter()
                .map(|(key, entry)| (key.clone(), select(entry).clone()))
                .filter(|(_, names)| !names.is_empty())
                .collect(),
        )
    };
    let suppressions = RecommendedSuppressions {
        missing_peer: pick(|e| &e.missing_peer_dependency),
        invalid_peer: Some(pick(|e| &e.invalid_peer_dependency_version)),
        duplicate_direct: pick(|e| &e.duplicate_direct_dependency),
    };
    let deprecated = !legacy_peer.is_empty() || !legacy_duplicate.is_empty();
    (suppressions, deprecated)
}
