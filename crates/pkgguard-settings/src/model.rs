use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `pkgguard.toml` schema v1.
///
/// This is a *user-facing* config model: every key is optional and a missing
/// file means defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PkgguardConfigV1 {
    /// Optional schema string for tooling (`pkgguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// The package is a library: ranges are allowed in dependencies and peers
    /// of runtime dependencies may be satisfied through peerDependencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<bool>,

    /// Overrides the library-derived default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_range_versions_in_dependencies: Option<bool>,

    /// Force monorepo mode on or off. Defaults to the presence of `workspaces`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspaces: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exact_versions_only_warns_for: Vec<String>,

    /// Names never checked for exact versions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub internal_exact_versions_ignore: Vec<String>,

    /// Unified suppressions keyed by the dependency that causes them (or `*`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_warns_for_in_dependencies: Option<BTreeMap<String, DependencySuppressionsConfig>>,

    /// Deprecated: use `only_warns_for_in_dependencies`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub peer_dependencies_only_warns_for: Vec<String>,

    /// Deprecated: use `only_warns_for_in_dependencies`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub direct_duplicate_dependencies_only_warns_for: Vec<String>,

    /// Regex every `resolutionsExplained` text must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_message_pattern: Option<String>,

    /// Extra checks for the package (the root package in monorepo mode).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CheckConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monorepo: Option<MonorepoConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DependencySuppressionsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicate_direct_dependency: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_peer_dependency: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_peer_dependency_version: Vec<String>,
}

/// Suppressions for one workspace package.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PackageSuppressionsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exact_versions: Vec<String>,
}

/// A flat list, or lists keyed by workspace member name (or `*`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SuppressionListConfig {
    List(Vec<String>),
    Mapping(BTreeMap<String, Vec<String>>),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MonorepoConfig {
    /// Glob patterns over member names that are libraries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<String>,

    /// Libraries may use ranges in dependencies (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_range_versions_in_libraries: Option<bool>,

    /// Suppressions of the cross-member duplicate check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_duplicate_dependencies_only_warns_for: Option<SuppressionListConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_warns_for_in_root_package: Option<PackageSuppressionsConfig>,

    /// Keyed by member name, or `*` for every member.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub only_warns_for_in_packages: BTreeMap<String, PackageSuppressionsConfig>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub only_warns_for_in_root_dependencies: BTreeMap<String, DependencySuppressionsConfig>,

    /// member name -> dependency (or `*`) -> suppressions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub only_warns_for_in_packages_dependencies:
        BTreeMap<String, BTreeMap<String, DependencySuppressionsConfig>>,

    /// Extra checks for one member, keyed by member name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub member_checks: BTreeMap<String, Vec<CheckConfig>>,
}

/// A required range, or `false` when the dependency must be absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RequiredRange {
    Range(String),
    Absent(bool),
}

fn default_dep_type() -> String {
    "dependencies".to_string()
}

/// An explicit check, tagged by `kind`.
///
/// The `*_than_dependency`, `*_from_dependency` and `*_between_dependencies` kinds
/// check `names` in the `dep_type` section (default `dependencies`) of the checked
/// manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum CheckConfig {
    ExactDevVersions {
        #[serde(default)]
        only_warns_for: Vec<String>,
    },
    NoDependencies {
        #[serde(default)]
        dep_type: Option<String>,
        #[serde(default)]
        move_to: Option<String>,
    },
    IdenticalVersions {
        dep_type: String,
        groups: BTreeMap<String, Vec<String>>,
        #[serde(default)]
        only_warns_for: Vec<String>,
    },
    IdenticalVersionsThanDependency {
        dependency: String,
        #[serde(default = "default_dep_type")]
        dep_type: String,
        names: Vec<String>,
        #[serde(default)]
        only_warns_for: Vec<String>,
    },
    IdenticalVersionsThanDevDependencyOfDependency {
        dependency: String,
        #[serde(default = "default_dep_type")]
        dep_type: String,
        names: Vec<String>,
        #[serde(default)]
        only_warns_for: Vec<String>,
    },
    SatisfiesVersions {
        dep_type: String,
        versions: BTreeMap<String, RequiredRange>,
        #[serde(default)]
        only_warns_for: Vec<String>,
    },
    SatisfiesVersionsFromDependency {
        dependency: String,
        #[serde(default = "default_dep_type")]
        dep_type: String,
        names: Vec<String>,
        #[serde(default)]
        only_warns_for: Vec<String>,
    },
    SatisfiesVersionsInDevDependenciesOfDependency {
        dependency: String,
        #[serde(default = "default_dep_type")]
        dep_type: String,
        names: Vec<String>,
        #[serde(default)]
        only_warns_for: Vec<String>,
    },
    SatisfiesVersionsBetweenDependencies {
        source: String,
        target: String,
        #[serde(default = "default_dep_type")]
        dep_type: String,
        names: Vec<String>,
        #[serde(default)]
        only_warns_for: Vec<String>,
    },
    SatisfiesVersionsInDependency {
        dependency: String,
        dep_type: String,
        versions: BTreeMap<String, RequiredRange>,
    },
}
