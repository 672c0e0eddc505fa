use crate::model::{
    CheckConfig, DependencySuppressionsConfig, MonorepoConfig, PkgguardConfigV1, RequiredRange,
    SuppressionListConfig,
};
use anyhow::{Context, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use pkgguard_domain::DepType;
use pkgguard_domain::checks::Requirements;
use pkgguard_domain::policy::DependencySuppressions;
use pkgguard_domain::suppress::SuppressionConfig;
use regex::Regex;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct ResolvedConfig {
    /// `None` follows the root manifest's `workspaces` field.
    pub workspaces: Option<bool>,
    pub recommended: ResolvedRecommended,
    pub checks: Vec<ResolvedCheck>,
    pub monorepo: ResolvedMonorepo,
}

/// Options of the recommended policy for one manifest.
#[derive(Clone, Debug, Default)]
pub struct ResolvedRecommended {
    pub library: bool,
    pub allow_range_versions_in_dependencies: Option<bool>,
    pub exact_versions_only_warns_for: Vec<String>,
    pub internal_exact_versions_ignore: Vec<String>,
    pub only_warns_for_in_dependencies: Option<BTreeMap<String, DependencySuppressions>>,
    pub peer_dependencies_only_warns_for: Vec<String>,
    pub direct_duplicate_dependencies_only_warns_for: Vec<String>,
    pub resolution_message_pattern: Option<Regex>,
}

impl ResolvedRecommended {
    /// Libraries may use ranges unless explicitly overridden.
    pub fn allows_range_versions_in_dependencies(&self) -> bool {
        self.allow_range_versions_in_dependencies
            .unwrap_or(self.library)
    }
}

/// Which workspace members are libraries, by name.
#[derive(Clone, Debug, Default)]
pub struct LibraryMatcher {
    set: Option<GlobSet>,
}

impl LibraryMatcher {
    pub fn new(patterns: &[String]) -> anyhow::Result<Self> {
        if patterns.is_empty() {
            return Ok(Self { set: None });
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .with_context(|| format!("invalid glob in monorepo.libraries: {pattern}"))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .context("failed to build monorepo.libraries glob set")?;
        Ok(Self { set: Some(set) })
    }

    pub fn is_library(&self, member_name: &str) -> bool {
        self.set
            .as_ref()
            .is_some_and(|set| set.is_match(member_name))
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResolvedMonorepo {
    pub libraries: LibraryMatcher,
    pub allow_range_versions_in_libraries: bool,
    /// Suppressions of the cross-member duplicate check, keyed by member name.
    pub duplicate_only_warns_for: SuppressionConfig,
    pub root_exact_versions_only_warns_for: Vec<String>,
    pub packages_exact_versions_only_warns_for: BTreeMap<String, Vec<String>>,
    pub root_dependencies: BTreeMap<String, DependencySuppressions>,
    pub packages_dependencies: BTreeMap<String, BTreeMap<String, DependencySuppressions>>,
    pub member_checks: BTreeMap<String, Vec<ResolvedCheck>>,
}

impl ResolvedMonorepo {
    /// The root package is never a library.
    pub fn root_options(&self, base: &ResolvedRecommended) -> ResolvedRecommended {
        ResolvedRecommended {
            library: false,
            allow_range_versions_in_dependencies: Some(
                base.allow_range_versions_in_dependencies.unwrap_or(false),
            ),
            exact_versions_only_warns_for: union(
                &base.exact_versions_only_warns_for,
                &self.root_exact_versions_only_warns_for,
            ),
            only_warns_for_in_dependencies: merge_dependency_mappings(
                base.only_warns_for_in_dependencies.as_ref(),
                Some(&self.root_dependencies),
            ),
            ..base.clone()
        }
    }

    /// Top-level and `*` entries apply to every member and are merged with the member's own.
    pub fn member_options(&self, base: &ResolvedRecommended, member: &str) -> ResolvedRecommended {
        let library = self.libraries.is_library(member);
        let no_exact = Vec::new();
        let exact = |key: &str| {
            self.packages_exact_versions_only_warns_for
                .get(key)
                .unwrap_or(&no_exact)
        };
        ResolvedRecommended {
            library,
            allow_range_versions_in_dependencies: Some(
                library && self.allow_range_versions_in_libraries,
            ),
            exact_versions_only_warns_for: union(
                &union(&base.exact_versions_only_warns_for, exact("*")),
                exact(member),
            ),
            only_warns_for_in_dependencies: merge_dependency_mappings(
                base.only_warns_for_in_dependencies.as_ref(),
                self.packages_dependencies.get(member),
            ),
            ..base.clone()
        }
    }

    pub fn member_checks(&self, member: &str) -> &[ResolvedCheck] {
        self.member_checks
            .get(member)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// An explicit check with validated section names.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedCheck {
    ExactDevVersions {
        only_warns_for: Vec<String>,
    },
    NoDependencies {
        dep_type: DepType,
        move_to: DepType,
    },
    IdenticalVersions {
        dep_type: DepType,
        groups: BTreeMap<String, Vec<String>>,
        only_warns_for: Vec<String>,
    },
    IdenticalVersionsThanDependency {
        dependency: String,
        dependency_section: DepType,
        dep_type: DepType,
        names: Vec<String>,
        only_warns_for: Vec<String>,
    },
    SatisfiesVersions {
        dep_type: DepType,
        requirements: Requirements,
        only_warns_for: Vec<String>,
    },
    SatisfiesVersionsFromDependency {
        dependency: String,
        dependency_section: DepType,
        dep_type: DepType,
        names: Vec<String>,
        only_warns_for: Vec<String>,
    },
    SatisfiesVersionsBetweenDependencies {
        source: String,
        target: String,
        dep_type: DepType,
        names: Vec<String>,
        only_warns_for: Vec<String>,
    },
    SatisfiesVersionsInDependency {
        dependency: String,
        dep_type: DepType,
        requirements: Requirements,
    },
}

pub fn resolve_config(cfg: PkgguardConfigV1) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != "pkgguard.config.v1"
    {
        bail!("unsupported config schema: {schema}");
    }

    let resolution_message_pattern = cfg
        .resolution_message_pattern
        .as_deref()
        .map(|pattern| {
            Regex::new(pattern)
                .with_context(|| format!("invalid resolution_message_pattern: {pattern}"))
        })
        .transpose()?;

    let recommended = ResolvedRecommended {
        library: cfg.library.unwrap_or(false),
        allow_range_versions_in_dependencies: cfg.allow_range_versions_in_dependencies,
        exact_versions_only_warns_for: cfg.exact_versions_only_warns_for,
        internal_exact_versions_ignore: cfg.internal_exact_versions_ignore,
        only_warns_for_in_dependencies: cfg
            .only_warns_for_in_dependencies
            .map(|mapping| resolve_dependency_mapping(&mapping)),
        peer_dependencies_only_warns_for: cfg.peer_dependencies_only_warns_for,
        direct_duplicate_dependencies_only_warns_for: cfg
            .direct_duplicate_dependencies_only_warns_for,
        resolution_message_pattern,
    };

    let checks = resolve_checks(&cfg.checks).context("invalid [[checks]]")?;
    let monorepo = resolve_monorepo(cfg.monorepo.unwrap_or_default())?;

    Ok(ResolvedConfig {
        workspaces: cfg.workspaces,
        recommended,
        checks,
        monorepo,
    })
}

fn resolve_monorepo(cfg: MonorepoConfig) -> anyhow::Result<ResolvedMonorepo> {
    let libraries = LibraryMatcher::new(&cfg.libraries)?;

    let duplicate_only_warns_for = match cfg.direct_duplicate_dependencies_only_warns_for {
        None => SuppressionConfig::default(),
        Some(SuppressionListConfig::List(names)) => SuppressionConfig::Flat(names),
        Some(SuppressionListConfig::Mapping(mapping)) => SuppressionConfig::Scoped(mapping),
    };

    let mut member_checks = BTreeMap::new();
    for (member, checks) in &cfg.member_checks {
        let resolved = resolve_checks(checks)
            .with_context(|| format!("invalid monorepo.member_checks for {member}"))?;
        member_checks.insert(member.clone(), resolved);
    }

    Ok(ResolvedMonorepo {
        libraries,
        allow_range_versions_in_libraries: cfg.allow_range_versions_in_libraries.unwrap_or(true),
        duplicate_only_warns_for,
        root_exact_versions_only_warns_for: cfg
            .only_warns_for_in_root_package
            .map(|p| p.exact_versions)
            .unwrap_or_default(),
        packages_exact_versions_only_warns_for: cfg
            .only_warns_for_in_packages
            .into_iter()
            .map(|(member, p)| (member, p.exact_versions))
            .collect(),
        root_dependencies: resolve_dependency_mapping(&cfg.only_warns_for_in_root_dependencies),
        packages_dependencies: cfg
            .only_warns_for_in_packages_dependencies
            .iter()
            .map(|(member, mapping)| (member.clone(), resolve_dependency_mapping(mapping)))
            .collect(),
        member_checks,
    })
}

fn resolve_checks(checks: &[CheckConfig]) -> anyhow::Result<Vec<ResolvedCheck>> {
    checks
        .iter()
        .enumerate()
        .map(|(index, check)| resolve_check(check).with_context(|| format!("check #{}", index + 1)))
        .collect()
}

fn resolve_check(check: &CheckConfig) -> anyhow::Result<ResolvedCheck> {
    let resolved = match check {
        CheckConfig::ExactDevVersions { only_warns_for } => ResolvedCheck::ExactDevVersions {
            only_warns_for: only_warns_for.clone(),
        },
        CheckConfig::NoDependencies { dep_type, move_to } => ResolvedCheck::NoDependencies {
            dep_type: dep_type
                .as_deref()
                .map(parse_dep_type)
                .transpose()?
                .unwrap_or(DepType::Dependencies),
            move_to: move_to
                .as_deref()
                .map(parse_dep_type)
                .transpose()?
                .unwrap_or(DepType::DevDependencies),
        },
        CheckConfig::IdenticalVersions {
            dep_type,
            groups,
            only_warns_for,
        } => ResolvedCheck::IdenticalVersions {
            dep_type: parse_dep_type(dep_type)?,
            groups: groups.clone(),
            only_warns_for: only_warns_for.clone(),
        },
        CheckConfig::IdenticalVersionsThanDependency {
            dependency,
            dep_type,
            names,
            only_warns_for,
        } => ResolvedCheck::IdenticalVersionsThanDependency {
            dependency: dependency.clone(),
            dependency_section: DepType::Dependencies,
            dep_type: parse_dep_type(dep_type)?,
            names: names.clone(),
            only_warns_for: only_warns_for.clone(),
        },
        CheckConfig::IdenticalVersionsThanDevDependencyOfDependency {
            dependency,
            dep_type,
            names,
            only_warns_for,
        } => ResolvedCheck::IdenticalVersionsThanDependency {
            dependency: dependency.clone(),
            dependency_section: DepType::DevDependencies,
            dep_type: parse_dep_type(dep_type)?,
            names: names.clone(),
            only_warns_for: only_warns_for.clone(),
        },
        CheckConfig::SatisfiesVersions {
            dep_type,
            versions,
            only_warns_for,
        } => ResolvedCheck::SatisfiesVersions {
            dep_type: parse_dep_type(dep_type)?,
            requirements: resolve_requirements(versions)?,
            only_warns_for: only_warns_for.clone(),
        },
        CheckConfig::SatisfiesVersionsFromDependency {
            dependency,
            dep_type,
            names,
            only_warns_for,
        } => ResolvedCheck::SatisfiesVersionsFromDependency {
            dependency: dependency.clone(),
            dependency_section: DepType::Dependencies,
            dep_type: parse_dep_type(dep_type)?,
            names: names.clone(),
            only_warns_for: only_warns_for.clone(),
        },
        CheckConfig::SatisfiesVersionsInDevDependenciesOfDependency {
            dependency,
            dep_type,
            names,
            only_warns_for,
        } => ResolvedCheck::SatisfiesVersionsFromDependency {
            dependency: dependency.clone(),
            dependency_section: DepType::DevDependencies,
            dep_type: parse_dep_type(dep_type)?,
            names: names.clone(),
            only_warns_for: only_warns_for.clone(),
        },
        CheckConfig::SatisfiesVersionsBetweenDependencies {
            source,
            target,
            dep_type,
            names,
            only_warns_for,
        } => ResolvedCheck::SatisfiesVersionsBetweenDependencies {
            source: source.clone(),
            target: target.clone(),
            dep_type: parse_dep_type(dep_type)?,
            names: names.clone(),
            only_warns_for: only_warns_for.clone(),
        },
        CheckConfig::SatisfiesVersionsInDependency {
            dependency,
            dep_type,
            versions,
        } => ResolvedCheck::SatisfiesVersionsInDependency {
            dependency: dependency.clone(),
            dep_type: parse_dep_type(dep_type)?,
            requirements: resolve_requirements(versions)?,
        },
    };
    Ok(resolved)
}

fn parse_dep_type(v: &str) -> anyhow::Result<DepType> {
    v.parse::<DepType>()
        .with_context(|| format!("invalid dependency type: {v}"))
}

fn resolve_requirements(versions: &BTreeMap<String, RequiredRange>) -> anyhow::Result<Requirements> {
    let mut requirements = Requirements::new();
    for (name, required) in versions {
        let required = match required {
            RequiredRange::Range(range) => Some(range.clone()),
            RequiredRange::Absent(false) => None,
            RequiredRange::Absent(true) => {
                bail!("invalid required version for {name}: use a range, or false when it must be absent")
            }
        };
        requirements.insert(name.clone(), required);
    }
    Ok(requirements)
}

fn resolve_dependency_mapping(
    mapping: &BTreeMap<String, DependencySuppressionsConfig>,
) -> BTreeMap<String, DependencySuppressions> {
    mapping
        .iter()
        .map(|(key, entry)| {
            (
                key.clone(),
                DependencySuppressions {
                    duplicate_direct_dependency: entry.duplicate_direct_dependency.clone(),
                    missing_peer_dependency: entry.missing_peer_dependency.clone(),
                    invalid_peer_dependency_version: entry.invalid_peer_dependency_version.clone(),
                },
            )
        })
        .collect()
}

/// Per dependency key, the two entries are unioned. `None` when neither side
/// has anything, so that the legacy flat lists still apply.
fn merge_dependency_mappings(
    base: Option<&BTreeMap<String, DependencySuppressions>>,
    extra: Option<&BTreeMap<String, DependencySuppressions>>,
) -> Option<BTreeMap<String, DependencySuppressions>> {
    let extra = extra.filter(|m| !m.is_empty());
    match (base, extra) {
        (None, None) => None,
        (Some(base), None) => Some(base.clone()),
        (None, Some(extra)) => Some(extra.clone()),
        (Some(base), Some(extra)) => {
            let mut merged = base.clone();
            for (key, entry) in extra {
                let combined = match merged.get(key) {
                    Some(existing) => existing.merged_with(entry),
                    None => entry.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            Some(merged)
        }
    }
}

fn union(a: &[String], b: &[String]) -> Vec<String> {
    let mut out = a.to_vec();
    for name in b {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}
