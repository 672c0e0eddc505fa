//! One `package.json` and the queue of checks to run against it.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use pkgguard_domain::checks::{
    self, ExactVersionsOptions, IdenticalThanDependency, PeerSuppressions, SatisfiesBetween,
    SatisfiesFromDependency,
};
use pkgguard_domain::policy::{exact_version_dep_types, recommended_suppressions};
use pkgguard_domain::{DepType, Manifest, OnlyWarnsFor, OnlyWarnsForMapping, ReportSink};
use pkgguard_repo::NodeModulesResolver;
use pkgguard_settings::{ResolvedCheck, ResolvedRecommended};
use pkgguard_types::ManifestPath;
use regex::Regex;

/// Config name of the list attached to an explicit `[[checks]]` entry.
const CHECK_ONLY_WARNS_FOR: &str = "only_warns_for";

#[derive(Debug)]
enum Job {
    ExactVersions {
        dep_types: Vec<DepType>,
        internal_ignore: Vec<String>,
        only_warns_for: OnlyWarnsFor,
    },
    ResolutionsVersionsMatch,
    ResolutionsHasExplanation {
        pattern: Option<Regex>,
    },
    DirectPeerDependencies {
        library: bool,
        suppressions: PeerSuppressions,
    },
    DirectDuplicateDependencies {
        only_warns_for: OnlyWarnsForMapping,
    },
    NoDependencies {
        dep_type: DepType,
        move_to: DepType,
    },
    Configured(ResolvedCheck),
}

/// Checks one manifest.
///
/// Builder methods only enqueue; [`ManifestChecker::run`] drains the queue in
/// order and writes the manifest back once every job has completed, and only
/// when autofix is enabled and something changed.
#[derive(Debug)]
pub struct ManifestChecker {
    file: Utf8PathBuf,
    path: ManifestPath,
    snapshot: Manifest,
    manifest: Manifest,
    resolver: NodeModulesResolver,
    fix: bool,
    jobs: Vec<Job>,
}

impl ManifestChecker {
    /// Reads `<root>/<package_dir>/package.json`. `package_dir` is relative to
    /// `root` and only used for display (`.` for the root itself).
    pub fn open(root: &Utf8Path, package_dir: &str, fix: bool) -> anyhow::Result<Self> {
        let dir = root.join(package_dir);
        let file = dir.join("package.json");
        let manifest = pkgguard_repo::read_manifest(&file)?;
        let display_dir = ManifestPath::new(package_dir);
        Ok(Self {
            path: ManifestPath::for_package_dir(display_dir.as_str()),
            resolver: NodeModulesResolver::new(dir, display_dir),
            snapshot: manifest.clone(),
            manifest,
            file,
            fix,
            jobs: Vec::new(),
        })
    }

    pub fn path(&self) -> &ManifestPath {
        &self.path
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn name(&self) -> Option<&str> {
        self.manifest.name()
    }

    pub fn pending(&self) -> usize {
        self.jobs.len()
    }

    pub fn check_exact_versions(
        &mut self,
        allow_range_versions_in_dependencies: bool,
        only_warns_for: &[String],
        internal_ignore: &[String],
    ) -> &mut Self {
        self.jobs.push(Job::ExactVersions {
            dep_types: exact_version_dep_types(allow_range_versions_in_dependencies).to_vec(),
            internal_ignore: internal_ignore.to_vec(),
            only_warns_for: OnlyWarnsFor::from_list(
                "exact_versions_only_warns_for",
                only_warns_for.iter().cloned(),
            ),
        });
        self
    }

    pub fn check_exact_dev_versions(&mut self, only_warns_for: &[String]) -> &mut Self {
        self.jobs.push(Job::ExactVersions {
            dep_types: vec![DepType::DevDependencies],
            internal_ignore: Vec::new(),
            only_warns_for: OnlyWarnsFor::from_list(
                CHECK_ONLY_WARNS_FOR,
                only_warns_for.iter().cloned(),
            ),
        });
        self
    }

    pub fn check_resolutions_versions_match(&mut self) -> &mut Self {
        self.jobs.push(Job::ResolutionsVersionsMatch);
        self
    }

    /// `pattern`, when set, must match every explanation text.
    pub fn check_resolutions_has_explanation(&mut self, pattern: Option<Regex>) -> &mut Self {
        self.jobs.push(Job::ResolutionsHasExplanation { pattern });
        self
    }

    pub fn check_direct_peer_dependencies(
        &mut self,
        library: bool,
        suppressions: PeerSuppressions,
    ) -> &mut Self {
        self.jobs.push(Job::DirectPeerDependencies {
            library,
            suppressions,
        });
        self
    }

    pub fn check_direct_duplicate_dependencies(
        &mut self,
        only_warns_for: OnlyWarnsForMapping,
    ) -> &mut Self {
        self.jobs
            .push(Job::DirectDuplicateDependencies { only_warns_for });
        self
    }

    pub fn check_no_dependencies(&mut self, dep_type: DepType, move_to: DepType) -> &mut Self {
        self.jobs.push(Job::NoDependencies { dep_type, move_to });
        self
    }

    /// Enqueues an explicit check from `pkgguard.toml`.
    pub fn check(&mut self, check: ResolvedCheck) -> &mut Self {
        self.jobs.push(Job::Configured(check));
        self
    }

    /// The recommended policy: exact versions, resolutions, peers, duplicates.
    pub fn check_recommended(&mut self, opts: &ResolvedRecommended) -> &mut Self {
        let (suppressions, deprecated) = recommended_suppressions(
            opts.only_warns_for_in_dependencies.as_ref(),
            &opts.peer_dependencies_only_warns_for,
            &opts.direct_duplicate_dependencies_only_warns_for,
        );
        if deprecated {
            tracing::warn!(
                manifest = %self.path,
                "peer_dependencies_only_warns_for and direct_duplicate_dependencies_only_warns_for \
                 are deprecated and ignored when only_warns_for_in_dependencies is set"
            );
        }

        let peer_suppressions = match &suppressions.invalid_peer {
            Some(invalid) => PeerSuppressions::separate(
                OnlyWarnsForMapping::from_config("missing_peer_dependency", &suppressions.missing_peer),
                OnlyWarnsForMapping::from_config("invalid_peer_dependency_version", invalid),
            ),
            None => PeerSuppressions::shared(OnlyWarnsForMapping::from_config(
                "peer_dependencies_only_warns_for",
                &suppressions.missing_peer,
            )),
        };
        let duplicate_config_name = if opts.only_warns_for_in_dependencies.is_some() {
            "duplicate_direct_dependency"
        } else {
            "direct_duplicate_dependencies_only_warns_for"
        };

        self.check_exact_versions(
            opts.allows_range_versions_in_dependencies(),
            &opts.exact_versions_only_warns_for,
            &opts.internal_exact_versions_ignore,
        )
        .check_resolutions_versions_match()
        .check_resolutions_has_explanation(opts.resolution_message_pattern.clone())
        .check_direct_peer_dependencies(opts.library, peer_suppressions)
        .check_direct_duplicate_dependencies(OnlyWarnsForMapping::from_config(
            duplicate_config_name,
            &suppressions.duplicate_direct,
        ))
    }

    /// Runs every queued job. Returns `true` when the manifest was written back.
    pub fn run(&mut self, sink: &mut ReportSink) -> anyhow::Result<bool> {
        let jobs = std::mem::take(&mut self.jobs);
        for job in jobs {
            tracing::debug!(manifest = %self.path, job = job.label(), "running check");
            self.execute(job, sink)
                .with_context(|| format!("check failed for {}", self.path))?;
        }

        if !self.fix || self.manifest == self.snapshot {
            return Ok(false);
        }
        pkgguard_repo::write_manifest(&self.file, &self.manifest)?;
        self.snapshot = self.manifest.clone();
        Ok(true)
    }

    fn execute(&mut self, job: Job, sink: &mut ReportSink) -> anyhow::Result<()> {
        let path = &self.path;
        let lookup = &self.resolver;
        match job {
            Job::ExactVersions {
                dep_types,
                internal_ignore,
                mut only_warns_for,
            } => {
                let opts = ExactVersionsOptions {
                    dep_types,
                    fix: self.fix,
                    internal_ignore,
                };
                checks::check_exact_versions(
                    &mut self.manifest,
                    path,
                    lookup,
                    &opts,
                    &mut only_warns_for,
                    sink,
                )?;
            }
            Job::ResolutionsVersionsMatch => {
                checks::check_resolutions_versions_match(&mut self.manifest, path, self.fix, sink)?;
            }
            Job::ResolutionsHasExplanation { pattern } => {
                let validate = |_: &str, text: &str| match &pattern {
                    Some(re) if !re.is_match(text) => {
                        Some(format!("explanation should match \"{}\"", re.as_str()))
                    }
                    _ => None,
                };
                let validator: Option<checks::ExplanationValidator<'_>> = if pattern.is_some() {
                    Some(&validate)
                } else {
                    None
                };
                checks::check_resolutions_has_explanation(&self.manifest, path, validator, sink);
            }
            Job::DirectPeerDependencies {
                library,
                mut suppressions,
            } => {
                checks::check_direct_peer_dependencies(
                    &self.manifest,
                    path,
                    lookup,
                    library,
                    &mut suppressions,
                    sink,
                )?;
            }
            Job::DirectDuplicateDependencies { mut only_warns_for } => {
                checks::check_direct_duplicate_dependencies(
                    &self.manifest,
                    path,
                    lookup,
                    &mut only_warns_for,
                    sink,
                )?;
            }
            Job::NoDependencies { dep_type, move_to } => {
                checks::check_no_dependencies(&self.manifest, path, dep_type, move_to, sink);
            }
            Job::Configured(check) => {
                run_configured(&mut self.manifest, path, lookup, self.fix, check, sink)?;
            }
        }
        Ok(())
    }
}

impl Job {
    fn label(&self) -> &'static str {
        match self {
            Job::ExactVersions { .. } => "exact_versions",
            Job::ResolutionsVersionsMatch => "resolutions_versions_match",
            Job::ResolutionsHasExplanation { .. } => "resolutions_has_explanation",
            Job::DirectPeerDependencies { .. } => "peer_dependencies",
            Job::DirectDuplicateDependencies { .. } => "direct_duplicate_dependencies",
            Job::NoDependencies { .. } => "no_dependencies",
            Job::Configured(_) => "configured",
        }
    }
}

fn run_configured(
    manifest: &mut Manifest,
    path: &ManifestPath,
    lookup: &NodeModulesResolver,
    fix: bool,
    check: ResolvedCheck,
    sink: &mut ReportSink,
) -> anyhow::Result<()> {
    let tracker = |names: &[String]| OnlyWarnsFor::from_list(CHECK_ONLY_WARNS_FOR, names.iter().cloned());
    match check {
        ResolvedCheck::ExactDevVersions { only_warns_for } => {
            let opts = ExactVersionsOptions {
                dep_types: vec![DepType::DevDependencies],
                fix,
                internal_ignore: Vec::new(),
            };
            checks::check_exact_versions(
                manifest,
                path,
                lookup,
                &opts,
                &mut tracker(&only_warns_for),
                sink,
            )?;
        }
        ResolvedCheck::NoDependencies { dep_type, move_to } => {
            checks::check_no_dependencies(manifest, path, dep_type, move_to, sink);
        }
        ResolvedCheck::IdenticalVersions {
            dep_type,
            groups,
            only_warns_for,
        } => {
            checks::check_identical_versions(
                manifest,
                path,
                dep_type,
                &groups,
                &mut tracker(&only_warns_for),
                sink,
            );
        }
        ResolvedCheck::IdenticalVersionsThanDependency {
            dependency,
            dependency_section,
            dep_type,
            names,
            only_warns_for,
        } => {
            checks::check_identical_versions_than_dependency(
                manifest,
                path,
                lookup,
                IdenticalThanDependency {
                    dependency: &dependency,
                    dependency_section,
                    dep_type,
                    names: &names,
                },
                &mut tracker(&only_warns_for),
                sink,
            )?;
        }
        ResolvedCheck::SatisfiesVersions {
            dep_type,
            requirements,
            only_warns_for,
        } => {
            checks::check_satisfies_versions(
                manifest,
                path,
                dep_type,
                &requirements,
                &mut tracker(&only_warns_for),
                sink,
            )?;
        }
        ResolvedCheck::SatisfiesVersionsFromDependency {
            dependency,
            dependency_section,
            dep_type,
            names,
            only_warns_for,
        } => {
            checks::check_satisfies_versions_from_dependency(
                manifest,
                path,
                lookup,
                SatisfiesFromDependency {
                    dependency: &dependency,
                    dependency_section,
                    dep_type,
                    names: &names,
                },
                &mut tracker(&only_warns_for),
                sink,
            )?;
        }
        ResolvedCheck::SatisfiesVersionsBetweenDependencies {
            source,
            target,
            dep_type,
            names,
            only_warns_for,
        } => {
            checks::check_satisfies_versions_between_dependencies(
                lookup,
                SatisfiesBetween {
                    source: &source,
                    target: &target,
                    dep_type,
                    names: &names,
                },
                &mut tracker(&only_warns_for),
                sink,
            )?;
        }
        ResolvedCheck::SatisfiesVersionsInDependency {
            dependency,
            dep_type,
            requirements,
        } => {
            checks::check_satisfies_versions_in_dependency(
                lookup,
                &dependency,
                dep_type,
                &requirements,
                sink,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TempPackage, titles};
    use pkgguard_types::{Severity, ids};

    #[test]
    fn builder_only_enqueues_until_run() {
        let pkg = TempPackage::new();
        pkg.write("package.json", r#"{ "name": "app", "devDependencies": { "a": "^1.0.0" } }"#);
        pkg.write("node_modules/a/package.json", r#"{ "name": "a", "version": "1.2.0" }"#);

        let mut checker = ManifestChecker::open(pkg.root(), ".", false).expect("open");
        checker
            .check_exact_versions(false, &[], &[])
            .check_no_dependencies(DepType::Dependencies, DepType::DevDependencies);
        assert_eq!(checker.pending(), 2);

        let mut sink = ReportSink::new();
        let written = checker.run(&mut sink).expect("run");
        assert!(!written);
        assert_eq!(checker.pending(), 0);
        assert_eq!(
            titles(&sink),
            vec!["Unexpected range dependency in \"devDependencies\" for \"a\""]
        );
    }

    #[test]
    fn autofix_writes_back_once_after_all_jobs() {
        let pkg = TempPackage::new();
        pkg.write(
            "package.json",
            r#"{
  "name": "app",
  "dependencies": { "a": "^1.0.0" },
  "devDependencies": { "b": "~2.0.0" }
}"#,
        );
        pkg.write("node_modules/a/package.json", r#"{ "name": "a", "version": "1.4.2" }"#);
        pkg.write("node_modules/b/package.json", r#"{ "name": "b", "version": "2.0.7" }"#);

        let mut checker = ManifestChecker::open(pkg.root(), ".", true).expect("open");
        checker.check_recommended(&ResolvedRecommended::default());
        let mut sink = ReportSink::new();
        assert!(checker.run(&mut sink).expect("run"));
        assert!(sink.is_empty(), "unexpected: {:?}", titles(&sink));

        let written = pkg.read("package.json");
        assert!(written.contains("\"a\": \"1.4.2\""));
        assert!(written.contains("\"b\": \"2.0.7\""));
        assert!(written.ends_with("}\n"));

        // nothing left to fix
        checker.check_recommended(&ResolvedRecommended::default());
        let mut again = ReportSink::new();
        assert!(!checker.run(&mut again).expect("second run"));
        assert!(again.is_empty());
    }

    #[test]
    fn explanation_pattern_rejects_non_matching_text() {
        let pkg = TempPackage::new();
        pkg.write(
            "package.json",
            r#"{
  "name": "app",
  "resolutions": { "lodash": "4.17.21", "minimist": "1.2.8" },
  "resolutionsExplained": { "lodash": "security fix", "minimist": "see JIRA-42" }
}"#,
        );
        let mut checker = ManifestChecker::open(pkg.root(), ".", false).expect("open");
        let pattern = Regex::new(r"[A-Z]+-\d+").expect("regex");
        checker.check_resolutions_has_explanation(Some(pattern));
        let mut sink = ReportSink::new();
        checker.run(&mut sink).expect("run");

        assert_eq!(titles(&sink), vec!["Invalid \"lodash\" in resolutionsExplained"]);
        assert_eq!(
            sink.violations()[0].detail.as_deref(),
            Some("explanation should match \"[A-Z]+-\\d+\"")
        );
    }

    #[test]
    fn legacy_peer_list_is_shared_between_missing_and_invalid() {
        let pkg = TempPackage::new();
        pkg.write(
            "package.json",
            r#"{ "name": "app", "dependencies": { "react-dom": "18.0.0", "react": "17.0.2" } }"#,
        );
        pkg.write(
            "node_modules/react-dom/package.json",
            r#"{ "name": "react-dom", "version": "18.0.0", "peerDependencies": { "react": "^18.0.0" } }"#,
        );
        pkg.write("node_modules/react/package.json", r#"{ "name": "react", "version": "17.0.2" }"#);

        let opts = ResolvedRecommended {
            peer_dependencies_only_warns_for: vec!["react".to_string()],
            ..ResolvedRecommended::default()
        };
        let mut checker = ManifestChecker::open(pkg.root(), ".", false).expect("open");
        checker.check_recommended(&opts);
        let mut sink = ReportSink::new();
        checker.run(&mut sink).expect("run");

        let peers: Vec<_> = sink
            .violations()
            .iter()
            .filter(|v| v.check_id == ids::CHECK_PEER_DEPENDENCIES)
            .collect();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].severity, Severity::Warning);
    }

    #[test]
    fn missing_dependency_aborts_with_context() {
        let pkg = TempPackage::new();
        pkg.write("package.json", r#"{ "name": "app", "dependencies": { "ghost": "1.0.0" } }"#);
        let mut checker = ManifestChecker::open(pkg.root(), ".", false).expect("open");
        checker.check_direct_duplicate_dependencies(OnlyWarnsForMapping::empty("x"));
        let err = checker.run(&mut ReportSink::new()).expect_err("should fail");
        let text = format!("{err:#}");
        assert!(text.contains("check failed for package.json"));
        assert!(text.contains("\"ghost\""));
    }

    #[test]
    fn configured_checks_report_against_the_right_manifest() {
        let pkg = TempPackage::new();
        pkg.write(
            "package.json",
            r#"{ "name": "app", "devDependencies": { "@babel/core": "7.20.0", "@babel/types": "7.19.0" } }"#,
        );
        pkg.write(
            "node_modules/@babel/core/package.json",
            r#"{ "name": "@babel/core", "version": "7.20.0", "dependencies": { "@babel/types": "^7.20.0" } }"#,
        );

        let mut checker = ManifestChecker::open(pkg.root(), ".", false).expect("open");
        checker.check(ResolvedCheck::SatisfiesVersionsFromDependency {
            dependency: "@babel/core".to_string(),
            dependency_section: DepType::Dependencies,
            dep_type: DepType::DevDependencies,
            names: vec!["@babel/types".to_string()],
            only_warns_for: Vec::new(),
        });
        let mut sink = ReportSink::new();
        checker.run(&mut sink).expect("run");

        assert_eq!(titles(&sink), vec!["Invalid \"@babel/types\" in devDependencies"]);
        assert_eq!(sink.violations()[0].manifest.as_str(), "package.json");
        assert_eq!(
            sink.violations()[0].check_id,
            ids::CHECK_SATISFIES_VERSIONS_FROM_DEPENDENCY
        );
    }
}
