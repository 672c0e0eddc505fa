//! Monorepo orchestration: the root package plus every workspace member.

use crate::checker::ManifestChecker;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use pkgguard_domain::checks::check_monorepo_duplicate_dependencies;
use pkgguard_domain::{DepType, Error, OnlyWarnsForMapping, ReportSink};
use pkgguard_settings::{ResolvedMonorepo, ResolvedRecommended};
use pkgguard_types::{ManifestPath, ids};

/// Display name of the root package when it has no `name`.
const ROOT_NAME: &str = "root";

#[derive(Debug)]
struct Member {
    name: String,
    checker: ManifestChecker,
}

/// Checks a workspace root and its members.
///
/// Members are kept in discovery order (sorted by directory), which is also
/// the order of the pairwise duplicate comparison: a member is only compared
/// with the root and with members before it.
#[derive(Debug)]
pub struct WorkspaceChecker {
    root_dir: Utf8PathBuf,
    root: ManifestChecker,
    members: Vec<Member>,
    monorepo_duplicates: Option<OnlyWarnsForMapping>,
}

impl WorkspaceChecker {
    pub fn open(root_dir: &Utf8Path, fix: bool) -> anyhow::Result<Self> {
        let root = ManifestChecker::open(root_dir, ".", fix)?;
        Self::from_root(root_dir, root, fix)
    }

    /// Discovers members from the root manifest's `workspaces` field.
    pub fn from_root(root_dir: &Utf8Path, root: ManifestChecker, fix: bool) -> anyhow::Result<Self> {
        let patterns = root
            .manifest()
            .workspaces(root.path())?
            .ok_or_else(|| Error::MissingWorkspaces {
                path: root.path().to_string(),
            })?;

        let dirs = pkgguard_repo::discover_workspace_members(root_dir, &patterns)
            .context("discover workspace members")?;
        tracing::debug!(count = dirs.len(), "discovered workspace members");

        let mut members = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let checker = ManifestChecker::open(root_dir, dir.as_str(), fix)
                .with_context(|| format!("read workspace member {dir}"))?;
            let name = checker
                .name()
                .map(str::to_string)
                .ok_or_else(|| Error::MissingMemberName(checker.path().to_string()))?;
            members.push(Member { name, checker });
        }

        Ok(Self {
            root_dir: root_dir.to_path_buf(),
            root,
            members,
            monorepo_duplicates: None,
        })
    }

    pub fn root_dir(&self) -> &Utf8Path {
        &self.root_dir
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn for_root(&mut self, f: impl FnOnce(&mut ManifestChecker)) -> &mut Self {
        f(&mut self.root);
        self
    }

    pub fn for_each(&mut self, mut f: impl FnMut(&str, &mut ManifestChecker)) -> &mut Self {
        for member in &mut self.members {
            f(&member.name, &mut member.checker);
        }
        self
    }

    pub fn for_member(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut ManifestChecker),
    ) -> Result<&mut Self, Error> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| Error::UnknownWorkspaceMember(name.to_string()))?;
        f(&mut member.checker);
        Ok(self)
    }

    /// Recommended policy for the whole workspace.
    ///
    /// The root must not declare `dependencies`. Member names are exempt from
    /// the exact check everywhere, and the pairwise duplicate comparison is
    /// enabled for [`WorkspaceChecker::run`].
    pub fn check_recommended(
        &mut self,
        base: &ResolvedRecommended,
        monorepo: &ResolvedMonorepo,
    ) -> &mut Self {
        let member_names: Vec<String> = self.members.iter().map(|m| m.name.clone()).collect();
        let with_internal_ignore = |mut opts: ResolvedRecommended| {
            for name in &member_names {
                if !opts.internal_exact_versions_ignore.contains(name) {
                    opts.internal_exact_versions_ignore.push(name.clone());
                }
            }
            opts
        };

        let root_opts = with_internal_ignore(monorepo.root_options(base));
        self.root
            .check_no_dependencies(DepType::Dependencies, DepType::DevDependencies)
            .check_recommended(&root_opts);

        for member in &mut self.members {
            let opts = with_internal_ignore(monorepo.member_options(base, &member.name));
            tracing::debug!(member = %member.name, library = opts.library, "queue recommended checks");
            member.checker.check_recommended(&opts);
        }

        self.monorepo_duplicates = Some(OnlyWarnsForMapping::from_config(
            "monorepo.direct_duplicate_dependencies_only_warns_for",
            &monorepo.duplicate_only_warns_for,
        ));
        self
    }

    /// Runs the root, then each member followed by its pairwise comparisons.
    ///
    /// Returns the manifests written back by autofix. Any error aborts the
    /// whole run.
    pub fn run(&mut self, sink: &mut ReportSink) -> anyhow::Result<Vec<ManifestPath>> {
        let mut fixed = Vec::new();
        if self.root.run(sink)? {
            fixed.push(self.root.path().clone());
        }

        let root_name = self.root.name().unwrap_or(ROOT_NAME).to_string();
        for index in 0..self.members.len() {
            if self.members[index].checker.run(sink)? {
                fixed.push(self.members[index].checker.path().clone());
            }

            let Some(tracker) = self.monorepo_duplicates.as_mut() else {
                continue;
            };
            let (earlier, rest) = self.members.split_at(index);
            let member = &rest[0];
            let others = std::iter::once((root_name.as_str(), self.root.manifest())).chain(
                earlier
                    .iter()
                    .map(|m| (m.name.as_str(), m.checker.manifest())),
            );
            for (other_name, other) in others {
                check_monorepo_duplicate_dependencies(
                    member.checker.manifest(),
                    &member.name,
                    member.checker.path(),
                    other_name,
                    other,
                    tracker,
                    sink,
                )
                .with_context(|| {
                    format!("compare {} with {other_name}", member.checker.path())
                })?;
            }
        }

        if let Some(tracker) = self.monorepo_duplicates.take() {
            sink.reporter(ids::CHECK_MONOREPO_DUPLICATE_DEPENDENCIES, self.root.path())
                .report_unconsumed_mapping(&tracker);
        }
        Ok(fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TempPackage, titles};
    use pkgguard_types::Severity;

    fn workspace(members: &[(&str, &str)]) -> TempPackage {
        let pkg = TempPackage::new();
        pkg.write(
            "package.json",
            r#"{ "name": "monorepo", "private": true, "workspaces": ["packages/*"] }"#,
        );
        for (dir, json) in members {
            pkg.write(&format!("packages/{dir}/package.json"), json);
        }
        pkg
    }

    fn monorepo(toml: &str) -> (ResolvedRecommended, ResolvedMonorepo) {
        let cfg = pkgguard_settings::parse_config_toml(toml).expect("parse");
        let resolved = pkgguard_settings::resolve_config(cfg).expect("resolve");
        (resolved.recommended, resolved.monorepo)
    }

    fn monorepo_titles(sink: &ReportSink) -> Vec<(&str, &str)> {
        sink.violations()
            .iter()
            .filter(|v| v.check_id == ids::CHECK_MONOREPO_DUPLICATE_DEPENDENCIES)
            .map(|v| (v.manifest.as_str(), v.title.as_str()))
            .collect()
    }

    #[test]
    fn members_are_discovered_in_sorted_order() {
        let pkg = workspace(&[
            ("b", r#"{ "name": "@acme/b" }"#),
            ("a", r#"{ "name": "@acme/a" }"#),
        ]);
        let ws = WorkspaceChecker::open(pkg.root(), false).expect("open");
        assert_eq!(ws.member_names(), vec!["@acme/a", "@acme/b"]);
    }

    #[test]
    fn unknown_member_is_a_configuration_error() {
        let pkg = workspace(&[("a", r#"{ "name": "@acme/a" }"#)]);
        let mut ws = WorkspaceChecker::open(pkg.root(), false).expect("open");
        assert!(ws.for_member("@acme/a", |_| {}).is_ok());
        let err = ws.for_member("@acme/zzz", |_| {}).expect_err("unknown");
        assert_eq!(err.to_string(), "invalid package name: @acme/zzz");
    }

    #[test]
    fn member_without_name_is_rejected() {
        let pkg = workspace(&[("a", r#"{ "version": "1.0.0" }"#)]);
        let err = WorkspaceChecker::open(pkg.root(), false).expect_err("no name");
        assert!(format!("{err:#}").contains("has no \"name\""));
    }

    #[test]
    fn root_without_workspaces_is_rejected() {
        let pkg = TempPackage::new();
        pkg.write("package.json", r#"{ "name": "solo" }"#);
        let err = WorkspaceChecker::open(pkg.root(), false).expect_err("no workspaces");
        assert!(format!("{err:#}").contains("missing \"workspaces\""));
    }

    #[test]
    fn root_may_not_declare_dependencies() {
        let pkg = TempPackage::new();
        pkg.write(
            "package.json",
            r#"{ "name": "monorepo", "workspaces": [], "dependencies": { "left-pad": "1.3.0" } }"#,
        );
        pkg.write("node_modules/left-pad/package.json", r#"{ "name": "left-pad", "version": "1.3.0" }"#);
        let (base, mono) = monorepo("");
        let mut ws = WorkspaceChecker::open(pkg.root(), false).expect("open");
        let mut sink = ReportSink::new();
        ws.check_recommended(&base, &mono).run(&mut sink).expect("run");
        assert_eq!(titles(&sink), vec!["Unexpected dependencies"]);
    }

    #[test]
    fn pairwise_check_only_looks_backwards() {
        // a and b conflict on lodash; c agrees with a and conflicts with b.
        let pkg = workspace(&[
            ("a", r#"{ "name": "a", "devDependencies": { "lodash": "4.17.21" } }"#),
            ("b", r#"{ "name": "b", "devDependencies": { "lodash": "3.10.1" } }"#),
            ("c", r#"{ "name": "c", "devDependencies": { "lodash": "4.17.21" } }"#),
        ]);
        pkg.write("node_modules/lodash/package.json", r#"{ "name": "lodash", "version": "4.17.21" }"#);

        let (base, mono) = monorepo("");
        let mut ws = WorkspaceChecker::open(pkg.root(), false).expect("open");
        let mut sink = ReportSink::new();
        ws.check_recommended(&base, &mono).run(&mut sink).expect("run");

        let found = monorepo_titles(&sink);
        // b vs a is reported under b, c vs b under c; a is never compared forward.
        assert_eq!(found.len(), 2, "{found:?}");
        assert_eq!(found[0].0, "packages/b/package.json");
        assert_eq!(found[1].0, "packages/c/package.json");
        assert!(found.iter().all(|(path, _)| *path != "packages/a/package.json"));
    }

    #[test]
    fn conflict_between_first_two_members_is_not_seen_by_the_first() {
        let pkg = workspace(&[
            ("a", r#"{ "name": "a", "devDependencies": { "lodash": "4.17.21" } }"#),
            ("b", r#"{ "name": "b", "devDependencies": { "lodash": "3.10.1" } }"#),
        ]);
        pkg.write("node_modules/lodash/package.json", r#"{ "name": "lodash", "version": "4.17.21" }"#);
        let (base, mono) = monorepo(
            "[monorepo.direct_duplicate_dependencies_only_warns_for]\nb = [\"lodash\"]",
        );
        let mut ws = WorkspaceChecker::open(pkg.root(), false).expect("open");
        let mut sink = ReportSink::new();
        ws.check_recommended(&base, &mono).run(&mut sink).expect("run");

        let dupes: Vec<_> = sink
            .violations()
            .iter()
            .filter(|v| v.check_id == ids::CHECK_MONOREPO_DUPLICATE_DEPENDENCIES)
            .collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].severity, Severity::Warning);
        assert_eq!(dupes[0].manifest.as_str(), "packages/b/package.json");
    }

    #[test]
    fn stale_monorepo_suppressions_are_reported_once_against_the_root() {
        let pkg = workspace(&[
            ("a", r#"{ "name": "a" }"#),
            ("b", r#"{ "name": "b" }"#),
        ]);
        let (base, mono) = monorepo(
            "[monorepo]\ndirect_duplicate_dependencies_only_warns_for = [\"react\"]",
        );
        let mut ws = WorkspaceChecker::open(pkg.root(), false).expect("open");
        let mut sink = ReportSink::new();
        ws.check_recommended(&base, &mono).run(&mut sink).expect("run");

        assert_eq!(
            monorepo_titles(&sink),
            vec![(
                "package.json",
                "Invalid config in \"monorepo.direct_duplicate_dependencies_only_warns_for\" for \"*\""
            )]
        );
    }

    #[test]
    fn sibling_members_are_exempt_from_exact_versions() {
        let pkg = workspace(&[
            ("a", r#"{ "name": "a", "version": "1.0.0" }"#),
            ("b", r#"{ "name": "b", "dependencies": { "a": "^1.0.0" } }"#),
        ]);
        pkg.write("node_modules/a/package.json", r#"{ "name": "a", "version": "1.0.0" }"#);
        let (base, mono) = monorepo("");
        let mut ws = WorkspaceChecker::open(pkg.root(), false).expect("open");
        let mut sink = ReportSink::new();
        ws.check_recommended(&base, &mono).run(&mut sink).expect("run");
        assert!(sink.is_empty(), "{:?}", titles(&sink));
    }

    #[test]
    fn libraries_may_use_ranges() {
        let pkg = workspace(&[
            ("lib", r#"{ "name": "@acme/lib", "dependencies": { "ms": "^2.1.0" } }"#),
            ("web", r#"{ "name": "@acme/web", "dependencies": { "ms": "^2.1.0" } }"#),
        ]);
        pkg.write("node_modules/ms/package.json", r#"{ "name": "ms", "version": "2.1.3" }"#);
        let (base, mono) = monorepo("[monorepo]\nlibraries = [\"@acme/lib\"]");
        let mut ws = WorkspaceChecker::open(pkg.root(), false).expect("open");
        let mut sink = ReportSink::new();
        ws.check_recommended(&base, &mono).run(&mut sink).expect("run");

        let exact: Vec<_> = sink
            .violations()
            .iter()
            .filter(|v| v.check_id == ids::CHECK_EXACT_VERSIONS)
            .map(|v| v.manifest.as_str())
            .collect();
        assert_eq!(exact, vec!["packages/web/package.json"]);
    }
}
