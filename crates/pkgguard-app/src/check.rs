//! The `check` use case: resolve config, run the checkers, produce a report.

use anyhow::Context;
use camino::Utf8Path;
use pkgguard_domain::ReportSink;
use pkgguard_settings::ResolvedConfig;
use pkgguard_types::{PkgguardReport, Verdict};
use time::OffsetDateTime;

use crate::checker::ManifestChecker;
use crate::report::build_report;
use crate::workspace::WorkspaceChecker;

#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Directory containing the `package.json` to check.
    pub package_dir: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// Rewrite manifests for the checks that support autofix.
    pub fix: bool,
}

#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: PkgguardReport,
    pub resolved_config: ResolvedConfig,
    pub monorepo: bool,
}

/// Runs the recommended policy plus the configured checks.
///
/// Violations go through `sink` as they are found, so a listener can stream
/// them; the returned report holds all of them.
pub fn run_check(input: CheckInput<'_>, sink: &mut ReportSink) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    let cfg = pkgguard_settings::parse_config_toml(input.config_text).context("parse config")?;
    let resolved = pkgguard_settings::resolve_config(cfg).context("resolve config")?;

    let root = ManifestChecker::open(input.package_dir, ".", input.fix)?;
    let monorepo = match resolved.workspaces {
        Some(forced) => forced,
        None => root.manifest().get("workspaces").is_some(),
    };
    tracing::debug!(package_dir = %input.package_dir, monorepo, "starting check");

    let fixed_manifests = if monorepo {
        let mut ws = WorkspaceChecker::from_root(input.package_dir, root, input.fix)?;
        ws.check_recommended(&resolved.recommended, &resolved.monorepo)
            .for_root(|root| {
                for check in &resolved.checks {
                    root.check(check.clone());
                }
            });
        for (member, checks) in &resolved.monorepo.member_checks {
            ws.for_member(member, |checker| {
                for check in checks {
                    checker.check(check.clone());
                }
            })
            .context("invalid monorepo.member_checks")?;
        }
        ws.run(sink)?
    } else {
        let mut checker = root;
        checker.check_recommended(&resolved.recommended);
        for check in &resolved.checks {
            checker.check(check.clone());
        }
        let path = checker.path().clone();
        if checker.run(sink)? { vec![path] } else { Vec::new() }
    };

    let report = build_report(started_at, sink.violations().to_vec(), fixed_manifests);
    Ok(CheckOutput {
        report,
        resolved_config: resolved,
        monorepo,
    })
}

/// 0 = pass/warn, 1 = at least one unsuppressed violation.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass | Verdict::Warn => 0,
        Verdict::Fail => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempPackage;
    use pkgguard_types::ids;

    fn input<'a>(pkg: &'a TempPackage, config_text: &'a str, fix: bool) -> CheckInput<'a> {
        CheckInput {
            package_dir: pkg.root(),
            config_text,
            fix,
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let pkg = TempPackage::new();
        pkg.write("package.json", r#"{ "name": "app", "version": "1.0.0" }"#);
        let output = run_check(input(&pkg, "", false), &mut ReportSink::new()).expect("run_check");
        assert!(!output.monorepo);
        assert_eq!(output.report.verdict, Verdict::Pass);
        assert!(output.report.violations.is_empty());
    }

    #[test]
    fn single_package_reports_and_fixes() {
        let pkg = TempPackage::new();
        pkg.write(
            "package.json",
            r#"{ "name": "app", "devDependencies": { "typescript": "^5.4.0" } }"#,
        );
        pkg.write(
            "node_modules/typescript/package.json",
            r#"{ "name": "typescript", "version": "5.4.5" }"#,
        );

        let output = run_check(input(&pkg, "", false), &mut ReportSink::new()).expect("check");
        assert_eq!(output.report.verdict, Verdict::Fail);
        assert_eq!(output.report.violations[0].check_id, ids::CHECK_EXACT_VERSIONS);
        assert!(output.report.violations[0].fixable);
        assert_eq!(verdict_exit_code(output.report.verdict), 1);

        let output = run_check(input(&pkg, "", true), &mut ReportSink::new()).expect("fix");
        assert_eq!(output.report.verdict, Verdict::Pass);
        assert_eq!(output.report.fixed_manifests.len(), 1);
        assert!(pkg.read("package.json").contains("\"typescript\": \"5.4.5\""));
    }

    #[test]
    fn suppressed_violations_warn_without_failing() {
        let pkg = TempPackage::new();
        pkg.write(
            "package.json",
            r#"{ "name": "app", "devDependencies": { "typescript": "^5.4.0" } }"#,
        );
        let output = run_check(
            input(&pkg, "exact_versions_only_warns_for = [\"typescript\"]", false),
            &mut ReportSink::new(),
        )
        .expect("check");
        assert_eq!(output.report.verdict, Verdict::Warn);
        assert_eq!(verdict_exit_code(output.report.verdict), 0);
    }

    #[test]
    fn configured_checks_run_after_recommended() {
        let pkg = TempPackage::new();
        pkg.write(
            "package.json",
            r#"{ "name": "app", "dependencies": { "moment": "2.29.4" } }"#,
        );
        pkg.write("node_modules/moment/package.json", r#"{ "name": "moment", "version": "2.29.4" }"#);
        let output = run_check(
            input(
                &pkg,
                r#"
                [[checks]]
                kind = "satisfies_versions"
                dep_type = "dependencies"
                versions = { moment = false }
                "#,
                false,
            ),
            &mut ReportSink::new(),
        )
        .expect("check");
        let last = output.report.violations.last().expect("violation");
        assert_eq!(last.check_id, ids::CHECK_SATISFIES_VERSIONS);
        assert_eq!(last.title, "Invalid \"moment\" in dependencies");
    }

    #[test]
    fn workspaces_field_switches_to_monorepo_mode() {
        let pkg = TempPackage::new();
        pkg.write("package.json", r#"{ "name": "root", "workspaces": ["packages/*"] }"#);
        pkg.write("packages/a/package.json", r#"{ "name": "a" }"#);
        let output = run_check(input(&pkg, "", false), &mut ReportSink::new()).expect("check");
        assert!(output.monorepo);

        let output = run_check(input(&pkg, "workspaces = false", false), &mut ReportSink::new())
            .expect("check");
        assert!(!output.monorepo);
    }

    #[test]
    fn member_checks_for_unknown_member_fail() {
        let pkg = TempPackage::new();
        pkg.write("package.json", r#"{ "name": "root", "workspaces": ["packages/*"] }"#);
        pkg.write("packages/a/package.json", r#"{ "name": "a" }"#);
        let err = run_check(
            input(
                &pkg,
                r#"
                [[monorepo.member_checks.ghost]]
                kind = "no_dependencies"
                "#,
                false,
            ),
            &mut ReportSink::new(),
        )
        .expect_err("unknown member");
        assert!(format!("{err:#}").contains("invalid package name: ghost"));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let pkg = TempPackage::new();
        pkg.write("package.json", r#"{ "name": "app" }"#);
        let err = run_check(input(&pkg, "library = \"yes\"", false), &mut ReportSink::new())
            .expect_err("bad config");
        assert!(format!("{err:#}").contains("parse config"));
    }
}
