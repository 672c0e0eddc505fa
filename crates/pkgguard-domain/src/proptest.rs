//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - operator handling of single-comparator ranges
//! - exact-version reporting and autofix idempotence
//! - suppression staleness accounting

use crate::checks::{ExactVersionsOptions, check_exact_versions};
use crate::lookup::InMemoryLookup;
use crate::model::{DepType, Manifest};
use crate::range;
use crate::report::ReportSink;
use crate::suppress::OnlyWarnsFor;
use pkgguard_types::{ManifestPath, Severity};
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;

fn arb_dep_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,15}").unwrap()
}

fn arb_triple() -> impl Strategy<Value = (u32, u32, u32)> {
    (0u32..50, 0u32..50, 0u32..50)
}

fn manifest_with(dep_type: DepType, entries: &[(String, String)]) -> Manifest {
    let section: Map<String, Value> = entries
        .iter()
        .map(|(name, range)| (name.clone(), Value::String(range.clone())))
        .collect();
    let mut doc = Map::new();
    doc.insert(dep_type.key().to_string(), Value::Object(section));
    Manifest::from_value(Value::Object(doc)).unwrap()
}

proptest! {
    #[test]
    fn caret_and_tilde_are_never_exact((major, minor, patch) in arb_triple(), tilde in any::<bool>()) {
        let op = if tilde { "~" } else { "^" };
        let r = format!("{op}{major}.{minor}.{patch}");
        prop_assert!(!range::is_exact(&r));
        prop_assert_eq!(range::operator_of(&r), Some(op));
        let bare = range::with_operator(&r, "").unwrap();
        prop_assert!(range::is_exact(&bare));
        prop_assert!(range::satisfies(&bare, &r, range::RangeOptions::default()));
    }

    #[test]
    fn every_range_is_flagged_unless_suppressed(
        names in prop::collection::btree_set(arb_dep_name(), 1..8),
        suppressed_mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let entries: Vec<(String, String)> =
            names.iter().map(|n| (n.clone(), "^1.0.0".to_string())).collect();
        let suppressed: BTreeSet<String> = names
            .iter()
            .zip(&suppressed_mask)
            .filter(|(_, s)| **s)
            .map(|(n, _)| n.clone())
            .collect();

        let mut m = manifest_with(DepType::DevDependencies, &entries);
        let mut tracker = OnlyWarnsFor::from_list("only_warns_for", suppressed.iter().cloned());
        let mut sink = ReportSink::new();
        check_exact_versions(
            &mut m,
            &ManifestPath::default(),
            &InMemoryLookup::new(),
            &ExactVersionsOptions {
                dep_types: vec![DepType::DevDependencies],
                fix: false,
                internal_ignore: Vec::new(),
            },
            &mut tracker,
            &mut sink,
        )
        .unwrap();

        prop_assert_eq!(sink.len(), names.len());
        for (name, v) in names.iter().zip(sink.violations()) {
            let expected = if suppressed.contains(name) { Severity::Warning } else { Severity::Error };
            prop_assert_eq!(v.severity, expected);
        }
    }

    #[test]
    fn each_unused_suppression_yields_one_stale_error(
        used in prop::collection::btree_set(arb_dep_name(), 0..5),
        unused in prop::collection::btree_set(arb_dep_name(), 1..5),
    ) {
        let unused: Vec<String> = unused.difference(&used).cloned().collect();
        prop_assume!(!unused.is_empty());
        let entries: Vec<(String, String)> =
            used.iter().map(|n| (n.clone(), "~2.0.0".to_string())).collect();

        let mut m = manifest_with(DepType::DevDependencies, &entries);
        let mut tracker = OnlyWarnsFor::from_list(
            "only_warns_for",
            used.iter().chain(unused.iter()).cloned(),
        );
        let mut sink = ReportSink::new();
        check_exact_versions(
            &mut m,
            &ManifestPath::default(),
            &InMemoryLookup::new(),
            &ExactVersionsOptions {
                dep_types: vec![DepType::DevDependencies],
                fix: false,
                internal_ignore: Vec::new(),
            },
            &mut tracker,
            &mut sink,
        )
        .unwrap();

        let stale: Vec<_> = sink
            .violations()
            .iter()
            .filter(|v| v.title.starts_with("Invalid config"))
            .collect();
        prop_assert_eq!(stale.len(), 1);
        prop_assert_eq!(stale[0].severity, Severity::Error);
        for name in &unused {
            let needle = format!("\"{name}\"");
            prop_assert!(stale[0].detail.as_deref().unwrap_or("").contains(&needle));
        }
    }

    #[test]
    fn autofix_twice_changes_nothing_the_second_time(
        (major, minor, patch) in (1u32..50, 0u32..50, 0u32..50),
        bump in 0u32..5,
        name in arb_dep_name(),
    ) {
        let declared = format!("^{major}.{minor}.{patch}");
        let installed = format!("{major}.{minor}.{}", patch + bump);
        let lookup = InMemoryLookup::new()
            .with(&name, json!({ "name": name, "version": installed }))
            .unwrap();
        let mut m = manifest_with(DepType::DevDependencies, &[(name.clone(), declared)]);
        let opts = ExactVersionsOptions {
            dep_types: vec![DepType::DevDependencies],
            fix: true,
            internal_ignore: Vec::new(),
        };

        let mut first = ReportSink::new();
        check_exact_versions(&mut m, &ManifestPath::default(), &lookup, &opts, &mut OnlyWarnsFor::empty("x"), &mut first).unwrap();
        let after_first = m.clone();
        let mut second = ReportSink::new();
        check_exact_versions(&mut m, &ManifestPath::default(), &lookup, &opts, &mut OnlyWarnsFor::empty("x"), &mut second).unwrap();

        prop_assert!(first.is_empty());
        prop_assert!(second.is_empty());
        prop_assert_eq!(m.range(DepType::DevDependencies, &name), Some(installed.as_str()));
        prop_assert_eq!(m, after_first);
    }
}
