use crate::lookup::InMemoryLookup;
use crate::model::Manifest;
use crate::report::ReportSink;
use crate::suppress::{OnlyWarnsFor, OnlyWarnsForMapping, SuppressionConfig};
use pkgguard_types::{ManifestPath, Severity};
use serde_json::Value;
use std::collections::BTreeMap;

pub fn manifest(value: Value) -> Manifest {
    Manifest::from_value(value).expect("test manifest must be an object")
}

pub fn root_path() -> ManifestPath {
    ManifestPath::new("package.json")
}

pub fn lookup(deps: Vec<(&str, Value)>) -> InMemoryLookup {
    let mut lookup = InMemoryLookup::new();
    for (name, value) in deps {
        lookup.insert(name, manifest(value));
    }
    lookup
}

pub fn only_warns_for(names: &[&str]) -> OnlyWarnsFor {
    OnlyWarnsFor::from_list("only_warns_for", names.iter().copied())
}

pub fn mapping(buckets: &[(&str, &[&str])]) -> OnlyWarnsForMapping {
    let scoped: BTreeMap<String, Vec<String>> = buckets
        .iter()
        .map(|(key, names)| {
            (
                key.to_string(),
                names.iter().map(|n| n.to_string()).collect(),
            )
        })
        .collect();
    OnlyWarnsForMapping::from_config("only_warns_for", &SuppressionConfig::Scoped(scoped))
}

pub fn titles(sink: &ReportSink) -> Vec<String> {
    sink.violations().iter().map(|v| v.title.clone()).collect()
}

pub fn severities(sink: &ReportSink) -> Vec<Severity> {
    sink.violations().iter().map(|v| v.severity).collect()
}
