//! `onlyWarnsFor` bookkeeping.
//!
//! A suppression downgrades a violation for one dependency name from error to
//! warning. Each declared name must be exercised at least once during a run;
//! the leftovers are reported as stale configuration by [`crate::Reporter`].

use std::collections::{BTreeMap, BTreeSet};

/// Bucket key that applies to every dependency context.
pub const WILDCARD: &str = "*";

/// Caller-supplied shape, decided once when the tracker is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuppressionConfig {
    Flat(Vec<String>),
    Scoped(BTreeMap<String, Vec<String>>),
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        SuppressionConfig::Flat(Vec::new())
    }
}

impl SuppressionConfig {
    pub fn is_empty(&self) -> bool {
        match self {
            SuppressionConfig::Flat(names) => names.is_empty(),
            SuppressionConfig::Scoped(buckets) => buckets.values().all(Vec::is_empty),
        }
    }
}

/// A flat suppression list for one check invocation.
#[derive(Clone, Debug, Default)]
pub struct OnlyWarnsFor {
    config_name: String,
    declared: Vec<String>,
    consumed: BTreeSet<String>,
}

impl OnlyWarnsFor {
    pub fn from_list<I, S>(config_name: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut declared: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !declared.contains(&name) {
                declared.push(name);
            }
        }
        Self {
            config_name: config_name.into(),
            declared,
            consumed: BTreeSet::new(),
        }
    }

    pub fn empty(config_name: impl Into<String>) -> Self {
        Self::from_list(config_name, Vec::<String>::new())
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    /// `true` (and marks `name` consumed) when `name` is suppressed.
    pub fn should_warn(&mut self, name: &str) -> bool {
        if self.declared.iter().any(|d| d == name) {
            self.consumed.insert(name.to_string());
            true
        } else {
            false
        }
    }

    /// Declared names never consumed, in declaration order.
    pub fn unconsumed(&self) -> Vec<&str> {
        self.declared
            .iter()
            .filter(|name| !self.consumed.contains(*name))
            .map(String::as_str)
            .collect()
    }
}

/// Suppressions keyed by the dependency that caused the check, plus `*`.
#[derive(Clone, Debug, Default)]
pub struct OnlyWarnsForMapping {
    config_name: String,
    buckets: BTreeMap<String, OnlyWarnsFor>,
}

impl OnlyWarnsForMapping {
    /// A flat list is read as `{ "*": list }`.
    pub fn from_config(config_name: impl Into<String>, config: &SuppressionConfig) -> Self {
        let config_name = config_name.into();
        let buckets = match config {
            SuppressionConfig::Flat(names) => {
                let mut buckets = BTreeMap::new();
                buckets.insert(
                    WILDCARD.to_string(),
                    OnlyWarnsFor::from_list(config_name.clone(), names.iter().cloned()),
                );
                buckets
            }
            SuppressionConfig::Scoped(mapping) => mapping
                .iter()
                .map(|(key, names)| {
                    (
                        key.clone(),
                        OnlyWarnsFor::from_list(config_name.clone(), names.iter().cloned()),
                    )
                })
                .collect(),
        };
        Self {
            config_name,
            buckets,
        }
    }

    pub fn empty(config_name: impl Into<String>) -> Self {
        Self::from_config(config_name, &SuppressionConfig::default())
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    /// A handle answering for one dependency context.
    pub fn scoped<'a>(&'a mut self, context: &str) -> ScopedOnlyWarnsFor<'a> {
        ScopedOnlyWarnsFor {
            mapping: self,
            context: context.to_string(),
        }
    }

    /// Per context key, the names never consumed. Keys with none left are omitted.
    pub fn unconsumed(&self) -> BTreeMap<&str, Vec<&str>> {
        self.buckets
            .iter()
            .map(|(key, bucket)| (key.as_str(), bucket.unconsumed()))
            .filter(|(_, names)| !names.is_empty())
            .collect()
    }
}

/// Borrowed view of an [`OnlyWarnsForMapping`] for one context.
///
/// It only answers `should_warn`; staleness is a property of the whole mapping.
#[derive(Debug)]
pub struct ScopedOnlyWarnsFor<'a> {
    mapping: &'a mut OnlyWarnsForMapping,
    context: String,
}

impl ScopedOnlyWarnsFor<'_> {
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Checks the `*` bucket first, then the context's own bucket.
    pub fn should_warn(&mut self, name: &str) -> bool {
        if let Some(bucket) = self.mapping.buckets.get_mut(WILDCARD)
            && bucket.should_warn(name)
        {
            return true;
        }
        if self.context == WILDCARD {
            return false;
        }
        self.mapping
            .buckets
            .get_mut(&self.context)
            .is_some_and(|bucket| bucket.should_warn(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_list_consumes_on_match() {
        let mut t = OnlyWarnsFor::from_list("exact_versions_only_warns_for", ["a", "b"]);
        assert!(t.should_warn("a"));
        assert!(t.should_warn("a"));
        assert!(!t.should_warn("c"));
        assert_eq!(t.unconsumed(), vec!["b"]);
    }

    #[test]
    fn flat_config_becomes_wildcard_bucket() {
        let mut m = OnlyWarnsForMapping::from_config(
            "missing_peer_dependency",
            &SuppressionConfig::Flat(vec!["react".to_string()]),
        );
        assert!(m.scoped("react-dom").should_warn("react"));
        assert!(m.unconsumed().is_empty());
    }

    #[test]
    fn scoped_lookup_prefers_wildcard_then_context() {
        let mut buckets = BTreeMap::new();
        buckets.insert("*".to_string(), vec!["shared".to_string()]);
        buckets.insert("b".to_string(), vec!["only-b".to_string()]);
        buckets.insert("c".to_string(), vec!["only-c".to_string()]);
        let mut m = OnlyWarnsForMapping::from_config("dups", &SuppressionConfig::Scoped(buckets));

        assert!(m.scoped("b").should_warn("shared"));
        assert!(m.scoped("b").should_warn("only-b"));
        assert!(!m.scoped("a").should_warn("only-b"));

        let left = m.unconsumed();
        assert_eq!(left.len(), 1);
        assert_eq!(left["c"], vec!["only-c"]);
    }

    #[test]
    fn duplicate_declarations_collapse() {
        let t = OnlyWarnsFor::from_list("x", ["a", "a"]);
        assert_eq!(t.unconsumed(), vec!["a"]);
    }
}
