use crate::Error;
use crate::model::{DependencyManifest, Manifest};
use pkgguard_types::ManifestPath;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Resolves a dependency name to its installed manifest.
///
/// Implementations are expected to cache: the same name is asked for by
/// several checks of one checker.
pub trait DependencyLookup {
    fn lookup(&self, name: &str) -> Result<Arc<DependencyManifest>, Error>;
}

/// Fixed set of dependency manifests, for tests and embedders that already
/// hold the documents.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLookup {
    manifests: BTreeMap<String, Arc<DependencyManifest>>,
}

impl InMemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, manifest: Manifest) {
        let path = ManifestPath::for_package_dir(format!("node_modules/{name}"));
        self.manifests.insert(
            name.to_string(),
            Arc::new(DependencyManifest {
                name: name.to_string(),
                path,
                manifest,
            }),
        );
    }

    /// Builder form of [`InMemoryLookup::insert`] taking raw JSON.
    pub fn with(mut self, name: &str, value: Value) -> Result<Self, Error> {
        self.insert(name, Manifest::from_value(value)?);
        Ok(self)
    }
}

impl DependencyLookup for InMemoryLookup {
    fn lookup(&self, name: &str) -> Result<Arc<DependencyManifest>, Error> {
        self.manifests
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MissingDependency {
                name: name.to_string(),
                from: "<memory>".to_string(),
            })
    }
}

impl<T: DependencyLookup + ?Sized> DependencyLookup for &T {
    fn lookup(&self, name: &str) -> Result<Arc<DependencyManifest>, Error> {
        (**self).lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_name_is_a_configuration_error() {
        let lookup = InMemoryLookup::new()
            .with("react", json!({ "name": "react", "version": "18.2.0" }))
            .expect("object");
        let react = lookup.lookup("react").expect("present");
        assert_eq!(react.manifest.version(), Some("18.2.0"));
        assert_eq!(react.path.as_str(), "node_modules/react/package.json");
        assert!(matches!(
            lookup.lookup("vue"),
            Err(Error::MissingDependency { .. })
        ));
    }
}
