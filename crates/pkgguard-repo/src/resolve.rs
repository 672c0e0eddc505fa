use camino::{Utf8Path, Utf8PathBuf};
use pkgguard_domain::{DependencyLookup, DependencyManifest, Error, Manifest};
use pkgguard_types::ManifestPath;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Resolves dependencies the way Node looks up packages: walk up from the
/// package directory through every `node_modules/<name>/package.json`.
///
/// Names starting with `.` are read from `<package_dir>/<name>/package.json`.
/// Results are cached per name for the lifetime of the resolver, so one
/// resolver should back exactly one checker.
#[derive(Debug)]
pub struct NodeModulesResolver {
    package_dir: Utf8PathBuf,
    /// Display directory of the package (`.` for the current one).
    display_dir: ManifestPath,
    cache: RefCell<BTreeMap<String, Arc<DependencyManifest>>>,
}

impl NodeModulesResolver {
    pub fn new(package_dir: impl Into<Utf8PathBuf>, display_dir: ManifestPath) -> Self {
        Self {
            package_dir: package_dir.into(),
            display_dir,
            cache: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn package_dir(&self) -> &Utf8Path {
        &self.package_dir
    }

    fn locate(&self, name: &str) -> Option<Utf8PathBuf> {
        if name.starts_with('.') {
            let candidate = self.package_dir.join(name).join("package.json");
            return candidate.is_file().then_some(candidate);
        }
        self.package_dir
            .ancestors()
            .map(|dir| dir.join("node_modules").join(name).join("package.json"))
            .find(|candidate| candidate.is_file())
    }

    fn display_path(&self, found: &Utf8Path) -> ManifestPath {
        match found.strip_prefix(&self.package_dir) {
            Ok(rel) if self.display_dir.as_str() == "." => ManifestPath::new(rel.as_str()),
            Ok(rel) => ManifestPath::new(Utf8Path::new(self.display_dir.as_str()).join(rel).as_str()),
            Err(_) => ManifestPath::new(found.as_str()),
        }
    }

    fn load(&self, name: &str) -> Result<DependencyManifest, Error> {
        let found = self.locate(name).ok_or_else(|| Error::MissingDependency {
            name: name.to_string(),
            from: self.package_dir.to_string(),
        })?;
        let text = std::fs::read_to_string(&found).map_err(|e| Error::InvalidManifest {
            path: found.to_string(),
            reason: e.to_string(),
        })?;
        let manifest = Manifest::parse(found.as_str(), &text)?;
        tracing::debug!(dependency = name, path = %found, "resolved dependency manifest");
        Ok(DependencyManifest {
            name: name.to_string(),
            path: self.display_path(&found),
            manifest,
        })
    }
}

impl DependencyLookup for NodeModulesResolver {
    fn lookup(&self, name: &str) -> Result<Arc<DependencyManifest>, Error> {
        if let Some(hit) = self.cache.borrow().get(name) {
            return Ok(Arc::clone(hit));
        }
        let loaded = Arc::new(self.load(name)?);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Arc::clone(&loaded));
        Ok(loaded)
    }
}
