use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Display path of a `package.json`, as it appears in violations and reports.
///
/// Normalization rules are intentionally simple and deterministic:
/// - always forward slashes (`/`)
/// - no leading `./`
/// - never empty (`.` stands for the current directory)
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ManifestPath(String);

impl Default for ManifestPath {
    fn default() -> Self {
        ManifestPath::new("package.json")
    }
}

impl ManifestPath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let mut v = s.as_ref().replace('\\', "/");
        while v.starts_with("./") {
            v = v.trim_start_matches("./").to_string();
        }
        if v.is_empty() {
            v = ".".to_string();
        }
        Self(v)
    }

    /// `<package_dir>/package.json`, with `.` collapsing to `package.json`.
    pub fn for_package_dir<S: AsRef<str>>(package_dir: S) -> Self {
        let dir = ManifestPath::new(package_dir);
        if dir.as_str() == "." {
            return ManifestPath::new("package.json");
        }
        let base = Utf8Path::new(dir.as_str());
        ManifestPath::new(base.join("package.json").as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_utf8_pathbuf(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.0.clone())
    }
}

impl std::fmt::Display for ManifestPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Utf8Path> for ManifestPath {
    fn from(value: &Utf8Path) -> Self {
        ManifestPath::new(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_dot_slash_and_backslashes() {
        assert_eq!(ManifestPath::new("./packages\\a/package.json").as_str(), "packages/a/package.json");
        assert_eq!(ManifestPath::new("").as_str(), ".");
    }

    #[test]
    fn root_package_dir_collapses() {
        assert_eq!(ManifestPath::for_package_dir(".").as_str(), "package.json");
        assert_eq!(ManifestPath::for_package_dir("./").as_str(), "package.json");
        assert_eq!(
            ManifestPath::for_package_dir("packages/core").as_str(),
            "packages/core/package.json"
        );
    }
}
