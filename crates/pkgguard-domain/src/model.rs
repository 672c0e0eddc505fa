use crate::Error;
use pkgguard_types::ManifestPath;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A dependency section of a manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DepType {
    Dependencies,
    DevDependencies,
    OptionalDependencies,
    PeerDependencies,
    Resolutions,
}

impl DepType {
    pub const ALL: [DepType; 5] = [
        DepType::Dependencies,
        DepType::DevDependencies,
        DepType::OptionalDependencies,
        DepType::PeerDependencies,
        DepType::Resolutions,
    ];

    /// The JSON key of the section.
    pub fn key(self) -> &'static str {
        match self {
            DepType::Dependencies => "dependencies",
            DepType::DevDependencies => "devDependencies",
            DepType::OptionalDependencies => "optionalDependencies",
            DepType::PeerDependencies => "peerDependencies",
            DepType::Resolutions => "resolutions",
        }
    }
}

impl fmt::Display for DepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DepType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DepType::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| Error::UnknownDepType(s.to_string()))
    }
}

/// A `package.json` document.
///
/// The whole JSON object is kept (key order included) so that autofix can write
/// the file back without disturbing fields no rule looks at. Dependency sections
/// are read through typed accessors; non-string entries are ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Manifest {
    doc: Map<String, Value>,
}

impl Manifest {
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(doc) => Ok(Self { doc }),
            other => Err(Error::InvalidManifest {
                path: "<memory>".to_string(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    pub fn parse(path: &str, text: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(text).map_err(|e| Error::InvalidManifest {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_value(value).map_err(|e| match e {
            Error::InvalidManifest { reason, .. } => Error::InvalidManifest {
                path: path.to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.doc.clone())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.doc.get("name").and_then(Value::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.doc.get("version").and_then(Value::as_str)
    }

    pub fn section(&self, dep_type: DepType) -> Option<&Map<String, Value>> {
        self.doc.get(dep_type.key()).and_then(Value::as_object)
    }

    pub fn has_section(&self, dep_type: DepType) -> bool {
        self.section(dep_type).is_some()
    }

    /// `(name, range)` pairs of a section, in document order.
    pub fn entries(&self, dep_type: DepType) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.section(dep_type)
            .into_iter()
            .flat_map(|section| section.iter())
            .filter_map(|(name, v)| v.as_str().map(|range| (name.as_str(), range)))
    }

    pub fn owned_entries(&self, dep_type: DepType) -> Vec<(String, String)> {
        self.entries(dep_type)
            .map(|(name, range)| (name.to_string(), range.to_string()))
            .collect()
    }

    pub fn range(&self, dep_type: DepType, name: &str) -> Option<&str> {
        self.section(dep_type)?.get(name)?.as_str()
    }

    /// Set `name` in a section, creating the section when it does not exist yet.
    pub fn set_range(&mut self, dep_type: DepType, name: &str, range: impl Into<String>) {
        let section = self
            .doc
            .entry(dep_type.key())
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Value::Object(section) = section {
            section.insert(name.to_string(), Value::String(range.into()));
        }
    }

    /// `peerDependenciesMeta[peer].optional == true`.
    pub fn peer_is_optional(&self, peer: &str) -> bool {
        self.doc
            .get("peerDependenciesMeta")
            .and_then(|meta| meta.get(peer))
            .and_then(|entry| entry.get("optional"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `(name, text)` pairs of `resolutionsExplained`.
    pub fn resolutions_explained(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.doc
            .get("resolutionsExplained")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|section| section.iter())
            .filter_map(|(name, v)| v.as_str().map(|text| (name.as_str(), text)))
    }

    pub fn resolution_explanation(&self, name: &str) -> Option<&str> {
        self.doc
            .get("resolutionsExplained")?
            .get(name)?
            .as_str()
            .filter(|text| !text.is_empty())
    }

    /// Workspace glob patterns: `workspaces` as an array, or `workspaces.packages`.
    ///
    /// Returns `Ok(None)` when the field is absent.
    pub fn workspaces(&self, path: &ManifestPath) -> Result<Option<Vec<String>>, Error> {
        let malformed = || Error::MalformedWorkspaces {
            path: path.as_str().to_string(),
        };
        let patterns = match self.doc.get("workspaces") {
            None => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(Value::Object(obj)) => match obj.get("packages") {
                Some(Value::Array(items)) => items,
                _ => return Err(malformed()),
            },
            Some(_) => return Err(malformed()),
        };
        patterns
            .iter()
            .map(|p| p.as_str().map(str::to_string).ok_or_else(malformed))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A dependency's installed manifest, as returned by a [`crate::DependencyLookup`].
#[derive(Clone, Debug, PartialEq)]
pub struct DependencyManifest {
    /// The name it was requested under.
    pub name: String,
    pub path: ManifestPath,
    pub manifest: Manifest,
}

impl DependencyManifest {
    /// The declared package name, falling back to the requested one.
    pub fn display_name(&self) -> &str {
        self.manifest.name().unwrap_or(&self.name)
    }
}
