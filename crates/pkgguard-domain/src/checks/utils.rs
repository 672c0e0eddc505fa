use crate::Error;
use crate::model::{DepType, Manifest};

/// Remembers the first lookup failure so sibling dependencies still get checked.
#[derive(Debug, Default)]
pub(crate) struct FirstError(Option<Error>);

impl FirstError {
    pub fn record(&mut self, err: Error) {
        if self.0.is_none() {
            self.0 = Some(err);
        }
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn finish(self) -> Result<(), Error> {
        match self.0 {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Names declared in any of `dep_types`, first occurrence wins.
pub(crate) fn unique_names(manifest: &Manifest, dep_types: &[DepType]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for dep_type in dep_types {
        for (name, _) in manifest.entries(*dep_type) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Sections among `dep_types` that declare `name`.
pub(crate) fn sections_declaring(
    manifest: &Manifest,
    dep_types: &[DepType],
    name: &str,
) -> Vec<DepType> {
    dep_types
        .iter()
        .copied()
        .filter(|t| manifest.range(*t, name).is_some())
        .collect()
}
