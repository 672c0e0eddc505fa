use thiserror::Error;

/// Configuration errors. These abort the run instead of becoming violations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid npm alias \"{0}\": expected npm:<name>@<range>")]
    MalformedNpmAlias(String),

    #[error("cannot find package.json of dependency \"{name}\" from {from}")]
    MissingDependency { name: String, from: String },

    #[error("invalid package.json at {path}: {reason}")]
    InvalidManifest { path: String, reason: String },

    #[error("package is missing \"workspaces\" in {path}")]
    MissingWorkspaces { path: String },

    #[error("malformed \"workspaces\" in {path}: expected an array of globs or {{ \"packages\": [...] }}")]
    MalformedWorkspaces { path: String },

    #[error("workspace member at {0} has no \"name\"")]
    MissingMemberName(String),

    #[error("invalid package name: {0}")]
    UnknownWorkspaceMember(String),

    #[error("unknown dependency type: {0}")]
    UnknownDepType(String),
}
