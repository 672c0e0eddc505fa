//! Config parsing and resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::{
    CheckConfig, DependencySuppressionsConfig, MonorepoConfig, PackageSuppressionsConfig,
    PkgguardConfigV1, RequiredRange, SuppressionListConfig,
};
pub use resolve::{
    LibraryMatcher, ResolvedCheck, ResolvedConfig, ResolvedMonorepo, ResolvedRecommended,
};

/// Parse `pkgguard.toml` into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<PkgguardConfigV1> {
    let cfg: PkgguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Validate and resolve the config into the option types the checkers consume.
pub fn resolve_config(cfg: PkgguardConfigV1) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg)
}

/// JSON schema of `pkgguard.toml`.
pub fn config_schema() -> schemars::Schema {
    schemars::schema_for!(PkgguardConfigV1)
}
