//! Rule procedures.
//!
//! Each check reads one manifest (plus dependency manifests through a
//! [`crate::DependencyLookup`]), reports into a [`crate::ReportSink`], and
//! returns `Err` only for configuration errors.

mod duplicate_dependencies;
mod exact_versions;
mod identical_versions;
mod no_dependencies;
mod peer_dependencies;
mod resolutions;
mod satisfies_versions;
mod utils;


pub use duplicate_dependencies::{
    check_direct_duplicate_dependencies, check_monorepo_duplicate_dependencies,
};
pub use exact_versions::{ExactVersionsOptions, check_exact_versions};
pub use identical_versions::{
    IdenticalThanDependency, check_identical_versions, check_identical_versions_than_dependency,
};
pub use no_dependencies::check_no_dependencies;
pub use peer_dependencies::{PeerSuppressions, check_direct_peer_dependencies};
pub use resolutions::{
    ExplanationValidator, check_resolutions_has_explanation, check_resolutions_versions_match,
};
pub use satisfies_versions::{
    Requirements, SatisfiesBetween, SatisfiesFromDependency, check_satisfies_versions,
    check_satisfies_versions_between_dependencies, check_satisfies_versions_from_dependency,
    check_satisfies_versions_in_dependency,
};
