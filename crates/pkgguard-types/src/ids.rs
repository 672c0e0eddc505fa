//! Stable identifiers for rules.
//!
//! `check_id` is a short snake_case discriminator used in reports and config.
//! The title is what the console groups violations under.

pub const CHECK_EXACT_VERSIONS: &str = "exact_versions";
pub const CHECK_NO_DEPENDENCIES: &str = "no_dependencies";
pub const CHECK_PEER_DEPENDENCIES: &str = "peer_dependencies";
pub const CHECK_DIRECT_DUPLICATE_DEPENDENCIES: &str = "direct_duplicate_dependencies";
pub const CHECK_MONOREPO_DUPLICATE_DEPENDENCIES: &str = "monorepo_direct_duplicate_dependencies";
pub const CHECK_IDENTICAL_VERSIONS: &str = "identical_versions";
pub const CHECK_IDENTICAL_VERSIONS_THAN_DEPENDENCY: &str = "identical_versions_than_dependency";
pub const CHECK_IDENTICAL_VERSIONS_THAN_DEV_DEPENDENCY_OF_DEPENDENCY: &str =
    "identical_versions_than_dev_dependency_of_dependency";
pub const CHECK_SATISFIES_VERSIONS: &str = "satisfies_versions";
pub const CHECK_SATISFIES_VERSIONS_FROM_DEPENDENCY: &str = "satisfies_versions_from_dependency";
pub const CHECK_SATISFIES_VERSIONS_IN_DEV_DEPENDENCIES_OF_DEPENDENCY: &str =
    "satisfies_versions_in_dev_dependencies_of_dependency";
pub const CHECK_SATISFIES_VERSIONS_BETWEEN_DEPENDENCIES: &str =
    "satisfies_versions_between_dependencies";
pub const CHECK_SATISFIES_VERSIONS_IN_DEPENDENCY: &str = "satisfies_versions_in_dependency";
pub const CHECK_RESOLUTIONS_VERSIONS_MATCH: &str = "resolutions_versions_match";
pub const CHECK_RESOLUTIONS_HAS_EXPLANATION: &str = "resolutions_has_explanation";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";

/// Human title for a rule, used in `== <title> in <manifest> ==` headers.
pub fn rule_title(check_id: &str) -> &'static str {
    match check_id {
        CHECK_EXACT_VERSIONS => "Exact versions",
        CHECK_NO_DEPENDENCIES => "No dependencies",
        CHECK_PEER_DEPENDENCIES => "Peer Dependencies",
        CHECK_DIRECT_DUPLICATE_DEPENDENCIES => "Direct Duplicate Dependencies",
        CHECK_MONOREPO_DUPLICATE_DEPENDENCIES => "Monorepo Direct Duplicate Dependencies",
        CHECK_IDENTICAL_VERSIONS => "Identical Versions",
        CHECK_IDENTICAL_VERSIONS_THAN_DEPENDENCY => "Identical Versions Than Dependency",
        CHECK_IDENTICAL_VERSIONS_THAN_DEV_DEPENDENCY_OF_DEPENDENCY => {
            "Identical Versions Than Dev Dependency Of Dependency"
        }
        CHECK_SATISFIES_VERSIONS => "Satisfies Versions",
        CHECK_SATISFIES_VERSIONS_FROM_DEPENDENCY => "Satisfies Versions From Dependency",
        CHECK_SATISFIES_VERSIONS_IN_DEV_DEPENDENCIES_OF_DEPENDENCY => {
            "Satisfies Versions In Dev Dependencies Of Dependency"
        }
        CHECK_SATISFIES_VERSIONS_BETWEEN_DEPENDENCIES => "Satisfies Versions Between Dependencies",
        CHECK_SATISFIES_VERSIONS_IN_DEPENDENCY => "Satisfies Versions In Dependency",
        CHECK_RESOLUTIONS_VERSIONS_MATCH => "Resolutions match other dependencies",
        CHECK_RESOLUTIONS_HAS_EXPLANATION => "Resolutions has explanation",
        CHECK_TOOL_RUNTIME => "Runtime",
        _ => "Unknown rule",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_check_has_a_title() {
        for id in crate::explain::all_check_ids() {
            assert_ne!(rule_title(id), "Unknown rule", "{id} has no title");
        }
    }
}
