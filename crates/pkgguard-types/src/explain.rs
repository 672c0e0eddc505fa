//! Explain registry for rules.
//!
//! Maps check IDs to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a rule.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the rule.
    pub title: &'static str,
    /// What the rule does and why it exists.
    pub description: &'static str,
    /// How to fix violations.
    pub remediation: &'static str,
    /// Before/after manifest examples.
    pub examples: ExamplePair,
}

/// Before and after manifest examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Manifest that would trigger a violation.
    pub before: &'static str,
    /// Manifest that passes the rule.
    pub after: &'static str,
}

/// Look up an explanation by check_id.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        ids::CHECK_EXACT_VERSIONS => Some(explain_exact_versions()),
        ids::CHECK_NO_DEPENDENCIES => Some(explain_no_dependencies()),
        ids::CHECK_PEER_DEPENDENCIES => Some(explain_peer_dependencies()),
        ids::CHECK_DIRECT_DUPLICATE_DEPENDENCIES => Some(explain_direct_duplicates()),
        ids::CHECK_MONOREPO_DUPLICATE_DEPENDENCIES => Some(explain_monorepo_duplicates()),
        ids::CHECK_IDENTICAL_VERSIONS
        | ids::CHECK_IDENTICAL_VERSIONS_THAN_DEPENDENCY
        | ids::CHECK_IDENTICAL_VERSIONS_THAN_DEV_DEPENDENCY_OF_DEPENDENCY => {
            Some(explain_identical_versions())
        }
        ids::CHECK_SATISFIES_VERSIONS
        | ids::CHECK_SATISFIES_VERSIONS_FROM_DEPENDENCY
        | ids::CHECK_SATISFIES_VERSIONS_IN_DEV_DEPENDENCIES_OF_DEPENDENCY
        | ids::CHECK_SATISFIES_VERSIONS_BETWEEN_DEPENDENCIES
        | ids::CHECK_SATISFIES_VERSIONS_IN_DEPENDENCY => Some(explain_satisfies_versions()),
        ids::CHECK_RESOLUTIONS_VERSIONS_MATCH => Some(explain_resolutions_match()),
        ids::CHECK_RESOLUTIONS_HAS_EXPLANATION => Some(explain_resolutions_explained()),
        _ => None,
    }
}

/// List all known check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    &[
        ids::CHECK_EXACT_VERSIONS,
        ids::CHECK_NO_DEPENDENCIES,
        ids::CHECK_PEER_DEPENDENCIES,
        ids::CHECK_DIRECT_DUPLICATE_DEPENDENCIES,
        ids::CHECK_MONOREPO_DUPLICATE_DEPENDENCIES,
        ids::CHECK_IDENTICAL_VERSIONS,
        ids::CHECK_IDENTICAL_VERSIONS_THAN_DEPENDENCY,
        ids::CHECK_IDENTICAL_VERSIONS_THAN_DEV_DEPENDENCY_OF_DEPENDENCY,
        ids::CHECK_SATISFIES_VERSIONS,
        ids::CHECK_SATISFIES_VERSIONS_FROM_DEPENDENCY,
        ids::CHECK_SATISFIES_VERSIONS_IN_DEV_DEPENDENCIES_OF_DEPENDENCY,
        ids::CHECK_SATISFIES_VERSIONS_BETWEEN_DEPENDENCIES,
        ids::CHECK_SATISFIES_VERSIONS_IN_DEPENDENCY,
        ids::CHECK_RESOLUTIONS_VERSIONS_MATCH,
        ids::CHECK_RESOLUTIONS_HAS_EXPLANATION,
    ]
}

fn explain_exact_versions() -> Explanation {
    Explanation {
        title: "Exact Versions",
        description: "\
Flags entries in devDependencies and resolutions (and dependencies, unless the
package is a library allowed to use ranges) whose version is a range rather than
a single pinned version.

Ranges let two installs of the same manifest resolve different code. Pinning
makes installs reproducible and makes upgrades explicit reviewable diffs.",
        remediation: "\
Run `pkgguard check --fix` to rewrite each range to the currently installed
version (only when that version satisfies the declared range), or pin by hand.
List a dependency in `exact_versions_only_warns_for` to downgrade it to a warning.",
        examples: ExamplePair {
            before: r#"{ "devDependencies": { "typescript": "^5.4.0" } }"#,
            after: r#"{ "devDependencies": { "typescript": "5.4.5" } }"#,
        },
    }
}

fn explain_no_dependencies() -> Explanation {
    Explanation {
        title: "No Dependencies",
        description: "\
Flags a dependency section that must stay empty, such as `dependencies` in a
monorepo root that is never published.",
        remediation: "Move the entries to the suggested section (usually devDependencies).",
        examples: ExamplePair {
            before: r#"{ "private": true, "dependencies": { "lodash": "4.17.21" } }"#,
            after: r#"{ "private": true, "devDependencies": { "lodash": "4.17.21" } }"#,
        },
    }
}

fn explain_peer_dependencies() -> Explanation {
    Explanation {
        title: "Peer Dependencies",
        description: "\
For every direct dependency declaring peerDependencies, the peer must be present
in a section the package is allowed to satisfy it from, and the lowest version
the declared range admits must satisfy the peer's required range.

Libraries satisfy peers of their `dependencies` through their own
peerDependencies; applications satisfy them through dependencies or
devDependencies. Peers marked optional in peerDependenciesMeta may be absent.",
        remediation: "\
Add the missing peer, or widen/raise the declared range so its minimum version
satisfies the peer range. Use `only_warns_for_in_dependencies` entries
`missing_peer_dependency` / `invalid_peer_dependency_version` to downgrade.",
        examples: ExamplePair {
            before: r#"{ "dependencies": { "react-dom": "18.2.0" } }"#,
            after: r#"{ "dependencies": { "react": "18.2.0", "react-dom": "18.2.0" } }"#,
        },
    }
}

fn explain_direct_duplicates() -> Explanation {
    Explanation {
        title: "Direct Duplicate Dependencies",
        description: "\
When a direct dependency itself depends on a package the manifest also declares,
the two ranges must overlap; otherwise two copies get installed. A package
declared in both dependencies and devDependencies is always flagged.",
        remediation: "\
Align the declared range with what the dependency requires, or add a
`resolutions` override. Suppress per requiring dependency with
`only_warns_for_in_dependencies.<dep>.duplicate_direct_dependency`.",
        examples: ExamplePair {
            before: r#"{ "dependencies": { "a": "1.0.0", "b": "1.0.0" } }  // b requires a@^2.0.0"#,
            after: r#"{ "dependencies": { "a": "2.1.0", "b": "1.0.0" } }"#,
        },
    }
}

fn explain_monorepo_duplicates() -> Explanation {
    let mut exp = explain_direct_duplicates();
    exp.title = "Monorepo Direct Duplicate Dependencies";
    exp.description = "\
Each workspace member is compared with the root manifest and with every member
processed before it. Overlapping dependency/devDependency entries, and
overlapping peerDependencies, must declare intersecting ranges.";
    exp
}

fn explain_identical_versions() -> Explanation {
    Explanation {
        title: "Identical Versions",
        description: "\
Groups of packages released together must be declared with exactly the same
version string, either relative to one another or relative to the version a
named dependency declares.",
        remediation: "\
Use the same version string for every member of the group. When the reference
dependency uses a range, switch to a satisfies-versions check instead.",
        examples: ExamplePair {
            before: r#"{ "devDependencies": { "react": "18.2.0", "react-dom": "18.1.0" } }"#,
            after: r#"{ "devDependencies": { "react": "18.2.0", "react-dom": "18.2.0" } }"#,
        },
    }
}

fn explain_satisfies_versions() -> Explanation {
    Explanation {
        title: "Satisfies Versions",
        description: "\
The lowest version admitted by the declared range must satisfy a required range,
given explicitly or taken from another dependency's manifest. A required range
of null means the dependency must be absent.",
        remediation: "Raise the declared range until its minimum version satisfies the requirement.",
        examples: ExamplePair {
            before: r#"{ "dependencies": { "eslint": "^7.0.0" } }  // requires ^8.0.0"#,
            after: r#"{ "dependencies": { "eslint": "^8.10.0" } }"#,
        },
    }
}

fn explain_resolutions_match() -> Explanation {
    Explanation {
        title: "Resolutions Match Other Dependencies",
        description: "\
A `resolutions` override pins a version; any dependencies/devDependencies entry
for the same package must admit that pinned version.",
        remediation: "Run `pkgguard check --fix` to rewrite the entry to the resolution's version.",
        examples: ExamplePair {
            before: r#"{ "resolutions": { "lodash": "4.17.21" }, "dependencies": { "lodash": "^3.0.0" } }"#,
            after: r#"{ "resolutions": { "lodash": "4.17.21" }, "dependencies": { "lodash": "4.17.21" } }"#,
        },
    }
}

fn explain_resolutions_explained() -> Explanation {
    Explanation {
        title: "Resolutions Have Explanation",
        description: "\
Every `resolutions` entry needs a matching free-text entry in
`resolutionsExplained`, and every explanation must refer to an existing
resolution. A configured pattern may further constrain the text.",
        remediation: "Add (or remove) the `resolutionsExplained` entry.",
        examples: ExamplePair {
            before: r#"{ "resolutions": { "lodash": "4.17.21" } }"#,
            after: r#"{ "resolutions": { "lodash": "4.17.21" }, "resolutionsExplained": { "lodash": "CVE-2021-23337" } }"#,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_check_ids_are_valid() {
        for id in all_check_ids() {
            assert!(
                lookup_explanation(id).is_some(),
                "check_id {} should be in registry",
                id
            );
        }
    }

    #[test]
    fn lookup_unknown_returns_none() {
        assert!(lookup_explanation("unknown.check").is_none());
        assert!(lookup_explanation(ids::CHECK_TOOL_RUNTIME).is_none());
    }

    #[test]
    fn monorepo_variant_keeps_remediation() {
        let exp = lookup_explanation(ids::CHECK_MONOREPO_DUPLICATE_DEPENDENCIES).expect("known");
        assert_eq!(exp.title, "Monorepo Direct Duplicate Dependencies");
        assert!(exp.remediation.contains("resolutions"));
    }
}
