//! Thin adapter over `node-semver`.
//!
//! Semantic questions (satisfaction, intersection, minimum version) go to the
//! semver engine. Operator extraction is syntactic: a range "has an operator"
//! only when it is a single comparator such as `^1.2.3` or `>=2.0.0`.
//!
//! Local references (`workspace:`, `file:`, ...) and `npm:` aliases must be
//! handled by callers before anything here is consulted.

use crate::Error;
use node_semver::{Range, Version};

/// Operators recognised on a single comparator, longest first.
const OPERATORS: [&str; 7] = [">=", "<=", ">", "<", "=", "^", "~"];

const LOCAL_PROTOCOLS: [&str; 5] = ["workspace:", "file:", "link:", "portal:", "patch:"];

const NPM_ALIAS_PREFIX: &str = "npm:";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RangeOptions {
    pub include_prerelease: bool,
}

pub const INCLUDE_PRERELEASE: RangeOptions = RangeOptions {
    include_prerelease: true,
};

/// `true` if `version` is a concrete version inside `range`.
///
/// Without `include_prerelease`, a prerelease version only matches when the
/// range itself names a prerelease of the same `major.minor.patch`. With it,
/// the version is placed on the range's intervals by plain ordering.
pub fn satisfies(version: &str, range: &str, opts: RangeOptions) -> bool {
    let (Ok(version), Ok(parsed)) = (Version::parse(version.trim()), Range::parse(range)) else {
        return false;
    };
    if opts.include_prerelease {
        return Range::parse(version.to_string()).is_ok_and(|exact| exact.allows_any(&parsed));
    }
    parsed.satisfies(&version)
        && (!is_prerelease(&version) || names_prerelease_of(range, &version))
}

/// `true` if some version satisfies both ranges.
pub fn intersects(a: &str, b: &str) -> bool {
    match (Range::parse(a), Range::parse(b)) {
        (Ok(a), Ok(b)) => a.allows_any(&b),
        _ => false,
    }
}

/// Lowest version admitted by `range`; `None` if it is not a valid range.
pub fn min_version(range: &str) -> Option<String> {
    Range::parse(range)
        .ok()?
        .min_version()
        .map(|version| version.to_string())
}

pub fn is_valid_range(range: &str) -> bool {
    Range::parse(range).is_ok()
}

/// A range split into its operator and version text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Comparator<'a> {
    operator: &'a str,
    version: &'a str,
}

fn single_comparator(range: &str) -> Option<Comparator<'_>> {
    let range = range.trim();
    if range.is_empty() || range.contains(char::is_whitespace) || range.contains("||") {
        return None;
    }
    let operator = OPERATORS
        .iter()
        .copied()
        .find(|op| range.starts_with(op))
        .unwrap_or("");
    let rest = &range[operator.len()..];
    let version = rest.strip_prefix('v').unwrap_or(rest);
    if !looks_like_version(version) {
        return None;
    }
    Some(Comparator { operator, version })
}

/// `1`, `1.2`, `1.2.3`, `1.x`, `1.2.3-beta.1+build`.
fn looks_like_version(text: &str) -> bool {
    let core = text.split(['-', '+']).next().unwrap_or("");
    let parts: Vec<&str> = core.split('.').collect();
    !core.is_empty()
        && parts.len() <= 3
        && parts.iter().all(|part| {
            !part.is_empty()
                && (part.chars().all(|c| c.is_ascii_digit())
                    || matches!(*part, "x" | "X" | "*"))
        })
}

/// The comparison operator when `range` is a single comparator (`""` for a bare version).
pub fn operator_of(range: &str) -> Option<&str> {
    single_comparator(range).map(|c| c.operator)
}

/// `range` with its operator replaced; `None` unless it is a single comparator.
pub fn with_operator(range: &str, operator: &str) -> Option<String> {
    single_comparator(range).map(|c| format!("{operator}{}", c.version))
}

/// A literal `major.minor.patch` version without operator.
pub fn is_exact(range: &str) -> bool {
    single_comparator(range)
        .is_some_and(|c| c.operator.is_empty() && Version::parse(c.version).is_ok())
}

/// `workspace:`, `file:`, `link:`, `portal:` and `patch:` references are never range-checked.
pub fn is_local_reference(range: &str) -> bool {
    LOCAL_PROTOCOLS.iter().any(|p| range.starts_with(p))
}

pub fn is_npm_alias(range: &str) -> bool {
    range.starts_with(NPM_ALIAS_PREFIX)
}

/// `npm:<name>@<range>` into `(name, range)`.
///
/// Scoped names keep their leading `@`: `npm:@scope/pkg@^1.0.0`.
pub fn unwrap_npm_alias(range: &str) -> Result<(&str, &str), Error> {
    let malformed = || Error::MalformedNpmAlias(range.to_string());
    let body = range.strip_prefix(NPM_ALIAS_PREFIX).ok_or_else(malformed)?;
    let at = body.rfind('@').filter(|&i| i > 0).ok_or_else(malformed)?;
    let (name, version) = (&body[..at], &body[at + 1..]);
    if version.is_empty() {
        return Err(malformed());
    }
    Ok((name, version))
}

/// Returns the version part of an alias, or the range itself.
pub fn strip_npm_alias(range: &str) -> Result<&str, Error> {
    if is_npm_alias(range) {
        unwrap_npm_alias(range).map(|(_, version)| version)
    } else {
        Ok(range)
    }
}

/// Rewrite the version part, keeping the alias when there is one.
pub fn replace_npm_alias_version(range: &str, version: &str) -> Result<String, Error> {
    if is_npm_alias(range) {
        let (name, _) = unwrap_npm_alias(range)?;
        Ok(format!("{NPM_ALIAS_PREFIX}{name}@{version}"))
    } else {
        Ok(version.to_string())
    }
}

fn is_prerelease(version: &Version) -> bool {
    !version.pre_release.is_empty()
}

fn names_prerelease_of(range: &str, version: &Version) -> bool {
    range
        .split(|c: char| c.is_whitespace() || c == '|')
        .filter(|token| token.contains('-'))
        .map(|token| token.trim_start_matches(|c: char| "<>=^~v".contains(c)))
        .filter_map(|token| Version::parse(token).ok())
        .any(|named| {
            is_prerelease(&named)
                && (named.major, named.minor, named.patch)
                    == (version.major, version.minor, version.patch)
        })
}
