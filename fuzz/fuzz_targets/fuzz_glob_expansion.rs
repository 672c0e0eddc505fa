//! Fuzz target for workspace glob expansion.
//!
//! Invalid patterns may be rejected, but expansion must never panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_glob_expansion
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct WorkspaceGlobs {
    /// `workspaces` entries, e.g. "packages/*" or "!packages/legacy".
    patterns: Vec<String>,
    /// Member directories relative to the root.
    dirs: Vec<String>,
}

fuzz_target!(|input: WorkspaceGlobs| {
    if input.patterns.len() > 16 || input.dirs.len() > 64 {
        return;
    }
    let patterns: Vec<String> = input.patterns.into_iter().filter(|p| p.len() <= 128).collect();
    let dirs: Vec<String> = input.dirs.into_iter().filter(|d| d.len() <= 256).collect();

    let _ = pkgguard_repo::fuzz::expand_globs(&patterns, &dirs);
});
