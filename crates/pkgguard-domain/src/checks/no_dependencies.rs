use crate::model::{DepType, Manifest};
use crate::report::{ReportSink, quote_list};
use pkgguard_types::{ManifestPath, ids};

/// `dep_type` must be empty; suggests moving entries to `move_to`.
pub fn check_no_dependencies(
    manifest: &Manifest,
    path: &ManifestPath,
    dep_type: DepType,
    move_to: DepType,
    sink: &mut ReportSink,
) {
    let names: Vec<&str> = manifest.entries(dep_type).map(|(name, _)| name).collect();
    if names.is_empty() {
        return;
    }
    sink.reporter(ids::CHECK_NO_DEPENDENCIES, path).error(
        format!("Unexpected {dep_type}"),
        Some(format!(
            "you should move {} in \"{move_to}\".",
            quote_list(&names)
        )),
    );
}
