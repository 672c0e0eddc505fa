use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a violation.
///
/// Identity fields:
/// - check_id
/// - manifest path
/// - title
pub fn fingerprint_for_violation(check_id: &str, manifest_path: &str, title: &str) -> String {
    let canonical = [check_id, manifest_path, title].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
