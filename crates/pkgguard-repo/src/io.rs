use anyhow::Context;
use camino::Utf8Path;
use pkgguard_domain::Manifest;

/// Read and parse a `package.json`.
pub fn read_manifest(path: &Utf8Path) -> anyhow::Result<Manifest> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    let manifest = Manifest::parse(path.as_str(), &text)?;
    Ok(manifest)
}

/// Two-space indented JSON with a trailing newline, keys in document order.
pub fn render_manifest(manifest: &Manifest) -> anyhow::Result<String> {
    let mut text =
        serde_json::to_string_pretty(&manifest.as_value()).context("serialize manifest")?;
    text.push('\n');
    Ok(text)
}

pub fn write_manifest(path: &Utf8Path, manifest: &Manifest) -> anyhow::Result<()> {
    let text = render_manifest(manifest)?;
    std::fs::write(path, text).with_context(|| format!("write {}", path))?;
    tracing::debug!(path = %path, "wrote manifest");
    Ok(())
}
