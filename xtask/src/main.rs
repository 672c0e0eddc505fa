//! Developer tasks (schema generation, explain coverage).
//!
//! Kept out of the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;

/// The workspace root (parent of the xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("determine current directory")?,
    };
    if manifest_dir.ends_with("xtask")
        && let Some(parent) = manifest_dir.parent()
    {
        return Ok(parent.to_path_buf());
    }
    Ok(manifest_dir)
}

struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "pkgguard.report.v1.json",
            generate: || schema_for!(pkgguard_types::PkgguardReport),
        },
        SchemaSpec {
            filename: "pkgguard.config.v1.json",
            generate: pkgguard_settings::config_schema,
        },
    ]
}

/// Pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = project_root()?.join("schemas");
    fs::create_dir_all(&dir).context("create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json).with_context(|| format!("write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Every check id must have a non-empty title, description and remediation.
fn explain_coverage() -> anyhow::Result<()> {
    let check_ids = pkgguard_types::explain::all_check_ids();
    let mut errors = Vec::new();

    for check_id in check_ids {
        let Some(exp) = pkgguard_types::explain::lookup_explanation(check_id) else {
            errors.push(format!("check id '{check_id}' has no explanation"));
            continue;
        };
        for (field, value) in [
            ("title", exp.title),
            ("description", exp.description),
            ("remediation", exp.remediation),
        ] {
            if value.is_empty() {
                errors.push(format!("check id '{check_id}' has empty {field}"));
            }
        }
    }

    if errors.is_empty() {
        println!("{} check ids have explanations", check_ids.len());
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {error}");
    }
    bail!("explain coverage failed with {} errors", errors.len())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  explain-coverage  Validate all check IDs have explanations");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
