//! CLI entry point for pkgguard.
//!
//! Argument parsing, I/O and exit codes only. Everything else lives in
//! `pkgguard-app`.

mod logging;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use pkgguard_app::{
    CheckInput, ExplainOutput, parse_report_json, render_annotations, render_console,
    render_markdown, run_check, run_explain, runtime_error_report, serialize_report,
    to_renderable, verdict_exit_code,
};
use pkgguard_domain::ReportSink;
use pkgguard_render::ConsoleRenderer;
use pkgguard_types::PkgguardReport;

/// Exit status for configuration and runtime errors.
const EXIT_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "pkgguard",
    version,
    about = "Version-consistency auditor for package.json manifests and workspaces"
)]
struct Cli {
    /// Package directory (containing package.json; the workspace root in monorepo mode).
    #[arg(long, global = true, default_value = ".")]
    package_dir: Utf8PathBuf,

    /// Path to the pkgguard config TOML, relative to the package directory.
    #[arg(long, global = true, default_value = "pkgguard.toml")]
    config: Utf8PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the recommended checks plus the configured ones.
    Check {
        /// Rewrite manifests for the checks that support autofix.
        #[arg(long)]
        fix: bool,

        /// Where to write the JSON report.
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,

        /// Print GitHub Actions annotations to stdout.
        #[arg(long)]
        annotations: bool,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max_annotations: usize,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "pkgguard-report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (stdout if omitted).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Explain a check_id with remediation guidance.
    Explain {
        /// The check_id to explain (e.g. "exact_versions").
        identifier: String,
    },

    /// Print the JSON schema of pkgguard.toml.
    ConfigSchema,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json)?;

    match cli.cmd {
        Commands::Check {
            fix,
            ref report_out,
            annotations,
            max_annotations,
        } => cmd_check(&cli, fix, report_out.as_deref(), annotations, max_annotations),
        Commands::Md { report, output } => exit_on_error(cmd_md(&report, output.as_deref())),
        Commands::Explain { identifier } => cmd_explain(&identifier),
        Commands::ConfigSchema => exit_on_error(cmd_config_schema()),
    }
}

fn cmd_check(
    cli: &Cli,
    fix: bool,
    report_out: Option<&Utf8Path>,
    annotations: bool,
    max_annotations: usize,
) -> anyhow::Result<()> {
    let package_dir = cli
        .package_dir
        .canonicalize_utf8()
        .unwrap_or_else(|_| cli.package_dir.clone());

    let result = (|| -> anyhow::Result<i32> {
        if !package_dir.is_dir() {
            anyhow::bail!("package directory does not exist: {package_dir}");
        }
        let cfg_path = package_dir.join(&cli.config);
        let cfg_text = read_optional(&cfg_path)?;

        let mut renderer = ConsoleRenderer::new();
        let mut sink = ReportSink::with_listener(move |violation| {
            for line in render_console(&mut renderer, violation) {
                eprintln!("{line}");
            }
        });

        let output = run_check(
            CheckInput {
                package_dir: &package_dir,
                config_text: &cfg_text,
                fix,
            },
            &mut sink,
        )?;
        let report = &output.report;

        if let Some(path) = report_out {
            write_report_file(path, report).context("write report json")?;
        }
        if annotations {
            for line in render_annotations(&to_renderable(report), max_annotations) {
                println!("{line}");
            }
        }
        for manifest in &report.fixed_manifests {
            eprintln!("pkgguard: fixed {manifest}");
        }
        if !report.violations.is_empty() {
            eprintln!(
                "\npkgguard: {} error(s), {} warning(s)",
                report.counts.error, report.counts.warning
            );
        }

        Ok(verdict_exit_code(report.verdict))
    })();

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            if let Some(path) = report_out {
                let report = runtime_error_report(&format!("{err:#}"));
                let _ = write_report_file(path, &report);
            }
            eprintln!("pkgguard error: {err:#}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

/// A missing file reads as empty; any other I/O failure is an error.
fn read_optional(path: &Utf8Path) -> anyhow::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path, "no config file, using defaults");
            Ok(String::new())
        }
        Err(err) => Err(err).with_context(|| format!("read config: {path}")),
    }
}

fn write_report_file(path: &Utf8Path, report: &PkgguardReport) -> anyhow::Result<()> {
    let data = serialize_report(report).context("serialize report")?;
    write_file(path, &data)
}

fn write_file(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, data).with_context(|| format!("write file: {path}"))?;
    Ok(())
}

fn exit_on_error(result: anyhow::Result<()>) -> anyhow::Result<()> {
    if let Err(err) = result {
        eprintln!("pkgguard error: {err:#}");
        std::process::exit(EXIT_ERROR);
    }
    Ok(())
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {report_path}"))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&to_renderable(&report));

    match output {
        Some(out_path) => write_file(out_path, md.as_bytes()).context("write markdown output")?,
        None => print!("{md}"),
    }
    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", pkgguard_app::format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
        } => {
            eprint!(
                "{}",
                pkgguard_app::format_not_found(&identifier, available_check_ids)
            );
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn cmd_config_schema() -> anyhow::Result<()> {
    let schema = pkgguard_settings::config_schema();
    let text = serde_json::to_string_pretty(&schema).context("serialize config schema")?;
    println!("{text}");
    Ok(())
}
