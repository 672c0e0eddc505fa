use std::process::Command;

#[test]
fn xtask_help_runs() {
    let exe = env!("CARGO_BIN_EXE_xtask");
    let output = Command::new(exe).arg("help").output().expect("run xtask");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("xtask commands"));
}

#[test]
fn explain_coverage_passes() {
    let exe = env!("CARGO_BIN_EXE_xtask");
    let output = Command::new(exe)
        .arg("explain-coverage")
        .output()
        .expect("run xtask");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("check ids have explanations"));
}

#[test]
fn print_schema_ids_lists_report_and_config() {
    let exe = env!("CARGO_BIN_EXE_xtask");
    let output = Command::new(exe)
        .arg("print-schema-ids")
        .output()
        .expect("run xtask");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pkgguard.report.v1"));
    assert!(stdout.contains("pkgguard.config.v1"));
}
