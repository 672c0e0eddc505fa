use crate::fingerprint::fingerprint_for_violation;
use crate::suppress::{OnlyWarnsFor, OnlyWarnsForMapping};
use pkgguard_types::{ManifestPath, Severity, Violation, ids};
use std::fmt;

type Listener = Box<dyn FnMut(&Violation) + Send>;

/// Collects violations for a run.
///
/// A listener sees each violation as it is pushed, which is how the CLI streams
/// grouped console output while checks are still running.
#[derive(Default)]
pub struct ReportSink {
    violations: Vec<Violation>,
    listener: Option<Listener>,
}

impl fmt::Debug for ReportSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportSink")
            .field("violations", &self.violations)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl ReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(listener: impl FnMut(&Violation) + Send + 'static) -> Self {
        Self {
            violations: Vec::new(),
            listener: Some(Box::new(listener)),
        }
    }

    pub fn push(&mut self, mut violation: Violation) {
        if violation.fingerprint.is_none() {
            violation.fingerprint = Some(fingerprint_for_violation(
                &violation.check_id,
                violation.manifest.as_str(),
                &violation.title,
            ));
        }
        if let Some(listener) = self.listener.as_mut() {
            listener(&violation);
        }
        self.violations.push(violation);
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The process failure signal: any violation that was not suppressed.
    pub fn has_fatal(&self) -> bool {
        self.violations.iter().any(Violation::is_fatal)
    }

    pub fn reporter<'a>(&'a mut self, check_id: &'static str, manifest: &ManifestPath) -> Reporter<'a> {
        Reporter::new(self, check_id, manifest)
    }
}

/// Reports violations of one rule against one manifest.
#[derive(Debug)]
pub struct Reporter<'a> {
    sink: &'a mut ReportSink,
    check_id: &'static str,
    rule: String,
    manifest: ManifestPath,
}

impl<'a> Reporter<'a> {
    pub fn new(sink: &'a mut ReportSink, check_id: &'static str, manifest: &ManifestPath) -> Self {
        Self {
            sink,
            check_id,
            rule: ids::rule_title(check_id).to_string(),
            manifest: manifest.clone(),
        }
    }

    pub fn check_id(&self) -> &'static str {
        self.check_id
    }

    pub fn manifest(&self) -> &ManifestPath {
        &self.manifest
    }

    /// Severity follows the suppression answer: warning when `only_warn`.
    pub fn report(&mut self, title: impl Into<String>, detail: Option<String>, only_warn: bool) {
        self.report_fixable(title, detail, only_warn, false);
    }

    pub fn report_fixable(
        &mut self,
        title: impl Into<String>,
        detail: Option<String>,
        only_warn: bool,
        fixable: bool,
    ) {
        self.sink.push(Violation {
            check_id: self.check_id.to_string(),
            rule: self.rule.clone(),
            manifest: self.manifest.clone(),
            title: title.into(),
            detail,
            severity: Severity::from_only_warn(only_warn),
            fixable,
            fingerprint: None,
        });
    }

    /// A violation no suppression can downgrade.
    pub fn error(&mut self, title: impl Into<String>, detail: Option<String>) {
        self.report(title, detail, false);
    }

    /// Stale entries of a flat suppression list, as one error.
    pub fn report_unconsumed(&mut self, tracker: &OnlyWarnsFor) {
        let names = tracker.unconsumed();
        if names.is_empty() {
            return;
        }
        self.error(
            format!("Invalid config in \"{}\"", tracker.config_name()),
            Some(no_warning_detail(&names)),
        );
    }

    /// Stale entries of a mapping, one error per context key.
    pub fn report_unconsumed_mapping(&mut self, tracker: &OnlyWarnsForMapping) {
        for (key, names) in tracker.unconsumed() {
            self.error(
                format!(
                    "Invalid config in \"{}\" for \"{key}\"",
                    tracker.config_name()
                ),
                Some(no_warning_detail(&names)),
            );
        }
    }
}

fn no_warning_detail(names: &[&str]) -> String {
    format!("no warning was raised for {}", quote_list(names))
}

/// `"a", "b"`.
pub fn quote_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| format!("\"{}\"", n.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
