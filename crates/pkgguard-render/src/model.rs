#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableSeverity {
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableVerdictStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableViolation {
    pub severity: RenderableSeverity,
    pub check_id: String,
    pub rule: String,
    pub manifest: String,
    pub title: String,
    pub detail: Option<String>,
    pub fixable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub verdict: RenderableVerdictStatus,
    pub warnings: u32,
    pub errors: u32,
    pub violations: Vec<RenderableViolation>,
}
