use std::path::PathBuf;

pub const DEFAULT_INTERVAL_DAYS: i64 = 30;
pub const DEFAULT_LIFETIME_DAYS: i64 = 90;

/// Knobs threaded from the CLI into the audit provider.
#[derive(Debug, Clone)]
pub struct AuditSettings {
    /// CPU throttling multiplier passed to the auditing tool.
    pub cpu_slowdown: f64,
    /// Optional budget.json sidecar; when set, the report will carry budget
    /// audits that the decomposer turns into violation rows.
    pub budget_path: Option<PathBuf>,
    /// Auditing tool binary name or path.
    pub lighthouse_bin: String,
    /// Explicit browser binary; discovered from well-known locations when
    /// unset.
    pub chrome_bin: Option<PathBuf>,
    pub extra_chrome_flags: Vec<String>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            cpu_slowdown: 1.0,
            budget_path: None,
            lighthouse_bin: "lighthouse".into(),
            chrome_bin: None,
            extra_chrome_flags: Vec::new(),
        }
    }
}

/// How a batch run registers its targets for later automatic re-auditing.
#[derive(Debug, Clone, Copy)]
pub struct RecurringPolicy {
    pub interval_days: i64,
    pub lifetime_days: i64,
}

impl Default for RecurringPolicy {
    fn default() -> Self {
        Self {
            interval_days: DEFAULT_INTERVAL_DAYS,
            lifetime_days: DEFAULT_LIFETIME_DAYS,
        }
    }
}
