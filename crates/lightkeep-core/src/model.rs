use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope shared by every row derived from one audit. `fetch_time` is
/// assigned once (from the report) and propagated unchanged to all rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordKey {
    pub url: String,
    pub template: Option<String>,
    pub fetch_time: String,
    pub job_id: Option<String>,
}

/// Raw report returned by an audit provider.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub payload: Value,
}

impl AuditReport {
    /// Returns the report's runtime error, if it carries one. A present but
    /// null field, or the `NO_ERROR` sentinel, counts as no error.
    pub fn runtime_error(&self) -> Option<(String, String)> {
        let err = self.payload.get("runtimeError")?;
        if err.is_null() {
            return None;
        }
        let code = err
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();
        if code == "NO_ERROR" {
            return None;
        }
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some((code, message))
    }
}

/// The fixed top-level timing metrics of one audit. `page_size_kb` is the
/// raw byte weight divided by 1024; the divisor is contractual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub page_size_kb: f64,
    pub first_contentful_paint_ms: f64,
    pub max_potential_fid_ms: f64,
    pub time_to_interactive_ms: f64,
    pub first_meaningful_paint_ms: f64,
    pub first_cpu_idle_ms: f64,
    pub largest_contentful_paint_ms: f64,
    pub cumulative_layout_shift: f64,
    pub total_blocking_time_ms: f64,
    pub speed_index: f64,
}

/// One network resource fetched during the page load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub resource_url: String,
    pub resource_type: String,
    pub start_time_ms: f64,
    pub end_time_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub audit_text: String,
    pub estimated_savings_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    pub label: String,
    pub value: f64,
}

/// Items of one whitelisted diagnostic. The bundle always carries one group
/// per whitelisted id; a perfectly scored or unscored diagnostic has an
/// empty item list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticGroup {
    pub id: String,
    pub items: Vec<DiagnosticItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "budget_type")]
pub enum BudgetViolation {
    Performance {
        item_label: String,
        request_count: i64,
        transfer_size: i64,
        count_over_budget: i64,
        size_over_budget: i64,
    },
    Timing {
        item_label: String,
        measurement: f64,
        over_budget: f64,
    },
}

/// Normalized output of decomposing one raw report.
#[derive(Debug, Clone)]
pub struct RecordBundle {
    pub key: RecordKey,
    pub payload: Value,
    pub metrics: MetricRecord,
    pub resources: Vec<ResourceEntry>,
    pub opportunities: Vec<SavingsOpportunity>,
    pub diagnostics: Vec<DiagnosticGroup>,
    pub budgets: Vec<BudgetViolation>,
}

/// One audit target as fed into a run (from the input file or the urls table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRow {
    pub url: String,
    pub template: Option<String>,
}

/// A registered recurring target as stored in the urls table.
#[derive(Debug, Clone)]
pub struct AuditTarget {
    pub url: String,
    pub template: Option<String>,
    pub first_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub interval_days: i64,
    pub lifetime_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub url: String,
    pub status: TargetStatus,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcomes: Vec<TargetOutcome>,
    pub registered: usize,
    pub expired_removed: usize,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == TargetStatus::Completed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }
}
