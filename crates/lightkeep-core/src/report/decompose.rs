use crate::model::{
    BudgetViolation, DiagnosticGroup, DiagnosticItem, MetricRecord, RecordBundle, RecordKey,
    ResourceEntry, SavingsOpportunity,
};
use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// The fixed diagnostic whitelist with its per-id item field mapping,
/// iterated uniformly instead of one code path per diagnostic.
struct DiagnosticSpec {
    id: &'static str,
    label_path: &'static [&'static str],
    value_field: &'static str,
}

const DIAGNOSTICS: &[DiagnosticSpec] = &[
    DiagnosticSpec {
        id: "mainthread-work-breakdown",
        label_path: &["groupLabel"],
        value_field: "duration",
    },
    DiagnosticSpec {
        id: "bootup-time",
        label_path: &["url"],
        value_field: "total",
    },
    DiagnosticSpec {
        id: "font-display",
        label_path: &["url"],
        value_field: "wastedMs",
    },
    DiagnosticSpec {
        id: "third-party-summary",
        label_path: &["entity", "text"],
        value_field: "blockingTime",
    },
    DiagnosticSpec {
        id: "dom-size",
        label_path: &["statistic"],
        value_field: "value",
    },
];

/// Flattens one raw report into a normalized record bundle. Pure: no I/O.
///
/// The report schema is trusted; a missing fixed metric or missing
/// `fetchTime` fails this target's decomposition rather than being silently
/// substituted with zeros.
pub fn decompose(
    url: &str,
    template: Option<&str>,
    job_id: Option<&str>,
    payload: &Value,
) -> Result<RecordBundle> {
    let fetch_time = payload
        .get("fetchTime")
        .and_then(Value::as_str)
        .context("report is missing fetchTime")?;
    let audits = payload
        .get("audits")
        .and_then(Value::as_object)
        .context("report has no audits map")?;

    let key = RecordKey {
        url: url.to_string(),
        template: template.map(str::to_string),
        fetch_time: fetch_time.to_string(),
        job_id: job_id.map(str::to_string),
    };

    let metrics = MetricRecord {
        // Raw byte weight divided by 1024; the divisor is contractual (KB).
        page_size_kb: numeric_value(audits, "total-byte-weight")? / 1024.0,
        first_contentful_paint_ms: numeric_value(audits, "first-contentful-paint")?,
        max_potential_fid_ms: numeric_value(audits, "max-potential-fid")?,
        time_to_interactive_ms: numeric_value(audits, "interactive")?,
        first_meaningful_paint_ms: numeric_value(audits, "first-meaningful-paint")?,
        first_cpu_idle_ms: numeric_value(audits, "first-cpu-idle")?,
        largest_contentful_paint_ms: numeric_value(audits, "largest-contentful-paint")?,
        cumulative_layout_shift: numeric_value(audits, "cumulative-layout-shift")?,
        total_blocking_time_ms: numeric_value(audits, "total-blocking-time")?,
        speed_index: numeric_value(audits, "speed-index")?,
    };

    Ok(RecordBundle {
        key,
        payload: payload.clone(),
        metrics,
        resources: extract_resources(audits),
        opportunities: extract_opportunities(audits),
        diagnostics: extract_diagnostics(audits),
        budgets: extract_budgets(audits),
    })
}

fn numeric_value(audits: &Map<String, Value>, id: &str) -> Result<f64> {
    audits
        .get(id)
        .and_then(|a| a.get("numericValue"))
        .and_then(Value::as_f64)
        .with_context(|| format!("report is missing numeric audit \"{id}\""))
}

fn detail_items<'a>(audits: &'a Map<String, Value>, id: &str) -> Option<&'a Vec<Value>> {
    audits
        .get(id)?
        .pointer("/details/items")
        .and_then(Value::as_array)
}

fn num_field(item: &Value, key: &str) -> Option<f64> {
    match item.get(key)? {
        Value::Number(n) => n.as_f64(),
        // Some report versions wrap numeric cells in { "value": n }.
        Value::Object(o) => o.get("value").and_then(Value::as_f64),
        _ => None,
    }
}

fn str_path(item: &Value, path: &[&str]) -> Option<String> {
    let mut cur = item;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_str().map(str::to_string)
}

fn extract_resources(audits: &Map<String, Value>) -> Vec<ResourceEntry> {
    detail_items(audits, "network-requests")
        .map(|items| {
            items
                .iter()
                .map(|item| ResourceEntry {
                    resource_url: item
                        .get("url")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    resource_type: item
                        .get("resourceType")
                        .and_then(Value::as_str)
                        .unwrap_or("Other")
                        .to_string(),
                    start_time_ms: num_field(item, "startTime").unwrap_or(0.0),
                    end_time_ms: num_field(item, "endTime").unwrap_or(0.0),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn extract_opportunities(audits: &Map<String, Value>) -> Vec<SavingsOpportunity> {
    let mut out = Vec::new();
    for audit in audits.values() {
        if audit.pointer("/details/type").and_then(Value::as_str) == Some("opportunity") {
            out.push(SavingsOpportunity {
                audit_text: audit
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                estimated_savings_ms: audit
                    .pointer("/details/overallSavingsMs")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
            });
        }
    }
    out
}

fn extract_diagnostics(audits: &Map<String, Value>) -> Vec<DiagnosticGroup> {
    DIAGNOSTICS
        .iter()
        .map(|spec| {
            // Items only surface when the score is defined and imperfect;
            // absent, perfect or unscored diagnostics keep an empty group.
            let imperfect = audits
                .get(spec.id)
                .and_then(|a| a.get("score"))
                .and_then(Value::as_f64)
                .map(|score| score != 1.0)
                .unwrap_or(false);

            let items = if imperfect {
                detail_items(audits, spec.id)
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| DiagnosticItem {
                                label: str_path(item, spec.label_path).unwrap_or_default(),
                                value: num_field(item, spec.value_field).unwrap_or(0.0),
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            } else {
                Vec::new()
            };

            DiagnosticGroup {
                id: spec.id.to_string(),
                items,
            }
        })
        .collect()
}

/// "2 requests" -> 2; anything without digits -> 0.
fn digits_only(value: Option<&Value>) -> i64 {
    value
        .and_then(Value::as_str)
        .map(|s| {
            s.chars()
                .filter(|c| c.is_ascii_digit())
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

fn extract_budgets(audits: &Map<String, Value>) -> Vec<BudgetViolation> {
    let mut out = Vec::new();

    if let Some(items) = detail_items(audits, "performance-budget") {
        for item in items {
            out.push(BudgetViolation::Performance {
                item_label: item
                    .get("label")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                request_count: item.get("requestCount").and_then(Value::as_i64).unwrap_or(0),
                transfer_size: item.get("transferSize").and_then(Value::as_i64).unwrap_or(0),
                count_over_budget: digits_only(item.get("countOverBudget")),
                size_over_budget: item
                    .get("sizeOverBudget")
                    .and_then(Value::as_i64)
                    .unwrap_or(0),
            });
        }
    }

    if let Some(items) = detail_items(audits, "timing-budget") {
        for item in items {
            out.push(BudgetViolation::Timing {
                item_label: item
                    .get("label")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                measurement: num_field(item, "measurement").unwrap_or(0.0),
                over_budget: num_field(item, "overBudget").unwrap_or(0.0),
            });
        }
    }

    out
}
