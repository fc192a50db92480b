use crate::config::AuditSettings;
use crate::errors::AuditError;
use crate::model::AuditReport;
use crate::providers::audit::AuditClient;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Deterministic audit provider for tests and dry runs. Returns a canned
/// report shaped like a real one; URLs in `fail_urls` error instead.
#[derive(Debug, Default)]
pub struct FakeAuditClient {
    pub fail_urls: HashSet<String>,
    pub fetch_time: Option<String>,
}

impl FakeAuditClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing<I: IntoIterator<Item = String>>(urls: I) -> Self {
        Self {
            fail_urls: urls.into_iter().collect(),
            fetch_time: None,
        }
    }

    pub fn with_fetch_time(mut self, fetch_time: &str) -> Self {
        self.fetch_time = Some(fetch_time.to_string());
        self
    }
}

#[async_trait]
impl AuditClient for FakeAuditClient {
    async fn run_audit(
        &self,
        url: &str,
        _settings: &AuditSettings,
    ) -> Result<AuditReport, AuditError> {
        if self.fail_urls.contains(url) {
            return Err(AuditError::Audit {
                url: url.to_string(),
                message: "injected failure".into(),
            });
        }
        let fetch_time = self
            .fetch_time
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
        Ok(AuditReport {
            payload: sample_report(url, &fetch_time),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// A representative report: all fixed metrics, two network resources, one
/// savings opportunity and a mix of perfect and imperfect diagnostics.
pub fn sample_report(url: &str, fetch_time: &str) -> Value {
    json!({
        "requestedUrl": url,
        "finalUrl": url,
        "fetchTime": fetch_time,
        "audits": {
            "total-byte-weight": { "numericValue": 409600.0 },
            "first-contentful-paint": { "numericValue": 1200.0 },
            "max-potential-fid": { "numericValue": 130.0 },
            "interactive": { "numericValue": 3500.0 },
            "first-meaningful-paint": { "numericValue": 1400.0 },
            "first-cpu-idle": { "numericValue": 3100.0 },
            "largest-contentful-paint": { "numericValue": 2100.0 },
            "cumulative-layout-shift": { "numericValue": 0.02 },
            "total-blocking-time": { "numericValue": 220.0 },
            "speed-index": { "numericValue": 2600.0 },
            "network-requests": {
                "details": {
                    "type": "table",
                    "items": [
                        {
                            "url": format!("{url}/static/app.js"),
                            "resourceType": "Script",
                            "startTime": 12.5,
                            "endTime": 180.0
                        },
                        {
                            "url": format!("{url}/static/logo.png"),
                            "startTime": 20.0,
                            "endTime": 95.0
                        }
                    ]
                }
            },
            "render-blocking-resources": {
                "title": "Eliminate render-blocking resources",
                "details": { "type": "opportunity", "overallSavingsMs": 240.0 }
            },
            "mainthread-work-breakdown": {
                "score": 0.55,
                "details": {
                    "items": [
                        { "groupLabel": "Script Evaluation", "duration": 820.0 },
                        { "groupLabel": "Style & Layout", "duration": 310.0 }
                    ]
                }
            },
            "bootup-time": {
                "score": 1.0,
                "details": {
                    "items": [ { "url": format!("{url}/static/app.js"), "total": 500.0 } ]
                }
            },
            "font-display": { "score": 1.0, "details": { "items": [] } },
            "third-party-summary": { "score": 1.0, "details": { "items": [] } },
            "dom-size": {
                "score": 0.9,
                "details": {
                    "items": [ { "statistic": "Total DOM Elements", "value": 1450.0 } ]
                }
            }
        }
    })
}
