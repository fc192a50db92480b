use crate::config::{AuditSettings, RecurringPolicy};
use crate::model::{RunSummary, TargetOutcome, TargetRow, TargetStatus};
use crate::report::decompose::decompose;
use crate::storage::store::Store;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub enum RunMode {
    /// Audit the given input rows once.
    Batch(Vec<TargetRow>),
    /// Re-audit every registered target whose interval has elapsed.
    Auto,
}

#[derive(Debug, Clone)]
pub struct RunPlan {
    pub mode: RunMode,
    /// When set on a batch run, every input target is (re-)registered for
    /// periodic re-auditing during cleanup. Ignored in automatic mode, where
    /// each row carries its own interval and lifetime.
    pub recurring: Option<RecurringPolicy>,
}

/// Drives one run: target discovery, the sequential audit loop, persistence
/// and the cleanup phase. Audits run strictly one at a time to bound browser
/// usage and keep throttled measurements comparable across targets.
pub struct Scheduler {
    pub store: Store,
    pub client: Arc<dyn crate::providers::audit::AuditClient>,
    pub settings: AuditSettings,
    pub job_id: Option<String>,
}

impl Scheduler {
    pub async fn run(&self, plan: RunPlan, today: NaiveDate) -> anyhow::Result<RunSummary> {
        let (targets, auto) = match plan.mode {
            RunMode::Batch(rows) => {
                info!(count = rows.len(), "processing input batch");
                (rows, false)
            }
            RunMode::Auto => {
                let due = self.store.due_targets(today)?;
                info!(count = due.len(), "found URLs to automatically update");
                (due, true)
            }
        };

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in &targets {
            match self.audit_one(target).await {
                Ok(()) => {
                    if auto {
                        self.store.mark_audited(&target.url, today)?;
                    }
                    outcomes.push(TargetOutcome {
                        url: target.url.clone(),
                        status: TargetStatus::Completed,
                        message: "ok".into(),
                    });
                }
                Err(e) => {
                    // One bad audit never aborts the batch.
                    warn!(url = %target.url, error = %e, "audit failed; continuing");
                    outcomes.push(TargetOutcome {
                        url: target.url.clone(),
                        status: TargetStatus::Failed,
                        message: e.to_string(),
                    });
                }
            }
        }

        let mut registered = 0;
        let mut expired_removed = 0;
        if auto {
            expired_removed = self.store.remove_expired(today)?;
            if expired_removed > 0 {
                info!(count = expired_removed, "retired expired targets");
            }
        } else if let Some(policy) = plan.recurring {
            for target in &targets {
                self.store
                    .upsert_target(&target.url, target.template.as_deref(), today, policy)?;
                registered += 1;
            }
            info!(count = registered, "registered recurring targets");
        }

        Ok(RunSummary {
            outcomes,
            registered,
            expired_removed,
        })
    }

    async fn audit_one(&self, target: &TargetRow) -> anyhow::Result<()> {
        info!(url = %target.url, provider = self.client.provider_name(), "performing audit");
        let report = self.client.run_audit(&target.url, &self.settings).await?;

        // A report that carries a runtime error is a soft failure: logged by
        // the caller, decomposition skipped, batch continues.
        if let Some((code, message)) = report.runtime_error() {
            anyhow::bail!("audit runtime error {code}: {message}");
        }

        let bundle = decompose(
            &target.url,
            target.template.as_deref(),
            self.job_id.as_deref(),
            &report.payload,
        )?;
        self.store.insert_bundle(&bundle)?;
        info!(url = %target.url, fetch_time = %bundle.key.fetch_time, "stored audit report");
        Ok(())
    }
}
