use crate::config::RecurringPolicy;
use crate::model::{AuditTarget, BudgetViolation, RecordBundle, TargetRow};
use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Owned connection to the audit store. Scoped to one run; dropped (and
/// therefore closed) on every exit path. Schema creation is idempotent and
/// runs once at open time.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        Self::from_connection(conn)
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(crate::storage::schema::DDL)
            .context("failed to initialize schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Writes one audit's bundle in a single transaction. The raw report
    /// envelope and the metric row go in first, then the derived groups, so
    /// referential ordering holds even without foreign keys.
    pub fn insert_bundle(&self, bundle: &RecordBundle) -> anyhow::Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let k = &bundle.key;

        tx.execute(
            "INSERT INTO raw_reports(url, template, fetch_time, job_id, report_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                k.url,
                k.template,
                k.fetch_time,
                k.job_id,
                serde_json::to_string(&bundle.payload)?
            ],
        )
        .context("insert raw report")?;

        let m = &bundle.metrics;
        tx.execute(
            "INSERT INTO gds_audits(
                url, template, fetch_time, job_id,
                page_size_kb, first_contentful_paint_ms, max_potential_fid_ms,
                time_to_interactive_ms, first_meaningful_paint_ms, first_cpu_idle_ms,
                largest_contentful_paint_ms, cumulative_layout_shift,
                total_blocking_time_ms, speed_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                k.url,
                k.template,
                k.fetch_time,
                k.job_id,
                m.page_size_kb,
                m.first_contentful_paint_ms,
                m.max_potential_fid_ms,
                m.time_to_interactive_ms,
                m.first_meaningful_paint_ms,
                m.first_cpu_idle_ms,
                m.largest_contentful_paint_ms,
                m.cumulative_layout_shift,
                m.total_blocking_time_ms,
                m.speed_index
            ],
        )
        .context("insert metric record")?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO resource_chart(
                    audit_url, template, fetch_time, job_id,
                    resource_url, resource_type, start_time_ms, end_time_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for r in &bundle.resources {
                stmt.execute(params![
                    k.url,
                    k.template,
                    k.fetch_time,
                    k.job_id,
                    r.resource_url,
                    r.resource_type,
                    r.start_time_ms,
                    r.end_time_ms
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO savings_opportunities(
                    audit_url, template, fetch_time, job_id, audit_text, estimated_savings_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for o in &bundle.opportunities {
                stmt.execute(params![
                    k.url,
                    k.template,
                    k.fetch_time,
                    k.job_id,
                    o.audit_text,
                    o.estimated_savings_ms
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO diagnostics(
                    audit_url, template, fetch_time, job_id,
                    diagnostic_id, item_label, item_value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for group in &bundle.diagnostics {
                for item in &group.items {
                    stmt.execute(params![
                        k.url,
                        k.template,
                        k.fetch_time,
                        k.job_id,
                        group.id,
                        item.label,
                        item.value
                    ])?;
                }
            }

            let mut stmt = tx.prepare(
                "INSERT INTO budgets(
                    audit_url, template, fetch_time, job_id, budget_type, item_label,
                    request_count, transfer_size, count_over_budget, size_over_budget,
                    measurement, over_budget)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for b in &bundle.budgets {
                match b {
                    BudgetViolation::Performance {
                        item_label,
                        request_count,
                        transfer_size,
                        count_over_budget,
                        size_over_budget,
                    } => {
                        stmt.execute(params![
                            k.url,
                            k.template,
                            k.fetch_time,
                            k.job_id,
                            "performance",
                            item_label,
                            request_count,
                            transfer_size,
                            count_over_budget,
                            size_over_budget,
                            Option::<f64>::None,
                            Option::<f64>::None
                        ])?;
                    }
                    BudgetViolation::Timing {
                        item_label,
                        measurement,
                        over_budget,
                    } => {
                        stmt.execute(params![
                            k.url,
                            k.template,
                            k.fetch_time,
                            k.job_id,
                            "timing",
                            item_label,
                            Option::<i64>::None,
                            Option::<i64>::None,
                            Option::<i64>::None,
                            Option::<i64>::None,
                            measurement,
                            over_budget
                        ])?;
                    }
                }
            }
        }

        tx.commit().context("commit audit bundle")?;
        Ok(())
    }

    /// (Re-)registers a recurring target. Replace-by-url semantics: delete
    /// then insert, never an upsert-merge.
    pub fn upsert_target(
        &self,
        url: &str,
        template: Option<&str>,
        today: NaiveDate,
        policy: RecurringPolicy,
    ) -> anyhow::Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM urls WHERE url = ?1", params![url])?;
        tx.execute(
            "INSERT INTO urls(url, template, first_date, latest_date, interval, lifetime)
             VALUES (?1, ?2, ?3, ?3, ?4, ?5)",
            params![
                url,
                template,
                today.to_string(),
                policy.interval_days,
                policy.lifetime_days
            ],
        )?;
        tx.commit().context("register target")?;
        Ok(())
    }

    /// Targets whose last run predates `today` minus their own interval.
    pub fn due_targets(&self, today: NaiveDate) -> anyhow::Result<Vec<TargetRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT url, template FROM urls
             WHERE latest_date < date(?1, '-' || interval || ' days')
             ORDER BY url",
        )?;
        let rows = stmt.query_map(params![today.to_string()], |row| {
            Ok(TargetRow {
                url: row.get(0)?,
                template: row.get(1)?,
            })
        })?;

        let mut targets = Vec::new();
        for r in rows {
            targets.push(r?);
        }
        Ok(targets)
    }

    /// Advances a target's latest run date. Monotonic: never moves backwards.
    pub fn mark_audited(&self, url: &str, today: NaiveDate) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE urls SET latest_date = ?2 WHERE url = ?1 AND latest_date < ?2",
            params![url, today.to_string()],
        )?;
        Ok(())
    }

    /// Deletes targets whose total age exceeds their lifetime. Returns the
    /// number of retired rows.
    pub fn remove_expired(&self, today: NaiveDate) -> anyhow::Result<usize> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM urls WHERE first_date < date(?1, '-' || lifetime || ' days')",
            params![today.to_string()],
        )?;
        Ok(removed)
    }

    pub fn list_targets(&self) -> anyhow::Result<Vec<AuditTarget>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT url, template, first_date, latest_date, interval, lifetime
             FROM urls ORDER BY url",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;

        let mut targets = Vec::new();
        for r in rows {
            let (url, template, first, latest, interval_days, lifetime_days) = r?;
            targets.push(AuditTarget {
                url,
                template,
                first_date: first.parse().context("malformed first_date")?,
                latest_date: latest.parse().context("malformed latest_date")?,
                interval_days,
                lifetime_days,
            });
        }
        Ok(targets)
    }

    pub fn count_rows(&self, table: &str) -> anyhow::Result<i64> {
        // Allowlist to keep table names out of dynamic SQL.
        if ![
            "raw_reports",
            "gds_audits",
            "resource_chart",
            "savings_opportunities",
            "diagnostics",
            "budgets",
            "urls",
        ]
        .contains(&table)
        {
            anyhow::bail!("invalid table name for count_rows: {}", table);
        }
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(n)
    }
}
