pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS raw_reports (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  url TEXT NOT NULL,
  template TEXT,
  fetch_time TEXT NOT NULL,
  job_id TEXT,
  report_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS gds_audits (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  url TEXT NOT NULL,
  template TEXT,
  fetch_time TEXT NOT NULL,
  job_id TEXT,
  page_size_kb REAL NOT NULL,
  first_contentful_paint_ms REAL NOT NULL,
  max_potential_fid_ms REAL NOT NULL,
  time_to_interactive_ms REAL NOT NULL,
  first_meaningful_paint_ms REAL NOT NULL,
  first_cpu_idle_ms REAL NOT NULL,
  largest_contentful_paint_ms REAL NOT NULL,
  cumulative_layout_shift REAL NOT NULL,
  total_blocking_time_ms REAL NOT NULL,
  speed_index REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS resource_chart (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  audit_url TEXT NOT NULL,
  template TEXT,
  fetch_time TEXT NOT NULL,
  job_id TEXT,
  resource_url TEXT NOT NULL,
  resource_type TEXT NOT NULL,
  start_time_ms REAL NOT NULL,
  end_time_ms REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS savings_opportunities (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  audit_url TEXT NOT NULL,
  template TEXT,
  fetch_time TEXT NOT NULL,
  job_id TEXT,
  audit_text TEXT NOT NULL,
  estimated_savings_ms REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS diagnostics (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  audit_url TEXT NOT NULL,
  template TEXT,
  fetch_time TEXT NOT NULL,
  job_id TEXT,
  diagnostic_id TEXT NOT NULL,
  item_label TEXT NOT NULL,
  item_value REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS budgets (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  audit_url TEXT NOT NULL,
  template TEXT,
  fetch_time TEXT NOT NULL,
  job_id TEXT,
  budget_type TEXT NOT NULL,
  item_label TEXT NOT NULL,
  request_count INTEGER,
  transfer_size INTEGER,
  count_over_budget INTEGER,
  size_over_budget INTEGER,
  measurement REAL,
  over_budget REAL
);

CREATE TABLE IF NOT EXISTS urls (
  url TEXT PRIMARY KEY,
  template TEXT,
  first_date TEXT NOT NULL,
  latest_date TEXT NOT NULL,
  interval INTEGER NOT NULL,
  lifetime INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_raw_reports_url_fetch ON raw_reports(url, fetch_time);
CREATE INDEX IF NOT EXISTS idx_gds_audits_url_fetch ON gds_audits(url, fetch_time);
"#;
