use thiserror::Error;

/// Failures of a single audit execution. Launch failures are kept distinct so
/// the scheduler can tell "no browser came up" apart from "the audit itself
/// failed"; both are logged and skipped at the batch level.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("audit failed for {url}: {message}")]
    Audit { url: String, message: String },
}

/// Fatal input problems. These abort the run before any audit executes.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to scan input directory {dir}: {source}")]
    Scan {
        dir: String,
        source: std::io::Error,
    },

    #[error("expected exactly one CSV file in {dir}, found {found}")]
    MultipleCsv { dir: String, found: usize },

    #[error("failed to read {path}: {source}")]
    Read { path: String, source: csv::Error },

    #[error("{path} has no column matching \"{column}\" in its header")]
    MissingColumn { path: String, column: &'static str },
}
