use crate::config::AuditSettings;
use crate::errors::AuditError;
use crate::model::AuditReport;
use async_trait::async_trait;

/// One audit execution against a single URL. Implementations own the full
/// lifecycle of whatever browser resources they acquire: exactly one
/// acquisition is matched by exactly one release per invocation, on every
/// exit path.
#[async_trait]
pub trait AuditClient: Send + Sync {
    async fn run_audit(&self, url: &str, settings: &AuditSettings)
        -> Result<AuditReport, AuditError>;
    fn provider_name(&self) -> &'static str;
}

pub mod fake;
pub mod lighthouse;
