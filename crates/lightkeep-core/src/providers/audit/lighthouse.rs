use crate::config::AuditSettings;
use crate::errors::AuditError;
use crate::model::AuditReport;
use crate::providers::audit::AuditClient;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// A running browser process scoped to one audit.
#[async_trait]
pub trait BrowserHandle: Send {
    fn port(&self) -> u16;
    async fn shutdown(&mut self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, settings: &AuditSettings) -> Result<Box<dyn BrowserHandle>, AuditError>;
}

/// Common Chrome executable locations, checked before falling back to $PATH.
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

async fn find_chrome(explicit: Option<&PathBuf>) -> Result<PathBuf, AuditError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(AuditError::BrowserLaunch(format!(
            "configured browser binary {} does not exist",
            path.display()
        )));
    }

    for path in CHROME_PATHS {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Ok(p.to_path_buf());
        }
    }

    for cmd in &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(output) = Command::new("which").arg(cmd).output().await {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(AuditError::BrowserLaunch(
        "Chrome/Chromium not found in well-known locations or $PATH".into(),
    ))
}

fn free_port() -> Result<u16, AuditError> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))
        .map_err(|e| AuditError::BrowserLaunch(format!("failed to reserve a port: {e}")))?;
    let port = listener
        .local_addr()
        .map_err(|e| AuditError::BrowserLaunch(format!("failed to read reserved port: {e}")))?
        .port();
    Ok(port)
}

struct ChromeProcess {
    child: Child,
    port: u16,
}

#[async_trait]
impl BrowserHandle for ChromeProcess {
    fn port(&self) -> u16 {
        self.port
    }

    async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.child.kill().await?;
        Ok(())
    }
}

/// Launches one headless Chrome per audit with a private debugging port and
/// user-data directory.
#[derive(Debug, Default)]
pub struct ChromeLauncher;

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, settings: &AuditSettings) -> Result<Box<dyn BrowserHandle>, AuditError> {
        let binary = find_chrome(settings.chrome_bin.as_ref()).await?;
        let port = free_port()?;
        let user_data_dir = std::env::temp_dir().join(format!("lightkeep-chrome-{port}"));

        let mut cmd = Command::new(&binary);
        cmd.args([
            "--headless=new",
            "--no-sandbox",
            "--disable-gpu",
            "--disable-dev-shm-usage",
            "--no-first-run",
            "--no-default-browser-check",
        ])
        .arg(format!("--remote-debugging-port={port}"))
        .arg(format!("--user-data-dir={}", user_data_dir.display()))
        .args(&settings.extra_chrome_flags)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        // Backstop only; the normal path shuts the process down explicitly.
        .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            AuditError::BrowserLaunch(format!("failed to spawn {}: {e}", binary.display()))
        })?;

        debug!(browser = %binary.display(), port, "launched browser");

        // Wait for the debugging port to accept connections. If the process
        // dies or the port never comes up, acquisition has failed and the
        // half-launched process is reaped here.
        for _ in 0..40 {
            if let Ok(Some(status)) = child.try_wait() {
                return Err(AuditError::BrowserLaunch(format!(
                    "browser exited during startup with {status}"
                )));
            }
            if tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
                return Ok(Box::new(ChromeProcess { child, port }));
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }

        if let Err(e) = child.kill().await {
            warn!(error = %e, "failed to reap browser that never came up");
        }
        Err(AuditError::BrowserLaunch(format!(
            "browser debugging port {port} did not come up"
        )))
    }
}

/// Runs the Lighthouse CLI against a browser it launches and tears down per
/// audit.
pub struct LighthouseClient {
    launcher: Arc<dyn BrowserLauncher>,
}

impl LighthouseClient {
    pub fn new() -> Self {
        Self::with_launcher(Arc::new(ChromeLauncher))
    }

    pub fn with_launcher(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self { launcher }
    }

    async fn invoke_lighthouse(
        &self,
        url: &str,
        port: u16,
        settings: &AuditSettings,
    ) -> Result<AuditReport, AuditError> {
        let audit_err = |message: String| AuditError::Audit {
            url: url.to_string(),
            message,
        };

        let mut cmd = Command::new(&settings.lighthouse_bin);
        cmd.arg(url)
            .arg(format!("--port={port}"))
            .arg("--output=json")
            .arg("--quiet")
            .arg(format!(
                "--throttling.cpuSlowdownMultiplier={}",
                settings.cpu_slowdown
            ));
        if let Some(budget) = &settings.budget_path {
            cmd.arg(format!("--budget-path={}", budget.display()));
        }

        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                audit_err(format!("failed to execute {}: {e}", settings.lighthouse_bin))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(audit_err(format!(
                "{} exited with {}: {}",
                settings.lighthouse_bin,
                output.status,
                stderr.trim()
            )));
        }

        let payload = serde_json::from_slice(&output.stdout)
            .map_err(|e| audit_err(format!("report is not valid JSON: {e}")))?;
        Ok(AuditReport { payload })
    }
}

impl Default for LighthouseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditClient for LighthouseClient {
    async fn run_audit(
        &self,
        url: &str,
        settings: &AuditSettings,
    ) -> Result<AuditReport, AuditError> {
        let mut browser = self.launcher.launch(settings).await?;
        let outcome = self.invoke_lighthouse(url, browser.port(), settings).await;
        // The browser comes down on both paths; a shutdown failure is logged
        // and never masks the audit outcome.
        if let Err(e) = browser.shutdown().await {
            warn!(url, error = %e, "failed to shut down browser after audit");
        }
        outcome
    }

    fn provider_name(&self) -> &'static str {
        "lighthouse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_browser_path_is_used_verbatim() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let explicit = file.path().to_path_buf();
        let found = find_chrome(Some(&explicit)).await.unwrap();
        assert_eq!(found, explicit);
    }

    #[tokio::test]
    async fn missing_explicit_browser_path_is_a_launch_error() {
        let explicit = PathBuf::from("/nonexistent/chrome-for-tests");
        let err = find_chrome(Some(&explicit)).await.unwrap_err();
        assert!(matches!(err, AuditError::BrowserLaunch(_)));
    }
}
