use async_trait::async_trait;
use lightkeep_core::config::AuditSettings;
use lightkeep_core::errors::AuditError;
use lightkeep_core::providers::audit::lighthouse::{
    BrowserHandle, BrowserLauncher, LighthouseClient,
};
use lightkeep_core::providers::audit::AuditClient;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingHandle {
    shutdowns: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserHandle for CountingHandle {
    fn port(&self) -> u16 {
        9222
    }

    async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct CountingLauncher {
    launches: Arc<AtomicUsize>,
    shutdowns: Arc<AtomicUsize>,
    fail_launch: bool,
}

#[async_trait]
impl BrowserLauncher for CountingLauncher {
    async fn launch(&self, _settings: &AuditSettings) -> Result<Box<dyn BrowserHandle>, AuditError> {
        if self.fail_launch {
            return Err(AuditError::BrowserLaunch("injected launch failure".into()));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingHandle {
            shutdowns: self.shutdowns.clone(),
        }))
    }
}

fn settings_with_missing_tool() -> AuditSettings {
    AuditSettings {
        lighthouse_bin: "/nonexistent/lighthouse-for-tests".into(),
        ..AuditSettings::default()
    }
}

#[tokio::test]
async fn failing_audit_still_releases_the_browser_exactly_once() {
    let launcher = Arc::new(CountingLauncher::default());
    let launches = launcher.launches.clone();
    let shutdowns = launcher.shutdowns.clone();

    let client = LighthouseClient::with_launcher(launcher);
    let err = client
        .run_audit("https://example.com", &settings_with_missing_tool())
        .await
        .unwrap_err();

    assert!(matches!(err, AuditError::Audit { .. }));
    assert_eq!(launches.load(Ordering::SeqCst), 1);
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn launch_failure_takes_no_further_action() {
    let launcher = Arc::new(CountingLauncher {
        fail_launch: true,
        ..CountingLauncher::default()
    });
    let launches = launcher.launches.clone();
    let shutdowns = launcher.shutdowns.clone();

    let client = LighthouseClient::with_launcher(launcher);
    let err = client
        .run_audit("https://example.com", &settings_with_missing_tool())
        .await
        .unwrap_err();

    assert!(matches!(err, AuditError::BrowserLaunch(_)));
    assert_eq!(launches.load(Ordering::SeqCst), 0);
    assert_eq!(shutdowns.load(Ordering::SeqCst), 0);
}
