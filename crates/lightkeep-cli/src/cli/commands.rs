use super::args::*;
use lightkeep_core::config::{AuditSettings, RecurringPolicy};
use lightkeep_core::engine::runner::{RunMode, RunPlan, Scheduler};
use lightkeep_core::providers::audit::{fake::FakeAuditClient, lighthouse::LighthouseClient, AuditClient};
use lightkeep_core::storage::store::Store;
use lightkeep_core::{input, report};
use std::sync::Arc;
use tracing::info;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => cmd_run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    let files = match input::discover(&args.input_dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("input error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    // Input validation happens before anything is opened or audited.
    let mode = match &files.csv {
        Some(path) => match input::read_targets(path) {
            Ok(targets) => RunMode::Batch(targets),
            Err(e) => {
                eprintln!("input error: {e}");
                return Ok(exit_codes::CONFIG_ERROR);
            }
        },
        None => RunMode::Auto,
    };

    let client: Arc<dyn AuditClient> = match args.provider.as_str() {
        "lighthouse" => Arc::new(LighthouseClient::new()),
        "fake" => Arc::new(FakeAuditClient::new()),
        other => {
            eprintln!("config error: unknown provider \"{other}\" (expected lighthouse|fake)");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    info!(
        db = %args.db.display(),
        provider = %args.provider,
        recurring = args.recurring,
        "starting audit run"
    );

    ensure_parent_dir(&args.db)?;
    let store = Store::open(&args.db)?;

    let scheduler = Scheduler {
        store,
        client,
        settings: AuditSettings {
            cpu_slowdown: args.cpu_slowdown,
            budget_path: files.budget,
            lighthouse_bin: args.lighthouse_bin,
            chrome_bin: args.chrome_bin,
            extra_chrome_flags: Vec::new(),
        },
        job_id: args.job_id,
    };

    let plan = RunPlan {
        mode,
        recurring: args.recurring.then(|| RecurringPolicy {
            interval_days: i64::from(args.interval),
            lifetime_days: i64::from(args.lifetime),
        }),
    };

    let summary = scheduler.run(plan, chrono::Utc::now().date_naive()).await?;
    report::console::print_summary(&summary);

    Ok(exit_codes::OK)
}

fn ensure_parent_dir(path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
