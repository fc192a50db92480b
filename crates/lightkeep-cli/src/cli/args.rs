use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lightkeep",
    version,
    about = "Recurring website performance audit scheduler"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Run(RunArgs),
    Version,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// directory scanned for one targets CSV and an optional budget.json;
    /// a CSV selects batch mode, otherwise due registered targets are re-run
    #[arg(long, default_value = "input", env = "LIGHTKEEP_INPUT_DIR")]
    pub input_dir: PathBuf,

    #[arg(long, default_value = ".lightkeep/audits.db", env = "LIGHTKEEP_DB")]
    pub db: PathBuf,

    /// register batch targets for periodic re-auditing
    #[arg(long)]
    pub recurring: bool,

    /// days between automatic re-audits of a registered target
    #[arg(long, default_value_t = 30)]
    pub interval: u32,

    /// days a registered target stays alive before it is retired
    #[arg(long, default_value_t = 90)]
    pub lifetime: u32,

    /// tag every row written by this invocation
    #[arg(long, env = "LIGHTKEEP_JOB_ID")]
    pub job_id: Option<String>,

    /// audit provider: lighthouse|fake
    #[arg(long, default_value = "lighthouse")]
    pub provider: String,

    /// CPU throttling multiplier passed to the auditing tool
    #[arg(long, default_value_t = 1.0)]
    pub cpu_slowdown: f64,

    /// auditing tool binary
    #[arg(long, default_value = "lighthouse", env = "LIGHTKEEP_LIGHTHOUSE_BIN")]
    pub lighthouse_bin: String,

    /// explicit browser binary (discovered from well-known paths when unset)
    #[arg(long, env = "LIGHTKEEP_CHROME_BIN")]
    pub chrome_bin: Option<PathBuf>,
}
