use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use poolwarden::app::{self, AppCfg};
use poolwarden::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "AMM swap guard and pool rebalancer simulator")]
struct Args {
    /// Path to scenario config file
    #[arg(long, default_value = "Config.toml")]
    config: PathBuf,

    /// Cooldown between an address's trades in seconds (overrides config, max 60)
    #[arg(long)]
    cooldown_seconds: Option<u64>,

    /// Write the run report as JSON to this path instead of stdout
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let cfg = Config::from_file(&args.config)?;
    let app_cfg = AppCfg::from_config(cfg, args.cooldown_seconds, args.report)?;
    app::run(app_cfg).await
}
