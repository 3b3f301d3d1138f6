use anyhow::Context;
use clap::Parser;

use craftledger_api::cli::{self, Cli};
use craftledger_api::Config;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    craftledger_observability::init_with(config.log_format);
    tracing::info!(?config, "configuration loaded");

    let args = Cli::parse();
    let workshop = cli::open(&config)?;

    let output = cli::run(&workshop, args.command)?;
    let rendered = serde_json::to_string_pretty(&output).context("rendering output")?;
    println!("{rendered}");
    Ok(())
}
