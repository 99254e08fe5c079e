mod config;
mod daily;
mod version;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use clockify::ClockifyClient;
use tracing::info;

use crate::{
    config::{open_config, write_default_config},
    daily::{DailySyncer, today_in},
    version::{long_version, short_version},
};

#[derive(Parser)]
#[command(version = short_version(), long_version = long_version())]
struct Args {
    #[arg(long, default_value = "clockify_config.json")]
    config: PathBuf,

    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.init {
        write_default_config(&args.config)?;
        info!(path = ?args.config, "Created default configuration");
        return Ok(());
    }

    tracing::info!(version = short_version(), "clocksync version");

    let config = open_config(&args.config).context("Failed to load configuration")?;
    info!(
        vault = %config.vault_path.display(),
        days_back = config.days_back.get(),
        time_zone = %config.time_zone,
        "Configuration loaded"
    );

    let client = ClockifyClient::new(&config.api_key, config.api.client_options())
        .context("Failed to create Clockify client")?;

    let today = today_in(config.time_zone);
    let summary = DailySyncer::new(&client, &config).run(today).await?;

    info!(
        updated = summary.updated,
        skipped = summary.skipped,
        failed = summary.failed,
        "Sync finished"
    );

    if summary.failed > 0 {
        anyhow::bail!("{} day(s) failed to sync", summary.failed);
    }

    Ok(())
}
