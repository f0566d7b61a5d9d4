use anyhow::{Context, Result};
use log::{info, warn};

use arxiv_daily_lib::{logger, pipeline, RunConfig};

fn main() -> Result<()> {
    logger::init();
    info!("Starting Arxiv Daily...");

    let config = RunConfig::from_env().context("invalid configuration")?;
    info!("Listing date {}, output in {}", config.date, config.files_dir.display());

    let report = pipeline::run(&config).context("daily run failed")?;

    for (address, reason) in &report.failed {
        warn!("Not delivered to {}: {}", address, reason);
    }
    info!("Arxiv Daily completed. {} digests sent.", report.sent.len());
    Ok(())
}
