use anyhow::Result;
use tracing::{info, warn};

use yad2_watcher::config::AppConfig;
use yad2_watcher::monitor::Monitor;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yad2_watcher=debug".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    // Missing required values exit non-zero with the config error
    let config = AppConfig::from_env()?;

    if !config.is_marketplace_url() {
        warn!("This scraper is optimized for yad2.co.il");
    }

    info!("Starting Yad2 watcher...");
    Monitor::new(config).run().await;

    Ok(())
}
