//! Teller portal - Main entry point.

use anyhow::Result;
use teller_common::config::Config;
use teller_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Teller portal v{}", env!("CARGO_PKG_VERSION"));

    // Start the portal server
    teller_server::start_server(&config).await
}
