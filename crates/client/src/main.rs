//! League of Fun terminal client binary.
//!
//! Main entry point for the `league` command.
//!
//! # Architecture
//!
//! This binary is the composition root that assembles:
//! 1. Configuration from the environment (and `.env`)
//! 2. The host with the built-in modules via ClientBuilder
//! 3. The REPL reading commands from stdin
//!
//! # Examples
//!
//! ```bash
//! LOF_MODULE=blamegame LOF_SETTING_ROUNDS=5 cargo run -p league-client
//! ```

use anyhow::{Context, Result};
use client_bootstrap::{ClientBuilder, ClientConfig, dirs};
use league_client::{Repl, logging};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Load configuration from environment
    let config = ClientConfig::from_env();

    // 2. Setup logging
    logging::setup_logging(&dirs::log_dir())?;

    tracing::info!("Starting League of Fun client");
    tracing::info!("Locale: {}", config.host.module.locale);
    tracing::info!("Persistence: {}", config.host.persist_module_state);

    // 3. Build host with the built-in modules
    let setup = ClientBuilder::new(config)
        .build()
        .await
        .context("failed to start host")?;
    let repl = Repl::new(setup.host.handle());

    println!("League of Fun. Type `help` for commands.");
    if setup.host.handle().snapshot().await?.is_some()
        && let Ok(screen) = setup.host.handle().render().await
    {
        println!("{screen}");
    }

    // 4. Run until quit or end of input
    let result = repl.run(BufReader::new(tokio::io::stdin())).await;

    setup.host.shutdown().await?;
    tracing::info!("Client shutdown complete");
    result
}
