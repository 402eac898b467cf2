//! figgen binary entrypoint

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use figgen::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // FIGGEN_LOG overrides the default filter, e.g. FIGGEN_LOG=figgen=debug
    let filter = EnvFilter::try_from_env("FIGGEN_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    Cli::parse().execute().await
}
