//! # BookIt CLI
//!
//! Entry point. Logging goes to stderr, results to stdout.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bookit_cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
