//! # talend2dbt: Talend to dbt on the command line
//!
//! This binary is a thin entrypoint; all logic lives in the
//! `talend2dbt_cli` library crate.

use anyhow::Result;
use clap::Parser;
use talend2dbt_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for JSON output.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("[talend2dbt error] {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
