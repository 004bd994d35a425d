use clap::Parser;
use clientprint::cli::{run_cli, Cli, LOG_ENV};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output only
    let log_level = std::env::var(LOG_ENV).unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(&log_level)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run_cli(&cli).await?;
    println!("{}", output);
    Ok(())
}
