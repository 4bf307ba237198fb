use anyhow::{Context, Result};
use clap::Parser;
use pagecraft_cli::{run, Cli};
use pagecraft_core::telemetry::init_tracing;
use pagecraft_core::EngineConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment variables
    let config = EngineConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log_filter).context("Failed to initialize tracing")?;

    let output = run(cli, &config)?;
    let text = serde_json::to_string_pretty(&output).context("Failed to format output")?;
    println!("{}", text);

    Ok(())
}
