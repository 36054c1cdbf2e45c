use anyhow::{Context, Result};
use clap::Args;
use offer_cli::config::Settings;
use offer_cli::HttpSink;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug)]
pub struct Cli {
    /// Offers JSON file produced by `build`
    #[arg(short, long)]
    input: PathBuf,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

pub async fn run(args: Cli, settings: &Settings) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.input)
        .await
        .context("Failed to read offers file")?;
    let offers: Vec<serde_json::Value> =
        serde_json::from_str(&content).context("Offers file is not a JSON array")?;
    if offers.is_empty() {
        anyhow::bail!("Offers file is empty");
    }

    let sink = HttpSink::new(&settings.api_base, Duration::from_secs(args.timeout))?;
    info!(endpoint = %sink.endpoint(), offers = offers.len(), "Submitting offers file");
    sink.post_json(&offers)
        .await
        .context("Offer batch was not submitted")?;

    println!("Submitted {} offers to {}", offers.len(), sink.endpoint());
    Ok(())
}
