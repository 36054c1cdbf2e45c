use anyhow::{Context, Result};
use clap::Args;
use offer_cli::config::Settings;
use offer_cli::{ClockSeed, FileSink, HttpSink, OfferBuilder, SubmissionSink};
use std::path::PathBuf;
use std::time::Duration;

use super::{load_wallet, ApprovalArgs, KeyArgs, PromptingWallet};

#[derive(Args, Debug)]
pub struct Cli {
    /// Semicolon-delimited CSV file with one offer per line
    #[arg(short, long)]
    input: PathBuf,

    /// Also keep a copy of the signed offers here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Declared content type of the input (defaults to the extension's type)
    #[arg(long)]
    content_type: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(flatten)]
    key: KeyArgs,

    #[command(flatten)]
    approval: ApprovalArgs,
}

pub async fn run(args: Cli, settings: &Settings) -> Result<()> {
    let wallet = load_wallet(args.key)?.map(|w| PromptingWallet::new(w, &args.approval));
    let builder = OfferBuilder::new(settings.namespace.clone());
    let sink = HttpSink::new(&settings.api_base, Duration::from_secs(args.timeout))?;

    let offers = builder
        .execute_offer_file(
            &args.input,
            args.content_type.as_deref(),
            &ClockSeed::new(),
            wallet.as_ref(),
            &sink,
        )
        .await
        .context("Offer batch was not submitted")?;

    if let Some(output) = &args.output {
        FileSink::new(output)
            .submit(&offers)
            .await
            .context("Failed to write offers")?;
    }

    println!("Submitted {} offers to {}", offers.len(), sink.endpoint());
    Ok(())
}
