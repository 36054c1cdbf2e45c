use anyhow::{Context, Result};
use clap::Args;
use offer_cli::config::Settings;
use offer_cli::{ClockSeed, FileSink, OfferBuilder, SubmissionSink};
use std::path::PathBuf;

use super::{load_wallet, ApprovalArgs, KeyArgs, PromptingWallet};

#[derive(Args, Debug)]
pub struct Cli {
    /// Semicolon-delimited CSV file with one offer per line
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file for the signed offers
    #[arg(short, long)]
    output: PathBuf,

    /// Declared content type of the input (defaults to the extension's type)
    #[arg(long)]
    content_type: Option<String>,

    #[command(flatten)]
    key: KeyArgs,

    #[command(flatten)]
    approval: ApprovalArgs,
}

pub async fn run(args: Cli, settings: &Settings) -> Result<()> {
    let wallet = load_wallet(args.key)?.map(|w| PromptingWallet::new(w, &args.approval));
    let builder = OfferBuilder::new(settings.namespace.clone());
    let sink = FileSink::new(&args.output);

    let text = offer_cli::input::read_offer_file(&args.input, args.content_type.as_deref())
        .await
        .with_context(|| format!("Failed to read {:?}", args.input))?;
    let offers = builder
        .build_offers(&text, &ClockSeed::new(), wallet.as_ref())
        .context("Failed to build offer batch")?;
    sink.submit(&offers)
        .await
        .context("Failed to write offers")?;

    println!("Wrote {} offers to {:?}", offers.len(), args.output);
    if let Some(first) = offers.first() {
        println!("Merkle root: {}", offer_cli::hex_encode(first.seal.merkle_root));
        println!("Signer: {}", first.seal.account);
    }
    Ok(())
}
