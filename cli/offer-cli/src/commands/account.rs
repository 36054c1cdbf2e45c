use anyhow::Result;
use clap::Args;

use super::{load_wallet, KeyArgs};

#[derive(Args, Debug)]
pub struct Cli {
    #[command(flatten)]
    key: KeyArgs,
}

pub fn run(args: Cli) -> Result<()> {
    let wallet = load_wallet(args.key)?.ok_or(offer_cli::OfferError::WalletUnavailable)?;
    println!("{}", wallet.address());
    Ok(())
}
