use anyhow::Context;
use clap::Args;
use offer_cli::authorize::{Signature, WalletProvider};
use offer_cli::{hex_encode, Address, LocalWallet, OfferError};
use std::io::{BufRead, Write};
use tracing::warn;
use zeroize::Zeroize;

pub mod account;
pub mod build;
pub mod execute;
pub mod submit;

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Private key (hex format, with or without 0x prefix)
    /// Alternatively, use "-" to read from stdin (more secure)
    #[arg(short = 'k', long, env = "NFPAWN_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
}

#[derive(Args, Debug)]
pub struct ApprovalArgs {
    /// Sign without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Loads the signing wallet, if a key was configured.
pub fn load_wallet(args: KeyArgs) -> anyhow::Result<Option<LocalWallet>> {
    let Some(mut key) = args.private_key else {
        return Ok(None);
    };
    if key == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read private key from stdin")?;
        key.zeroize();
        key = buffer.trim().to_string();
        buffer.zeroize();
    }
    let wallet = LocalWallet::from_hex(&key);
    key.zeroize();
    wallet.map(Some)
}

/// Asks on the terminal before every signature.
pub struct PromptingWallet {
    inner: LocalWallet,
    assume_yes: bool,
}

impl PromptingWallet {
    pub fn new(inner: LocalWallet, approval: &ApprovalArgs) -> Self {
        Self {
            inner,
            assume_yes: approval.yes,
        }
    }
}

impl WalletProvider for PromptingWallet {
    fn accounts(&self) -> Result<Vec<Address>, OfferError> {
        self.inner.accounts()
    }

    fn sign_message(&self, digest: &[u8; 32], account: &Address) -> Result<Signature, OfferError> {
        if !self.assume_yes {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "Signature request from {account}");
            let _ = writeln!(stderr, "  digest: {}", hex_encode(digest));
            let _ = write!(stderr, "Sign this batch? [y/N] ");
            let _ = stderr.flush();

            read_approval(&mut std::io::stdin().lock())?;
        }
        self.inner.sign_message(digest, account)
    }
}

/// Reads one answer line. Only `y`, `Y` or `yes` approves.
///
/// A closed input (for example after `-k -` consumed stdin) is reported
/// separately from an explicit refusal.
fn read_approval(reader: &mut impl BufRead) -> Result<(), OfferError> {
    let mut answer = String::new();
    let read = reader
        .read_line(&mut answer)
        .map_err(|e| OfferError::WalletRejected(format!("no answer: {e}")))?;
    if read == 0 {
        warn!("No approval answer on stdin");
        return Err(OfferError::WalletRejected(
            "no answer on stdin; pass --yes to sign non-interactively".into(),
        ));
    }
    if !matches!(answer.trim(), "y" | "Y" | "yes") {
        warn!("Signature request declined");
        return Err(OfferError::WalletRejected("declined by user".into()));
    }
    Ok(())
}
