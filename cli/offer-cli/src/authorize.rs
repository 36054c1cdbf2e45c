//! One wallet signature per batch, bound to the batch root and a fresh seed.

use primitive_types::U256;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::claim::left_pad32;
use crate::common::{hex_encode, keccak256, Hash256};
use crate::error::{OfferError, Result};
use crate::normalize::Address;

pub const ORDER_ACTION: &str = "order";

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Signing scheme used for the batch signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignatureKind {
    /// Personal-message signature over the 32-byte digest (not typed data).
    #[serde(rename = "personal_sign")]
    PersonalSign,
}

/// 65-byte secp256k1 signature laid out as `r ‖ s ‖ v`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 65]);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex_encode(self.0))
    }
}

/// Account discovery plus personal-message signing.
pub trait WalletProvider {
    fn accounts(&self) -> Result<Vec<Address>>;

    /// Signs `digest` as a personal message with `account`.
    ///
    /// A user declining the request is reported as `WalletRejected`.
    fn sign_message(&self, digest: &[u8; 32], account: &Address) -> Result<Signature>;
}

impl<W: WalletProvider + ?Sized> WalletProvider for &W {
    fn accounts(&self) -> Result<Vec<Address>> {
        (**self).accounts()
    }

    fn sign_message(&self, digest: &[u8; 32], account: &Address) -> Result<Signature> {
        (**self).sign_message(digest, account)
    }
}

/// Source of the per-authorization seed.
pub trait SeedSource {
    fn next_seed(&self) -> U256;
}

/// Wall-clock milliseconds, forced strictly increasing within the process.
#[derive(Debug, Default)]
pub struct ClockSeed {
    last: AtomicU64,
}

impl ClockSeed {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeedSource for ClockSeed {
    fn next_seed(&self) -> U256 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return U256::from(next),
                Err(actual) => prev = actual,
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedSeed(pub U256);

impl SeedSource for FixedSeed {
    fn next_seed(&self) -> U256 {
        self.0
    }
}

/// Result of authorizing one batch.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub account: Address,
    pub seed: U256,
    /// The exact bytes whose hash was signed.
    pub claim: Vec<u8>,
    pub digest: [u8; 32],
    pub signature: Signature,
    pub signature_kind: SignatureKind,
}

pub fn order_tag(namespace: &str) -> String {
    format!("{namespace}.{ORDER_ACTION}|")
}

/// Builds `"<namespace>.order|" ‖ root ‖ seed` with the seed as a 32-byte word.
pub fn encode_authorization(namespace: &str, root: &[u8; 32], seed: &U256) -> Result<Vec<u8>> {
    let tag = order_tag(namespace);
    let mut out = Vec::with_capacity(tag.len() + 64);
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(root);
    out.extend_from_slice(&left_pad32("seed", &seed.to_big_endian())?);
    Ok(out)
}

/// Hash a wallet actually signs for a personal message over `digest`.
pub fn personal_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    let mut message = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 32);
    message.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    message.extend_from_slice(digest);
    keccak256(&message)
}

/// Requests the single batch signature over `root`.
///
/// # Errors
/// `WalletUnavailable` without a wallet, `NoAccount` when the wallet exposes
/// no account, and whatever the wallet reports for the signing request
pub fn authorize_batch<H, S, W>(
    hasher: &H,
    seeds: &S,
    namespace: &str,
    root: &[u8; 32],
    wallet: Option<&W>,
) -> Result<Authorization>
where
    H: Hash256 + ?Sized,
    S: SeedSource + ?Sized,
    W: WalletProvider + ?Sized,
{
    let wallet = wallet.ok_or(OfferError::WalletUnavailable)?;
    let account = wallet
        .accounts()?
        .into_iter()
        .next()
        .ok_or(OfferError::NoAccount)?;

    let seed = seeds.next_seed();
    let claim = encode_authorization(namespace, root, &seed)?;
    let digest = hasher.hash(&claim);

    info!(%account, root = %hex_encode(root), %seed, "Requesting batch signature");
    let signature = wallet
        .sign_message(&digest, &account)
        .inspect_err(|e| warn!(error = %e, "Batch signature not obtained"))?;

    Ok(Authorization {
        account,
        seed,
        claim,
        digest,
        signature,
        signature_kind: SignatureKind::PersonalSign,
    })
}
