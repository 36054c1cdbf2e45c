//! Fixed-layout claim encoding and hashing.
//!
//! Layout, concatenated with no length prefixes:
//!
//! ```text
//! "<namespace>.sellWithBuybackOffer|"
//! offeror            20 bytes
//! nftContract        20 bytes
//! nftId              32 bytes, big-endian, left-padded
//! saleExpiration     32 bytes
//! saleContract       20 bytes
//! saleAmount         32 bytes
//! termUntilCollateralAtRisk 32 bytes
//! buybackContract    20 bytes
//! buybackAmount      32 bytes
//! ```
//!
//! Any party verifying offers independently hashes exactly these bytes.

use primitive_types::U256;
use std::fmt;

use crate::asset::Asset;
use crate::common::{hex_encode, Hash256};
use crate::error::{OfferError, Result};

pub const CLAIM_ACTION: &str = "sellWithBuybackOffer";

/// Content address of one [`Asset`]; the Merkle leaf for that offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Claim(pub [u8; 32]);

impl Claim {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_encode(self.0))
    }
}

/// Returns the UTF-8 tag that prefixes every claim in `namespace`.
pub fn claim_tag(namespace: &str) -> String {
    format!("{namespace}.{CLAIM_ACTION}|")
}

/// Left-pads a big-endian integer to 32 bytes.
///
/// # Arguments
/// * `field` - Column name reported in errors
/// * `be_bytes` - Big-endian integer bytes of any width
///
/// # Returns
/// The value as a 32-byte big-endian word
///
/// # Errors
/// `FieldTooLarge` if the value is still wider than 32 bytes once leading
/// zero bytes are dropped; it is never truncated
pub fn left_pad32(field: &'static str, be_bytes: &[u8]) -> Result<[u8; 32]> {
    let start = be_bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(be_bytes.len());
    let significant = &be_bytes[start..];
    if significant.len() > 32 {
        return Err(OfferError::FieldTooLarge { field });
    }
    let mut out = [0u8; 32];
    out[32 - significant.len()..].copy_from_slice(significant);
    Ok(out)
}

fn word(field: &'static str, value: &U256) -> Result<[u8; 32]> {
    left_pad32(field, &value.to_big_endian())
}

/// Serializes `asset` into the byte string that gets hashed into its claim.
pub fn encode_claim(namespace: &str, asset: &Asset) -> Result<Vec<u8>> {
    let tag = claim_tag(namespace);
    let mut out = Vec::with_capacity(tag.len() + 4 * 20 + 5 * 32);
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(asset.offeror.as_bytes());
    out.extend_from_slice(asset.nft_contract.as_bytes());
    out.extend_from_slice(&word("nftId", &asset.nft_id)?);
    out.extend_from_slice(&word("saleExpiration", &asset.sale_expiration)?);
    out.extend_from_slice(asset.sale_contract.as_bytes());
    out.extend_from_slice(&word("saleAmount", &asset.sale_amount)?);
    out.extend_from_slice(&word(
        "termUntilCollateralAtRisk",
        &asset.term_until_collateral_at_risk,
    )?);
    out.extend_from_slice(asset.buyback_contract.as_bytes());
    out.extend_from_slice(&word("buybackAmount", &asset.buyback_amount)?);
    Ok(out)
}

/// Hashes the claim encoding of `asset`.
pub fn compute_claim<H: Hash256 + ?Sized>(
    hasher: &H,
    namespace: &str,
    asset: &Asset,
) -> Result<Claim> {
    let encoded = encode_claim(namespace, asset)?;
    Ok(Claim(hasher.hash(&encoded)))
}
