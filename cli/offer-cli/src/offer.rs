use primitive_types::U256;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use std::str::FromStr;
use std::sync::Arc;

use crate::asset::Asset;
use crate::authorize::{Authorization, Signature};
use crate::claim::Claim;
use crate::common::hex_encode;
use crate::error::{OfferError, Result};
use crate::normalize::Address;
use crate::tree::BatchTree;

/// Batch-wide values shared by every offer of one batch.
#[derive(Debug, Clone)]
pub struct BatchSeal {
    pub merkle_root: [u8; 32],
    pub seed: U256,
    pub account: Address,
    pub signature: Signature,
}

/// One fully assembled offer.
#[derive(Debug, Clone)]
pub struct Offer {
    pub asset: Asset,
    pub claim: Claim,
    pub merkle_proofs: Vec<[u8; 32]>,
    pub seal: Arc<BatchSeal>,
}

/// Renders an integer as `0x`-prefixed hex with an even number of digits.
///
/// # Arguments
/// * `value` - Integer to render
///
/// # Returns
/// Lowercase hex left-padded to whole bytes; zero renders as `0x00`
pub fn to_hex_quantity(value: &U256) -> String {
    let digits = format!("{value:x}");
    if digits.len() % 2 == 1 {
        format!("0x0{digits}")
    } else {
        format!("0x{digits}")
    }
}

/// Renders an integer as an arbitrary-precision JSON number.
fn to_json_integer(value: &U256) -> serde_json::Result<serde_json::Number> {
    serde_json::Number::from_str(&value.to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OfferRecord<'a> {
    offeror: &'a Address,
    nft_contract: &'a Address,
    nft_id: String,
    sale_expiration: serde_json::Number,
    sale_contract: &'a Address,
    sale_amount: String,
    term_until_collateral_at_risk: serde_json::Number,
    buyback_contract: &'a Address,
    buyback_amount: String,
    claim: String,
    merkle_root: String,
    merkle_proofs: Vec<String>,
    signature: &'a Signature,
    seed: String,
}

impl Serialize for Offer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let asset = &self.asset;
        let sale_expiration = to_json_integer(&asset.sale_expiration).map_err(S::Error::custom)?;
        let term = to_json_integer(&asset.term_until_collateral_at_risk).map_err(S::Error::custom)?;
        OfferRecord {
            offeror: &asset.offeror,
            nft_contract: &asset.nft_contract,
            nft_id: to_hex_quantity(&asset.nft_id),
            sale_expiration,
            sale_contract: &asset.sale_contract,
            sale_amount: to_hex_quantity(&asset.sale_amount),
            term_until_collateral_at_risk: term,
            buyback_contract: &asset.buyback_contract,
            buyback_amount: to_hex_quantity(&asset.buyback_amount),
            claim: self.claim.to_string(),
            merkle_root: hex_encode(self.seal.merkle_root),
            merkle_proofs: self.merkle_proofs.iter().map(hex_encode).collect(),
            signature: &self.seal.signature,
            seed: hex_encode(self.seal.seed.to_big_endian()),
        }
        .serialize(serializer)
    }
}

/// Attaches root, per-index proof and the shared signature to each entry.
///
/// `entries` must be in the same order the tree was built from.
pub fn assemble(
    entries: Vec<(Asset, Claim)>,
    tree: &BatchTree,
    authorization: &Authorization,
) -> Result<Vec<Offer>> {
    if entries.len() != tree.leaf_count() {
        return Err(OfferError::BatchMismatch {
            entries: entries.len(),
            leaves: tree.leaf_count(),
        });
    }
    let seal = Arc::new(BatchSeal {
        merkle_root: tree.root(),
        seed: authorization.seed,
        account: authorization.account,
        signature: authorization.signature,
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (asset, claim))| {
            Ok(Offer {
                asset,
                claim,
                merkle_proofs: tree.proof(i)?,
                seal: Arc::clone(&seal),
            })
        })
        .collect()
}
