//! Batch pipeline: rows → claims → tree → signature → offers.

use std::path::Path;
use tracing::{debug, info};

use crate::asset::{encode_row, Asset};
use crate::authorize::{authorize_batch, Authorization, SeedSource, WalletProvider};
use crate::claim::{compute_claim, Claim};
use crate::common::{hex_encode, Hash256, Keccak};
use crate::error::Result;
use crate::input::{parse_csv, read_offer_file};
use crate::normalize::{ChecksumAddress, Eip55};
use crate::offer::{assemble, Offer};
use crate::submit::SubmissionSink;
use crate::tree::BatchTree;

/// Stateless service bundling the hash and address capabilities with the
/// namespace all claims and authorizations are tagged with.
#[derive(Debug, Clone)]
pub struct OfferBuilder<H = Keccak, C = Eip55> {
    hasher: H,
    addresses: C,
    namespace: String,
}

impl OfferBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_capabilities(Keccak, Eip55, namespace)
    }
}

impl<H: Hash256, C: ChecksumAddress> OfferBuilder<H, C> {
    pub fn with_capabilities(hasher: H, addresses: C, namespace: impl Into<String>) -> Self {
        Self {
            hasher,
            addresses,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Encodes and hashes one row.
    pub fn claim_row<S: AsRef<str>>(&self, fields: &[S]) -> Result<(Asset, Claim)> {
        let asset = encode_row(&self.addresses, fields)?;
        let claim = compute_claim(&self.hasher, &self.namespace, &asset)?;
        Ok((asset, claim))
    }

    /// Encodes and hashes every row, stopping at the first bad one.
    ///
    /// Errors are tagged with the 1-based data row number.
    pub fn claim_rows<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Result<Vec<(Asset, Claim)>> {
        rows.iter()
            .enumerate()
            .map(|(i, fields)| {
                let entry = self.claim_row(fields).map_err(|e| e.in_row(i + 1))?;
                debug!(row = i + 1, claim = %entry.1, "Encoded row");
                Ok(entry)
            })
            .collect()
    }

    pub fn build_tree(&self, entries: &[(Asset, Claim)]) -> Result<BatchTree> {
        let claims: Vec<Claim> = entries.iter().map(|(_, claim)| *claim).collect();
        let tree = BatchTree::build(&self.hasher, &claims)?;
        info!(leaves = tree.leaf_count(), root = %hex_encode(tree.root()), "Built Merkle tree");
        Ok(tree)
    }

    pub fn authorize<S, W>(
        &self,
        seeds: &S,
        root: &[u8; 32],
        wallet: Option<&W>,
    ) -> Result<Authorization>
    where
        S: SeedSource + ?Sized,
        W: WalletProvider + ?Sized,
    {
        authorize_batch(&self.hasher, seeds, &self.namespace, root, wallet)
    }

    /// Turns CSV text into a signed batch of offers. All or nothing.
    pub fn build_offers<S, W>(&self, text: &str, seeds: &S, wallet: Option<&W>) -> Result<Vec<Offer>>
    where
        S: SeedSource + ?Sized,
        W: WalletProvider + ?Sized,
    {
        let rows = parse_csv(text);
        info!(rows = rows.len(), namespace = %self.namespace, "Parsed offer rows");

        let entries = self.claim_rows(&rows)?;
        let tree = self.build_tree(&entries)?;
        let authorization = self.authorize(seeds, &tree.root(), wallet)?;
        let offers = assemble(entries, &tree, &authorization)?;

        info!(
            offers = offers.len(),
            signer = %authorization.account,
            signature_kind = ?authorization.signature_kind,
            "Assembled offer batch"
        );
        Ok(offers)
    }

    /// Reads `path`, builds the signed batch and hands it to `sink`.
    pub async fn execute_offer_file<S, W, K>(
        &self,
        path: &Path,
        content_type: Option<&str>,
        seeds: &S,
        wallet: Option<&W>,
        sink: &K,
    ) -> Result<Vec<Offer>>
    where
        S: SeedSource + ?Sized,
        W: WalletProvider + ?Sized,
        K: SubmissionSink + ?Sized,
    {
        let text = read_offer_file(path, content_type).await?;
        let offers = self.build_offers(&text, seeds, wallet)?;
        sink.submit(&offers).await?;
        Ok(offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::tests::sample_row;
    use crate::authorize::tests::RejectingWallet;
    use crate::authorize::FixedSeed;
    use crate::error::OfferError;
    use crate::normalize::StrictEip55;
    use crate::wallet::tests::TEST_KEY;
    use crate::wallet::LocalWallet;
    use primitive_types::U256;

    fn csv(rows: &[Vec<String>]) -> String {
        let mut text = String::from("offeror;nftContract;nftId;saleExpiration;saleContract;saleAmount;term;buybackContract;buybackAmount\n");
        for row in rows {
            text.push_str(&row.join(" ; "));
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_claim_row_idempotent() {
        let builder = OfferBuilder::new("com.nfpawn");
        let (_, first) = builder.claim_row(&sample_row("9")).unwrap();
        let (_, second) = builder.claim_row(&sample_row("9")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_claim_rows_tags_row_number() {
        let builder = OfferBuilder::new("com.nfpawn");
        let mut bad = sample_row("2");
        bad[2] = "2x".into();
        let err = builder
            .claim_rows(&[sample_row("1"), bad, sample_row("3")])
            .unwrap_err();
        assert!(matches!(err, OfferError::Row { row: 2, .. }));
        assert!(matches!(err.kind(), OfferError::InvalidInteger { field: "nftId", .. }));
    }

    #[test]
    fn test_build_offers_empty_batch() {
        let builder = OfferBuilder::new("com.nfpawn");
        let wallet = LocalWallet::from_hex(TEST_KEY).unwrap();
        let err = builder
            .build_offers(&csv(&[]), &FixedSeed(U256::one()), Some(&wallet))
            .unwrap_err();
        assert!(matches!(err, OfferError::EmptyBatch));
    }

    #[test]
    fn test_build_offers_rejected_signature() {
        let builder = OfferBuilder::new("com.nfpawn");
        let err = builder
            .build_offers(
                &csv(&[sample_row("1")]),
                &FixedSeed(U256::one()),
                Some(&RejectingWallet),
            )
            .unwrap_err();
        assert!(matches!(err, OfferError::WalletRejected(_)));
    }

    #[test]
    fn test_build_offers_short_row_aborts_batch() {
        let builder = OfferBuilder::new("com.nfpawn");
        let wallet = LocalWallet::from_hex(TEST_KEY).unwrap();
        let mut short = sample_row("2");
        short.truncate(5);
        let err = builder
            .build_offers(
                &csv(&[sample_row("1"), short]),
                &FixedSeed(U256::one()),
                Some(&wallet),
            )
            .unwrap_err();
        assert!(matches!(err.kind(), OfferError::MalformedRow { found: 5 }));
    }

    #[test]
    fn test_miscased_address_recased_by_default_rejected_when_strict() {
        let mut row = sample_row("1");
        row[0] = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".into();

        let (asset, _) = OfferBuilder::new("com.nfpawn").claim_row(&row).unwrap();
        assert_eq!(
            asset.offeror.to_checksum(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );

        let strict = OfferBuilder::with_capabilities(Keccak, StrictEip55, "com.nfpawn");
        let err = strict.claim_rows(&[sample_row("2"), row]).unwrap_err();
        assert!(matches!(err, OfferError::Row { row: 2, .. }));
        assert!(matches!(err.kind(), OfferError::InvalidAddress { field: "offeror", .. }));
    }

    #[test]
    fn test_build_offers_singleton() {
        let builder = OfferBuilder::new("com.nfpawn");
        let wallet = LocalWallet::from_hex(TEST_KEY).unwrap();
        let offers = builder
            .build_offers(&csv(&[sample_row("1")]), &FixedSeed(U256::one()), Some(&wallet))
            .unwrap();
        assert_eq!(offers.len(), 1);
        assert!(offers[0].merkle_proofs.is_empty());
        assert_eq!(offers[0].seal.merkle_root, offers[0].claim.0);
    }
}
