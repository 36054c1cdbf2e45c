use primitive_types::U256;

use crate::error::{OfferError, Result};
use crate::normalize::{parse_integer, Address, ChecksumAddress};

/// Number of CSV columns that make up one offer row.
pub const ROW_FIELDS: usize = 9;

/// Sale-with-buyback terms for one NFT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub offeror: Address,
    pub nft_contract: Address,
    pub nft_id: U256,
    pub sale_expiration: U256,
    pub sale_contract: Address,
    pub sale_amount: U256,
    pub term_until_collateral_at_risk: U256,
    pub buyback_contract: Address,
    pub buyback_amount: U256,
}

/// Builds an [`Asset`] from the ordered cells of one CSV row.
///
/// Column order: offeror, nftContract, nftId, saleExpiration, saleContract,
/// saleAmount, termUntilCollateralAtRisk, buybackContract, buybackAmount.
/// Cells past the ninth are ignored.
pub fn encode_row<C, S>(addresses: &C, fields: &[S]) -> Result<Asset>
where
    C: ChecksumAddress + ?Sized,
    S: AsRef<str>,
{
    if fields.len() < ROW_FIELDS {
        return Err(OfferError::MalformedRow {
            found: fields.len(),
        });
    }
    let cell = |i: usize| fields[i].as_ref();

    Ok(Asset {
        offeror: addresses.checksum("offeror", cell(0))?,
        nft_contract: addresses.checksum("nftContract", cell(1))?,
        nft_id: parse_integer("nftId", cell(2))?,
        sale_expiration: parse_integer("saleExpiration", cell(3))?,
        sale_contract: addresses.checksum("saleContract", cell(4))?,
        sale_amount: parse_integer("saleAmount", cell(5))?,
        term_until_collateral_at_risk: parse_integer("termUntilCollateralAtRisk", cell(6))?,
        buyback_contract: addresses.checksum("buybackContract", cell(7))?,
        buyback_amount: parse_integer("buybackAmount", cell(8))?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::normalize::Eip55;

    pub(crate) fn sample_row(nft_id: &str) -> Vec<String> {
        vec![
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".into(),
            "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359".into(),
            nft_id.into(),
            "1700000000".into(),
            "0xdbf03b407c01e7cd3cbea99509d93f8dddc8c6fb".into(),
            "1000000000000000000".into(),
            "86400".into(),
            "0xd1220a0cf47c7b9be7a2e6ba89f429762e7b9adb".into(),
            "1100000000000000000".into(),
        ]
    }

    #[test]
    fn test_encode_row() {
        let asset = encode_row(&Eip55, &sample_row("7")).unwrap();
        assert_eq!(
            asset.offeror.to_checksum(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
        assert_eq!(asset.nft_id, U256::from(7u64));
        assert_eq!(asset.sale_expiration, U256::from(1_700_000_000u64));
        assert_eq!(asset.term_until_collateral_at_risk, U256::from(86_400u64));
        assert_eq!(
            asset.buyback_amount,
            U256::from(1_100_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_encode_row_too_short() {
        let mut row = sample_row("1");
        row.pop();
        let err = encode_row(&Eip55, &row).unwrap_err();
        assert!(matches!(err, OfferError::MalformedRow { found: 8 }));
    }

    #[test]
    fn test_encode_row_ignores_extra_fields() {
        let mut row = sample_row("1");
        row.push("trailing note".into());
        let extended = encode_row(&Eip55, &row).unwrap();
        assert_eq!(extended, encode_row(&Eip55, &sample_row("1")).unwrap());
    }

    #[test]
    fn test_encode_row_reports_field() {
        let mut row = sample_row("1");
        row[3] = "soon".into();
        let err = encode_row(&Eip55, &row).unwrap_err();
        assert!(matches!(
            err,
            OfferError::InvalidInteger {
                field: "saleExpiration",
                ..
            }
        ));

        let mut row = sample_row("1");
        row[7] = "0x1234".into();
        assert!(matches!(
            encode_row(&Eip55, &row),
            Err(OfferError::InvalidAddress {
                field: "buybackContract",
                ..
            })
        ));
    }
}
