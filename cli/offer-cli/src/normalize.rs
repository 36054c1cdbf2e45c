//! Canonicalization of raw spreadsheet cells into addresses and integers.

use primitive_types::U256;
use std::fmt;

use crate::common::keccak256;
use crate::error::{OfferError, Result};

/// A 20-byte Ethereum address. Renders in EIP-55 checksummed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the EIP-55 mixed-case checksum encoding, `0x` prefixed.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

/// Turns a raw address string into a validated 20-byte address.
pub trait ChecksumAddress {
    fn checksum(&self, field: &'static str, raw: &str) -> Result<Address>;
}

fn decode_address<'a>(field: &'static str, raw: &'a str) -> Result<(Address, &'a str)> {
    let invalid = || OfferError::InvalidAddress {
        field,
        value: raw.to_string(),
    };
    let trimmed = raw.trim();
    let cleaned = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if cleaned.len() != 40 || !cleaned.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut bytes).map_err(|_| invalid())?;
    Ok((Address(bytes), cleaned))
}

/// EIP-55 address normalizer.
///
/// Any casing of 40 hex digits is accepted and re-cased to the checksum
/// form; only length and hex syntax are checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eip55;

impl ChecksumAddress for Eip55 {
    fn checksum(&self, field: &'static str, raw: &str) -> Result<Address> {
        decode_address(field, raw).map(|(address, _)| address)
    }
}

/// EIP-55 normalizer that also rejects mixed-case input whose casing does
/// not match the checksum. All-lowercase and all-uppercase input is still
/// accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictEip55;

impl ChecksumAddress for StrictEip55 {
    fn checksum(&self, field: &'static str, raw: &str) -> Result<Address> {
        let (address, cleaned) = decode_address(field, raw)?;
        let has_lower = cleaned.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = cleaned.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *cleaned {
            return Err(OfferError::InvalidAddress {
                field,
                value: raw.to_string(),
            });
        }
        Ok(address)
    }
}

/// Parses a non-negative integer cell.
///
/// # Arguments
/// * `field` - Column name reported in errors
/// * `raw` - Cell text: decimal digits or `0x`-prefixed hex digits
///
/// # Returns
/// The value as a 256-bit unsigned integer
///
/// # Errors
/// `InvalidInteger` for anything else, including partial numeric prefixes
/// such as `12abc`; `FieldTooLarge` for values of 2^256 or more
pub fn parse_integer(field: &'static str, raw: &str) -> Result<U256> {
    let invalid = || OfferError::InvalidInteger {
        field,
        value: raw.to_string(),
    };
    let value = raw.trim();
    let (digits, radix) = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (value, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(significant, radix).map_err(|_| OfferError::FieldTooLarge { field })
}
