use anyhow::Context;
use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};
use std::fmt;
use zeroize::Zeroize;

use crate::authorize::{personal_message_hash, Signature, WalletProvider};
use crate::error::{OfferError, Result};
use crate::normalize::Address;

/// Wallet backed by an in-memory secp256k1 key.
pub struct LocalWallet {
    signing_key: SigningKey,
    address: Address,
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Derives the Ethereum address of a signing key.
///
/// # Arguments
/// * `signing_key` - secp256k1 private key
///
/// # Returns
/// The last 20 bytes of the Keccak-256 hash of the uncompressed public key
/// (without its `0x04` tag byte)
pub fn key_to_address(signing_key: &SigningKey) -> Address {
    let public_key = signing_key.verifying_key();
    let encoded = public_key.to_encoded_point(false);
    let pub_bytes = encoded.as_bytes();
    let hash = Keccak256::digest(&pub_bytes[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    Address(address)
}

impl LocalWallet {
    pub fn new(signing_key: SigningKey) -> Self {
        let address = key_to_address(&signing_key);
        Self {
            signing_key,
            address,
        }
    }

    /// Parses a hex private key, with or without `0x` prefix.
    ///
    /// The intermediate key bytes are zeroized before returning.
    pub fn from_hex(key: &str) -> anyhow::Result<Self> {
        let trimmed = key.trim();
        let key_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if key_str.is_empty() {
            anyhow::bail!("Private key is empty");
        }
        let mut key_bytes = hex::decode(key_str).context("Invalid private key format")?;
        if key_bytes.len() != 32 {
            let len = key_bytes.len();
            key_bytes.zeroize();
            anyhow::bail!("Invalid private key length: expected 32 bytes, got {}", len);
        }
        let signing_key = SigningKey::from_slice(&key_bytes);
        key_bytes.zeroize();
        Ok(Self::new(signing_key.context("Invalid private key")?))
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl WalletProvider for LocalWallet {
    fn accounts(&self) -> Result<Vec<Address>> {
        Ok(vec![self.address])
    }

    fn sign_message(&self, digest: &[u8; 32], account: &Address) -> Result<Signature> {
        if *account != self.address {
            return Err(OfferError::WalletRejected(format!(
                "account {account} is not managed by this wallet"
            )));
        }
        let prehash = personal_message_hash(digest);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&prehash)
            .map_err(|e| OfferError::WalletRejected(e.to_string()))?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(Signature(out))
    }
}
