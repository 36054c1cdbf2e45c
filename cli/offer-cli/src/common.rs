use anyhow::Context;
use sha3::{Digest, Keccak256};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A 256-bit hash function producing 32-byte digests.
///
/// Claims, tree nodes and authorization digests all go through this
/// capability so tests can substitute a deterministic fake.
pub trait Hash256 {
    fn hash(&self, data: &[u8]) -> [u8; 32];

    /// Hashes the concatenation of two 32-byte values.
    fn hash_pair(&self, left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(left);
        buf[32..].copy_from_slice(right);
        self.hash(&buf)
    }
}

/// Keccak-256 as used by Ethereum (not NIST SHA3-256).
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak;

impl Hash256 for Keccak {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        keccak256(data)
    }

    fn hash_pair(&self, left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        let hash = Keccak256::new()
            .chain_update(left)
            .chain_update(right)
            .finalize();
        hash.into()
    }
}

impl<H: Hash256 + ?Sized> Hash256 for &H {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        (**self).hash(data)
    }

    fn hash_pair(&self, left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        (**self).hash_pair(left, right)
    }
}

/// Computes the Keccak-256 hash of `data`.
///
/// # Arguments
/// * `data` - Bytes to hash
///
/// # Returns
/// The 32-byte digest
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Encodes bytes as a `0x`-prefixed lowercase hex string.
///
/// # Arguments
/// * `bytes` - Any byte slice, array or vector
///
/// # Returns
/// `0x` followed by two lowercase hex digits per byte (`0x` for empty input)
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Writes `contents` to a sibling temp file and renames it over `path`.
///
/// # Arguments
/// * `path` - Final output path; the temp file is `path` with a `.tmp` extension
/// * `contents` - Full file contents
///
/// # Errors
/// Returns an error if the temp file cannot be created, written or synced,
/// or if the rename fails. `path` is left untouched in every failure case.
pub fn write_file_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).context("Failed to create temp file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.flush().context("Failed to flush temp file")?;
    file.sync_all().context("Failed to sync temp file")?;
    std::fs::rename(&temp_path, path).context("Failed to move temp file to output")?;
    Ok(())
}
