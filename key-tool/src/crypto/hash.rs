//! Hash functions and Base58Check encoding
//!
//! Thin wrappers over the `sha2`, `ripemd`, `sha3` and `bs58` crates. These
//! are the primitives every address and WIF string is built from.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// SHA-256 of `data`
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160 of SHA-256 (Bitcoin HASH160)
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(data));
    hasher.finalize().into()
}

/// Keccak-256 (the pre-standard SHA-3 padding used by Ethereum)
#[cfg(feature = "ethereum")]
pub fn keccak256(data: &[u8]) -> Result<[u8; 32]> {
    use sha3::Keccak256;
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Ok(hasher.finalize().into())
}

/// Keccak-256 is unavailable without the `ethereum` feature
#[cfg(not(feature = "ethereum"))]
pub fn keccak256(_data: &[u8]) -> Result<[u8; 32]> {
    Err(Error::Dependency(
        "Keccak-256 backend not compiled in (enable the `ethereum` feature)".to_string(),
    ))
}

/// Base58Check: base58 of `payload` followed by the first four bytes of its
/// double SHA-256
pub fn check_encode(payload: &[u8]) -> String {
    let checksum = sha256d(payload);
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum[..4]);
    bs58::encode(data).into_string()
}

/// Inverse of [`check_encode`], verifying the trailing checksum
pub fn check_decode(encoded: &str) -> Result<Vec<u8>> {
    let decoded = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| Error::Range(format!("Invalid base58 string: {}", e)))?;
    if decoded.len() < 4 {
        return Err(Error::Range("Base58Check data too short for checksum".to_string()));
    }

    let (payload, checksum) = decoded.split_at(decoded.len() - 4);
    if sha256d(payload)[..4] != *checksum {
        return Err(Error::Range("Base58Check checksum mismatch".to_string()));
    }
    Ok(payload.to_vec())
}
