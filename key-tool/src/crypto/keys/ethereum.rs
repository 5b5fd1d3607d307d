//! Ethereum addresses

use crate::crypto::hash::keccak256;
use crate::error::{Error, Result};
use super::derivation::KeyTree;

/// EIP-55 checksummed address of a key
pub fn keccak_address<K: KeyTree>(key: &K) -> Result<String> {
    public_key_to_address(&key.public_key(false))
}

/// Get the Ethereum address from an uncompressed SEC1 public key
pub fn public_key_to_address(public_key: &[u8]) -> Result<String> {
    // The public key should be in uncompressed format (65 bytes)
    if public_key.len() != 65 {
        return Err(Error::KeyDerivation("Invalid Ethereum public key length".to_string()));
    }

    // Skip the first byte (0x04) and hash the rest
    let key_hash = keccak256(&public_key[1..])?;

    // Take the last 20 bytes of the hash
    to_checksum_address(&hex::encode(&key_hash[12..]))
}

/// Apply EIP-55 mixed-case checksumming to a hex address
///
/// Accepts 40 hex digits with or without a `0x` prefix, in any case.
pub fn to_checksum_address(address: &str) -> Result<String> {
    let digits = address.strip_prefix("0x").unwrap_or(address).to_ascii_lowercase();
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::Address(address.to_string()));
    }

    let hash = keccak256(digits.as_bytes())?;
    let checksummed: String = digits
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
            if c.is_ascii_alphabetic() && nibble > 7 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect();

    Ok(format!("0x{}", checksummed))
}

#[cfg(all(test, feature = "ethereum"))]
mod tests {
    use super::*;

    #[test]
    fn test_eip55_vectors() {
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            assert_eq!(to_checksum_address(&expected.to_lowercase()).unwrap(), expected);
            assert_eq!(to_checksum_address(&expected[2..]).unwrap(), expected);
        }
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert!(matches!(to_checksum_address("0x1234"), Err(Error::Address(_))));
        assert!(to_checksum_address(&"g".repeat(40)).is_err());
    }

    #[test]
    fn test_public_key_to_address() {
        // uncompressed generator point, private key 1
        let public_key = hex::decode(
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
             483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
        )
        .unwrap();
        assert_eq!(
            public_key_to_address(&public_key).unwrap(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
        assert!(public_key_to_address(&public_key[..33]).is_err());
    }
}
