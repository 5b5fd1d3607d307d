//! Bitcoin-style (P2PKH) addresses and Wallet Import Format
//!
//! Every P2PKH currency differs only in its network bytes, so these
//! functions take the byte explicitly.

use secp256k1::PublicKey as Secp256k1PublicKey;
use zeroize::Zeroizing;

use crate::crypto::hash::{check_decode, check_encode, hash160};
use crate::error::{Error, Result};
use super::derivation::KeyTree;

/// WIF suffix marking the key as belonging to a compressed public key
pub const WIF_COMPRESSED: u8 = 0x01;

/// P2PKH address of a key: Base58Check of `network_byte || HASH160(pubkey)`
pub fn p2pkh_address<K: KeyTree>(key: &K, network_byte: u8) -> String {
    encode_p2pkh(network_byte, &key.identifier())
}

/// Get the P2PKH address from a compressed SEC1 public key
pub fn public_key_to_address(public_key: &[u8], network_byte: u8) -> Result<String> {
    // The public key should be in compressed format (33 bytes)
    if public_key.len() != 33 {
        return Err(Error::KeyDerivation("Invalid compressed public key length".to_string()));
    }
    Secp256k1PublicKey::from_slice(public_key)
        .map_err(|e| Error::KeyDerivation(format!("Invalid public key: {}", e)))?;

    Ok(encode_p2pkh(network_byte, &hash160(public_key)))
}

fn encode_p2pkh(network_byte: u8, identifier: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(network_byte);
    payload.extend_from_slice(identifier);
    check_encode(&payload)
}

/// Wallet Import Format of a key's private half
pub fn wif<K: KeyTree>(key: &K, wif_byte: u8) -> String {
    let private_key = key.private_key();
    let mut raw = Zeroizing::new(Vec::with_capacity(34));
    raw.push(wif_byte);
    raw.extend_from_slice(private_key.as_slice());
    raw.push(WIF_COMPRESSED);
    check_encode(&raw)
}

/// Split a compressed-key WIF string into its network byte and private key
pub fn decode_wif(encoded: &str) -> Result<(u8, Zeroizing<[u8; 32]>)> {
    let raw = Zeroizing::new(check_decode(encoded)?);
    if raw.len() != 34 || raw[33] != WIF_COMPRESSED {
        return Err(Error::Range("Not a compressed-key WIF string".to_string()));
    }

    let mut private_key = Zeroizing::new([0u8; 32]);
    private_key.copy_from_slice(&raw[1..33]);
    Ok((raw[0], private_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::ExtendedKey;

    const GENERATOR: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    #[test]
    fn test_public_key_to_address() {
        let public_key = hex::decode(GENERATOR).unwrap();
        assert_eq!(
            public_key_to_address(&public_key, 0).unwrap(),
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
        );
        assert!(public_key_to_address(&public_key[1..], 0).is_err());
    }

    #[test]
    fn test_wif_round_trip() {
        let key = ExtendedKey::from_seed(&[7u8; 32]).unwrap();
        let encoded = wif(&key, 0x80);
        assert!(encoded.starts_with('K') || encoded.starts_with('L'));

        let (network, private_key) = decode_wif(&encoded).unwrap();
        assert_eq!(network, 0x80);
        assert_eq!(private_key.as_slice(), key.private_key().as_slice());
    }

    #[test]
    fn test_p2pkh_matches_raw_public_key() {
        let key = ExtendedKey::from_seed(&[1u8; 64]).unwrap();
        assert_eq!(
            p2pkh_address(&key, 62),
            public_key_to_address(&key.public_key(true), 62).unwrap()
        );
    }
}
