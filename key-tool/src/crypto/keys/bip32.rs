//! BIP32 key tree over secp256k1

use std::fmt;

use hmac::{Hmac, Mac};
use secp256k1::{PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::crypto::hash::{check_encode, hash160};
use crate::error::{Error, Result};
use super::derivation::{KeyTree, HARDENED};

/// Version bytes of a mainnet extended private key (`xprv`)
pub const XPRV_VERSION: [u8; 4] = [0x04, 0x88, 0xad, 0xe4];

/// Version bytes of a mainnet extended public key (`xpub`)
pub const XPUB_VERSION: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];

/// An extended private key: a secp256k1 secret plus its chain code and
/// position in the tree
#[derive(Clone)]
pub struct ExtendedKey {
    secret_key: SecretKey,
    chain_code: Zeroizing<[u8; 32]>,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
}

impl ExtendedKey {
    /// Derive the master key from a seed
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let mut hmac = Hmac::<Sha512>::new_from_slice(b"Bitcoin seed")
            .map_err(|_| Error::KeyDerivation("HMAC error".to_string()))?;

        hmac.update(seed);
        let mut result = Zeroizing::new([0u8; 64]);
        result.copy_from_slice(&hmac.finalize().into_bytes());

        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&result[32..64]);

        let secret_key = SecretKey::from_slice(&result[0..32])
            .map_err(|e| Error::KeyDerivation(format!("Invalid master key: {}", e)))?;

        Ok(Self {
            secret_key,
            chain_code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
        })
    }

    /// Depth in the tree, 0 for the master key
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Child number this key was derived with, hardening offset included
    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    fn secp_public(&self) -> Secp256k1PublicKey {
        let secp = Secp256k1::new();
        Secp256k1PublicKey::from_secret_key(&secp, &self.secret_key)
    }

    /// Derive a child key; indices at or above [`HARDENED`] are hardened
    fn derive(&self, index: u32) -> Result<Self> {
        let depth = self
            .depth
            .checked_add(1)
            .ok_or_else(|| Error::KeyDerivation("Maximum tree depth reached".to_string()))?;

        let mut data = Zeroizing::new(Vec::with_capacity(37));

        if index >= HARDENED {
            // Hardened derivation
            data.push(0);
            data.extend_from_slice(&self.secret_key.secret_bytes());
        } else {
            // Normal derivation
            data.extend_from_slice(&self.secp_public().serialize());
        }

        // Append the index
        data.extend_from_slice(&index.to_be_bytes());

        // Calculate HMAC-SHA512
        let mut hmac = Hmac::<Sha512>::new_from_slice(self.chain_code.as_slice())
            .map_err(|_| Error::KeyDerivation("HMAC error".to_string()))?;

        hmac.update(&data);
        let mut result = Zeroizing::new([0u8; 64]);
        result.copy_from_slice(&hmac.finalize().into_bytes());

        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&result[32..64]);

        // Add the parent key to the child key (mod n)
        let tweak = SecretKey::from_slice(&result[0..32])
            .map_err(|e| Error::KeyDerivation(format!("Invalid child key: {}", e)))?;

        let child = tweak
            .add_tweak(&self.secret_key.into())
            .map_err(|e| Error::KeyDerivation(format!("Key addition error: {}", e)))?;

        Ok(Self {
            secret_key: child,
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
        })
    }

    fn serialize(&self, version: [u8; 4], key_data: &[u8]) -> String {
        let mut raw = Zeroizing::new(Vec::with_capacity(78));
        raw.extend_from_slice(&version);
        raw.push(self.depth);
        raw.extend_from_slice(&self.parent_fingerprint);
        raw.extend_from_slice(&self.child_number.to_be_bytes());
        raw.extend_from_slice(self.chain_code.as_slice());
        raw.extend_from_slice(key_data);
        check_encode(&raw)
    }
}

impl KeyTree for ExtendedKey {
    fn hardened_child(&self, index: u32) -> Result<Self> {
        if index >= HARDENED {
            return Err(Error::KeyDerivation(format!("Index {} is already hardened", index)));
        }
        self.derive(index + HARDENED)
    }

    fn child(&self, index: u32) -> Result<Self> {
        if index >= HARDENED {
            return Err(Error::KeyDerivation(format!(
                "Index {} is in the hardened range",
                index
            )));
        }
        self.derive(index)
    }

    fn public_key(&self, compressed: bool) -> Vec<u8> {
        let public_key = self.secp_public();
        if compressed {
            public_key.serialize().to_vec()
        } else {
            public_key.serialize_uncompressed().to_vec()
        }
    }

    fn private_key(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret_key.secret_bytes())
    }

    fn identifier(&self) -> [u8; 20] {
        hash160(&self.public_key(true))
    }

    fn extended_key(&self, private: bool) -> String {
        if private {
            let mut key_data = Zeroizing::new([0u8; 33]);
            key_data[1..].copy_from_slice(self.private_key().as_slice());
            self.serialize(XPRV_VERSION, key_data.as_slice())
        } else {
            self.serialize(XPUB_VERSION, &self.public_key(true))
        }
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.depth)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("child_number", &self.child_number)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP32 test vector 1
    const SEED_1: &str = "000102030405060708090a0b0c0d0e0f";

    fn master() -> ExtendedKey {
        ExtendedKey::from_seed(&hex::decode(SEED_1).unwrap()).unwrap()
    }

    #[test]
    fn test_master_key() {
        let key = master();
        assert_eq!(
            key.extended_key(true),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
        assert_eq!(
            key.extended_key(false),
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );
        assert_eq!(key.depth(), 0);
    }

    #[test]
    fn test_hardened_child() {
        let child = master().hardened_child(0).unwrap();
        assert_eq!(
            child.extended_key(true),
            "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7"
        );
        assert_eq!(child.depth(), 1);
        assert_eq!(child.child_number(), HARDENED);
        assert_eq!(hex::encode(child.parent_fingerprint), "3442193e");
    }

    #[test]
    fn test_normal_child() {
        // m/0'/1
        let child = master().hardened_child(0).unwrap().child(1).unwrap();
        assert_eq!(
            child.extended_key(false),
            "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ"
        );
    }

    #[test]
    fn test_index_ranges() {
        let key = master();
        assert!(matches!(key.hardened_child(HARDENED), Err(Error::KeyDerivation(_))));
        assert!(matches!(key.child(HARDENED), Err(Error::KeyDerivation(_))));
    }

    #[test]
    fn test_key_shapes() {
        let key = master();
        assert_eq!(key.public_key(true).len(), 33);
        let uncompressed = key.public_key(false);
        assert_eq!(uncompressed.len(), 65);
        assert_eq!(uncompressed[0], 0x04);
        assert_eq!(key.private_key().len(), 32);
        assert_eq!(key.identifier(), hash160(&key.public_key(true)));
    }
}
