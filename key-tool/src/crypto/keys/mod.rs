//! Key derivation and management
//!
//! This module provides the key-tree capability, its BIP32 implementation,
//! and the per-chain encodings (P2PKH/WIF and Ethereum addresses).

pub mod bip32;
pub mod bitcoin;
pub mod ethereum;
mod derivation;

pub use bip32::ExtendedKey;
pub use derivation::*;
