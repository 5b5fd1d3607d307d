//! Common key derivation functionality
//!
//! The elliptic-curve math lives behind [`KeyTree`]. This module only fixes
//! the order and hardening of the BIP44 steps.

use zeroize::Zeroizing;

use crate::account::path::DerivationPath;
use crate::error::Result;

/// Offset that marks a child index as hardened
pub const HARDENED: u32 = 0x8000_0000;

/// BIP44 purpose
pub const PURPOSE: u32 = 44;

/// A node of a hierarchical-deterministic key tree
///
/// Callers always pass plain indices (below [`HARDENED`]).
/// `hardened_child` applies the offset itself.
pub trait KeyTree: Sized {
    /// Derive the hardened child `index'`
    fn hardened_child(&self, index: u32) -> Result<Self>;

    /// Derive the non-hardened child `index`
    fn child(&self, index: u32) -> Result<Self>;

    /// SEC1 public key, 33 bytes compressed or 65 bytes uncompressed
    fn public_key(&self, compressed: bool) -> Vec<u8>;

    /// Raw 32-byte private key
    fn private_key(&self) -> Zeroizing<[u8; 32]>;

    /// HASH160 of the compressed public key
    fn identifier(&self) -> [u8; 20];

    /// Base58Check serialized extended key (`xprv...` or `xpub...`)
    fn extended_key(&self, private: bool) -> String;
}

/// Walk `purpose'/coin'/account'` and then, when given, `change/index`
///
/// Stopping early yields the deepest key reached, so the same walk serves
/// account-level extended keys and full address keys. `index` is only used
/// when `change` is present.
pub fn derive_child_key<K: KeyTree>(
    root: &K,
    purpose: u32,
    coin: u32,
    account: u32,
    change: Option<u32>,
    index: Option<u32>,
) -> Result<K> {
    let account_key = root
        .hardened_child(purpose)?
        .hardened_child(coin)?
        .hardened_child(account)?;

    let Some(change) = change else {
        return Ok(account_key);
    };
    let change_key = account_key.child(change)?;

    match index {
        Some(index) => change_key.child(index),
        None => Ok(change_key),
    }
}

/// Account-level key `m/purpose'/coin'/account'`
pub fn derive_account_key<K: KeyTree>(root: &K, path: &DerivationPath) -> Result<K> {
    tracing::trace!(purpose = path.purpose, coin = path.coin, account = path.account, "deriving account key");
    derive_child_key(root, path.purpose, path.coin, path.account, None, None)
}

/// Address-level key for the full path
pub fn derive_address_key<K: KeyTree>(root: &K, path: &DerivationPath) -> Result<K> {
    tracing::trace!(%path, "deriving address key");
    derive_child_key(
        root,
        path.purpose,
        path.coin,
        path.account,
        Some(path.change.index()),
        Some(path.index),
    )
}
