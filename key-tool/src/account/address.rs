//! Address management

use serde::{Deserialize, Serialize};

use crate::account::currency::{AddressFormat, Currency};
use crate::account::path::DerivationPath;
use crate::crypto::hash::check_decode;
use crate::crypto::keys::{derive_address_key, ethereum, KeyTree};
use crate::error::Result;

/// A derived address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    /// The address string in the currency's native format
    pub address: String,
    /// Ticker of the currency this address belongs to
    pub ticker: String,
    /// The derivation path used to generate this address
    pub path: DerivationPath,
}

impl Address {
    pub fn new(address: String, ticker: impl Into<String>, path: DerivationPath) -> Self {
        Self { address, ticker: ticker.into(), path }
    }

    pub fn as_str(&self) -> &str {
        &self.address
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }
}

/// Derive the address at `path` below `root`, formatted for `currency`
pub fn derive_address<K: KeyTree>(root: &K, currency: &Currency, path: &DerivationPath) -> Result<Address> {
    let key = derive_address_key(root, path)?;
    let address = currency.address(&key)?;
    Ok(Address::new(address, currency.ticker(), *path))
}

/// Check that `address` is well formed for `currency`
///
/// P2PKH addresses must carry a valid checksum and the currency's current
/// network byte. Keccak addresses must be 20 hex bytes, and a mixed-case
/// address must match its EIP-55 casing.
pub fn validate_address(address: &str, currency: &Currency) -> Result<bool> {
    match currency.format() {
        AddressFormat::P2pkh => Ok(match check_decode(address) {
            Ok(payload) => payload.len() == 21 && payload[0] == currency.address_byte(),
            Err(_) => false,
        }),
        AddressFormat::KeccakEip55 => {
            let Some(digits) = address.strip_prefix("0x") else {
                return Ok(false);
            };
            if digits.len() != 40 || hex::decode(digits).is_err() {
                return Ok(false);
            }
            let lower = digits.to_ascii_lowercase();
            let upper = digits.to_ascii_uppercase();
            if digits == lower || digits == upper {
                return Ok(true);
            }
            Ok(ethereum::to_checksum_address(digits)? == address)
        }
    }
}
