//! Supported currencies and their address formats
//!
//! Presets are immutable. A session works on a [`Currency::working_copy`],
//! so overriding network bytes never leaks into the registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::keys::{bitcoin, ethereum, KeyTree};
use crate::error::{Error, Result};

/// How a public key is turned into an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFormat {
    /// Base58Check of `network_byte || HASH160(compressed pubkey)`
    P2pkh,
    /// Last 20 bytes of Keccak-256 of the uncompressed pubkey, EIP-55 cased
    KeccakEip55,
}

/// A coin's identity and network bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    name: &'static str,
    ticker: &'static str,
    coin_type: u32,
    address_byte: u8,
    wif_byte: u8,
    format: AddressFormat,
}

impl Currency {
    pub const fn new(
        name: &'static str,
        ticker: &'static str,
        coin_type: u32,
        address_byte: u8,
        wif_byte: u8,
        format: AddressFormat,
    ) -> Self {
        Self { name, ticker, coin_type, address_byte, wif_byte, format }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ticker(&self) -> &'static str {
        self.ticker
    }

    /// SLIP-44 coin type
    pub fn coin_type(&self) -> u32 {
        self.coin_type
    }

    pub fn address_byte(&self) -> u8 {
        self.address_byte
    }

    pub fn wif_byte(&self) -> u8 {
        self.wif_byte
    }

    pub fn format(&self) -> AddressFormat {
        self.format
    }

    /// A mutable copy of this currency for one session
    pub fn working_copy(&self) -> Self {
        *self
    }

    pub fn set_address_byte(&mut self, byte: u8) {
        self.address_byte = byte;
    }

    pub fn set_wif_byte(&mut self, byte: u8) {
        self.wif_byte = byte;
    }

    /// Address of `key` in this currency's format
    pub fn address<K: KeyTree>(&self, key: &K) -> Result<String> {
        encode_address(key, self.format, self.address_byte)
    }

    /// Wallet Import Format of `key`'s private half
    pub fn wif<K: KeyTree>(&self, key: &K) -> String {
        bitcoin::wif(key, self.wif_byte)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ticker)
    }
}

/// Format `key` as an address; Keccak addresses ignore `network_byte`
pub fn encode_address<K: KeyTree>(key: &K, format: AddressFormat, network_byte: u8) -> Result<String> {
    match format {
        AddressFormat::P2pkh => Ok(bitcoin::p2pkh_address(key, network_byte)),
        AddressFormat::KeccakEip55 => ethereum::keccak_address(key),
    }
}

pub const XST: Currency = Currency::new("Stealth", "XST", 125, 62, 190, AddressFormat::P2pkh);
pub const BTC: Currency = Currency::new("Bitcoin", "BTC", 0, 0, 128, AddressFormat::P2pkh);
pub const LTC: Currency = Currency::new("Litecoin", "LTC", 2, 48, 176, AddressFormat::P2pkh);
pub const DOGE: Currency = Currency::new("Dogecoin", "DOGE", 3, 30, 158, AddressFormat::P2pkh);
pub const FTC: Currency = Currency::new("Feathercoin", "FTC", 8, 14, 142, AddressFormat::P2pkh);
pub const VTC: Currency = Currency::new("Vertcoin", "VTC", 28, 71, 128, AddressFormat::P2pkh);
pub const ETH: Currency = Currency::new("Ethereum", "ETH", 60, 0, 128, AddressFormat::KeccakEip55);

/// Every built-in currency, default first
pub static PRESETS: [Currency; 7] = [XST, BTC, LTC, DOGE, FTC, VTC, ETH];

/// Lookup over a fixed set of currencies
#[derive(Debug, Clone, Copy)]
pub struct CurrencyRegistry {
    currencies: &'static [Currency],
}

impl CurrencyRegistry {
    pub fn new(currencies: &'static [Currency]) -> Self {
        Self { currencies }
    }

    /// Find a currency by ticker, ignoring case
    pub fn lookup(&self, ticker: &str) -> Result<&'static Currency> {
        let ticker = ticker.trim();
        self.iter()
            .find(|c| c.ticker.eq_ignore_ascii_case(ticker))
            .ok_or_else(|| Error::Coin(ticker.to_string()))
    }

    pub fn by_coin_type(&self, coin_type: u32) -> Option<&'static Currency> {
        self.iter().find(|c| c.coin_type == coin_type)
    }

    pub fn iter(&self) -> std::slice::Iter<'static, Currency> {
        let currencies: &'static [Currency] = self.currencies;
        currencies.iter()
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::new(&PRESETS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::ExtendedKey;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = CurrencyRegistry::default();
        assert_eq!(registry.lookup("xst").unwrap().coin_type(), 125);
        assert_eq!(registry.lookup("Doge").unwrap().address_byte(), 30);
        assert_eq!(registry.lookup(" ETH ").unwrap().format(), AddressFormat::KeccakEip55);
        assert_eq!(registry.lookup("XYZ"), Err(Error::Coin("XYZ".to_string())));
    }

    #[test]
    fn test_by_coin_type() {
        let registry = CurrencyRegistry::default();
        assert_eq!(registry.by_coin_type(2).unwrap().ticker(), "LTC");
        assert!(registry.by_coin_type(9999).is_none());
        assert_eq!(registry.iter().count(), 7);
    }

    #[test]
    fn test_working_copy_leaves_preset_alone() {
        let mut copy = BTC.working_copy();
        copy.set_address_byte(111);
        copy.set_wif_byte(239);
        assert_eq!(copy.address_byte(), 111);
        assert_eq!(copy.wif_byte(), 239);
        assert_eq!(BTC.address_byte(), 0);
        assert_eq!(PRESETS[1].wif_byte(), 128);
    }

    #[test]
    fn test_address_byte_changes_prefix() {
        let key = ExtendedKey::from_seed(&[3u8; 64]).unwrap();
        assert!(BTC.address(&key).unwrap().starts_with('1'));
        assert!(LTC.address(&key).unwrap().starts_with('L'));
        assert!(DOGE.address(&key).unwrap().starts_with('D'));
        assert!(XST.address(&key).unwrap().starts_with(['R', 'S']));
    }

    #[cfg(feature = "ethereum")]
    #[test]
    fn test_keccak_ignores_network_byte() {
        let key = ExtendedKey::from_seed(&[3u8; 64]).unwrap();
        let mut eth = ETH.working_copy();
        let before = eth.address(&key).unwrap();
        eth.set_address_byte(42);
        assert_eq!(eth.address(&key).unwrap(), before);
        assert!(before.starts_with("0x"));
        assert_eq!(before.len(), 42);
    }

    #[test]
    fn test_wif_uses_wif_byte() {
        let key = ExtendedKey::from_seed(&[3u8; 64]).unwrap();
        let (network, _) = bitcoin::decode_wif(&XST.wif(&key)).unwrap();
        assert_eq!(network, 190);
    }
}
