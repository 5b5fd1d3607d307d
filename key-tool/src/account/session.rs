//! Interactive key session
//!
//! A session pairs one root key with a working currency and a current
//! derivation path. Every edit goes through the same parsers the shell
//! uses, so a rejected edit leaves the session untouched.

use zeroize::Zeroizing;

use crate::account::address::{derive_address, Address};
use crate::account::currency::{Currency, CurrencyRegistry};
use crate::account::path::{
    parse_account_id, parse_address_index, parse_coin_id, parse_network_byte, parse_path, Change,
    DerivationPath,
};
use crate::crypto::keys::{bitcoin, derive_account_key, derive_address_key, ExtendedKey, KeyTree, HARDENED};
use crate::crypto::mnemonic::seed_from_mnemonic;
use crate::error::{Error, Result};

/// A root key with its working currency and current path
pub struct Session<K: KeyTree = ExtendedKey> {
    root: K,
    currency: Currency,
    path: DerivationPath,
    registry: CurrencyRegistry,
}

impl Session<ExtendedKey> {
    /// Open a session on the BIP32 root of a mnemonic phrase
    ///
    /// The phrase is not checked against its checksum here; callers that
    /// care run [`crate::crypto::mnemonic::validate`] first.
    pub fn from_mnemonic(phrase: &str, passphrase: &str, currency: &Currency) -> Result<Self> {
        let seed = seed_from_mnemonic(phrase, passphrase)?;
        let root = ExtendedKey::from_seed(&seed)?;
        Ok(Self::new(root, currency))
    }
}

impl<K: KeyTree> Session<K> {
    /// Start at `m/44'/coin'/0'/0/0` for `currency`
    pub fn new(root: K, currency: &Currency) -> Self {
        let currency = currency.working_copy();
        Self {
            root,
            path: DerivationPath::for_coin(currency.coin_type()),
            currency,
            registry: CurrencyRegistry::default(),
        }
    }

    pub fn with_registry(mut self, registry: CurrencyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    /// Switch to a preset by ticker; the path moves to its coin type
    pub fn select_currency(&mut self, ticker: &str) -> Result<&Currency> {
        let preset = self.registry.lookup(ticker)?;
        self.currency = preset.working_copy();
        self.path.coin = self.currency.coin_type();
        tracing::debug!(ticker = self.currency.ticker(), path = %self.path, "selected currency");
        Ok(&self.currency)
    }

    /// Override the coin type of the path, keeping the currency's format
    pub fn set_coin(&mut self, text: &str) -> Result<()> {
        self.path.coin = parse_coin_id(text)?;
        self.path_changed();
        Ok(())
    }

    pub fn set_account(&mut self, text: &str) -> Result<()> {
        self.path.account = parse_account_id(text)?;
        self.path_changed();
        Ok(())
    }

    pub fn increment_account(&mut self) -> Result<()> {
        let next = self.path.account + 1;
        if next >= HARDENED {
            return Err(Error::Account(next.to_string()));
        }
        self.path.account = next;
        self.path_changed();
        Ok(())
    }

    pub fn decrement_account(&mut self) -> Result<()> {
        self.path.account = self
            .path
            .account
            .checked_sub(1)
            .ok_or_else(|| Error::Account("-1".to_string()))?;
        self.path_changed();
        Ok(())
    }

    pub fn set_external(&mut self) {
        self.path.change = Change::External;
        self.path_changed();
    }

    pub fn set_internal(&mut self) {
        self.path.change = Change::Internal;
        self.path_changed();
    }

    pub fn set_index(&mut self, text: &str) -> Result<()> {
        self.path.index = parse_address_index(text)?;
        self.path_changed();
        Ok(())
    }

    pub fn increment_index(&mut self) -> Result<()> {
        let next = self.path.index + 1;
        if next >= HARDENED {
            return Err(Error::Address(next.to_string()));
        }
        self.path.index = next;
        self.path_changed();
        Ok(())
    }

    pub fn decrement_index(&mut self) -> Result<()> {
        self.path.index = self
            .path
            .index
            .checked_sub(1)
            .ok_or_else(|| Error::Address("-1".to_string()))?;
        self.path_changed();
        Ok(())
    }

    /// Set account, change and index from `account/change/index`
    pub fn set_path(&mut self, text: &str) -> Result<()> {
        let (account, change, index) = parse_path(text)?;
        self.path.account = account;
        self.path.change = change;
        self.path.index = index;
        self.path_changed();
        Ok(())
    }

    pub fn set_network_byte(&mut self, text: &str) -> Result<()> {
        let byte = parse_network_byte(text)?;
        self.currency.set_address_byte(byte);
        tracing::debug!(byte, "set address byte");
        Ok(())
    }

    pub fn set_wif_byte(&mut self, text: &str) -> Result<()> {
        let byte = parse_network_byte(text)?;
        self.currency.set_wif_byte(byte);
        tracing::debug!(byte, "set wif byte");
        Ok(())
    }

    /// Address at the current path
    pub fn address(&self) -> Result<Address> {
        derive_address(&self.root, &self.currency, &self.path)
    }

    /// Compressed public key at the current path, hex encoded
    pub fn public_key_hex(&self) -> Result<String> {
        let key = derive_address_key(&self.root, &self.path)?;
        Ok(hex::encode(key.public_key(true)))
    }

    pub fn private_key_hex(&self) -> Result<Zeroizing<String>> {
        let key = derive_address_key(&self.root, &self.path)?;
        Ok(Zeroizing::new(hex::encode(key.private_key().as_slice())))
    }

    pub fn wif(&self) -> Result<Zeroizing<String>> {
        let key = derive_address_key(&self.root, &self.path)?;
        Ok(Zeroizing::new(bitcoin::wif(&key, self.currency.wif_byte())))
    }

    /// Extended public key of the current account
    pub fn xpub(&self) -> Result<String> {
        let key = derive_account_key(&self.root, &self.path)?;
        Ok(key.extended_key(false))
    }

    /// Extended private key of the current account
    pub fn xprv(&self) -> Result<Zeroizing<String>> {
        let key = derive_account_key(&self.root, &self.path)?;
        Ok(Zeroizing::new(key.extended_key(true)))
    }

    fn path_changed(&self) {
        tracing::debug!(path = %self.path, "path changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::currency::{BTC, XST};

    fn session() -> Session {
        let root = ExtendedKey::from_seed(&[5u8; 64]).unwrap();
        Session::new(root, &XST)
    }

    #[test]
    fn test_initial_path() {
        let session = session();
        assert_eq!(session.path().to_string(), "m/44'/125'/0'/0/0");
        assert_eq!(session.currency().ticker(), "XST");
    }

    #[test]
    fn test_select_currency_moves_coin() {
        let mut session = session();
        session.set_account("3").unwrap();
        session.select_currency("eth").unwrap();
        assert_eq!(session.path().to_string(), "m/44'/60'/3'/0/0");
        assert!(matches!(session.select_currency("nope"), Err(Error::Coin(_))));
        assert_eq!(session.currency().ticker(), "ETH");
    }

    #[test]
    fn test_account_and_index_steps() {
        let mut session = session();
        assert_eq!(session.decrement_account(), Err(Error::Account("-1".to_string())));
        assert_eq!(session.decrement_index(), Err(Error::Address("-1".to_string())));

        session.increment_account().unwrap();
        session.increment_index().unwrap();
        session.increment_index().unwrap();
        session.decrement_index().unwrap();
        session.set_internal();
        assert_eq!(session.path().to_string(), "m/44'/125'/1'/1/1");

        session.set_external();
        session.decrement_account().unwrap();
        assert_eq!(session.path().to_string(), "m/44'/125'/0'/0/1");
    }

    #[test]
    fn test_rejected_edit_keeps_path() {
        let mut session = session();
        session.set_path("2/1/7").unwrap();
        assert!(matches!(session.set_path("2/1"), Err(Error::Path(_))));
        assert!(matches!(session.set_index("-1"), Err(Error::Address(_))));
        assert!(matches!(session.set_coin("x"), Err(Error::Coin(_))));
        assert_eq!(session.path().to_string(), "m/44'/125'/2'/1/7");
    }

    #[test]
    fn test_network_bytes_only_touch_working_copy() {
        let mut session = session();
        let before = session.address().unwrap();
        session.set_network_byte("0").unwrap();
        let after = session.address().unwrap();
        assert_ne!(before.address, after.address);
        assert!(after.address.starts_with('1'));
        assert!(matches!(session.set_wif_byte("300"), Err(Error::Network(_))));
        assert_eq!(XST.address_byte(), 62);
    }

    #[test]
    fn test_keys_follow_path() {
        let mut session = session();
        let first = session.public_key_hex().unwrap();
        session.increment_index().unwrap();
        assert_ne!(session.public_key_hex().unwrap(), first);
        assert_eq!(session.private_key_hex().unwrap().len(), 64);
    }

    #[test]
    fn test_account_extended_keys() {
        let mut session = session();
        let xpub = session.xpub().unwrap();
        assert!(xpub.starts_with("xpub"));
        assert!(session.xprv().unwrap().starts_with("xprv"));

        // address-level edits do not move the account key
        session.set_index("9").unwrap();
        assert_eq!(session.xpub().unwrap(), xpub);
    }

    #[test]
    fn test_wif_uses_session_byte() {
        let mut session = Session::new(ExtendedKey::from_seed(&[5u8; 64]).unwrap(), &BTC);
        session.set_wif_byte("239").unwrap();
        let (network, _) = bitcoin::decode_wif(&session.wif().unwrap()).unwrap();
        assert_eq!(network, 239);
    }
}
