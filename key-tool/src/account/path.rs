//! BIP44 derivation paths and identifier parsing
//!
//! Every parser reports the raw text it rejected, wrapped in the error kind
//! of the field it was meant for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::keys::{HARDENED, PURPOSE};
use crate::error::{Error, Result};

/// Which chain of an account an address belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Change {
    /// Receiving addresses (0)
    #[default]
    External,
    /// Change addresses (1)
    Internal,
}

impl Change {
    pub fn index(self) -> u32 {
        match self {
            Change::External => 0,
            Change::Internal => 1,
        }
    }

    pub fn from_index(index: u32) -> Result<Self> {
        match index {
            0 => Ok(Change::External),
            1 => Ok(Change::Internal),
            other => Err(Error::Change(other.to_string())),
        }
    }
}

/// A full `m/purpose'/coin'/account'/change/index` path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationPath {
    pub purpose: u32,
    pub coin: u32,
    pub account: u32,
    pub change: Change,
    pub index: u32,
}

impl DerivationPath {
    /// BIP44 path (purpose 44) for the given coin type
    pub fn new(coin: u32, account: u32, change: Change, index: u32) -> Self {
        Self { purpose: PURPOSE, coin, account, change, index }
    }

    /// First receiving address of account 0
    pub fn for_coin(coin: u32) -> Self {
        Self::new(coin, 0, Change::External, 0)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_path(
            self.purpose,
            self.coin,
            self.account,
            self.change.index(),
            self.index,
        ))
    }
}

/// Canonical text form `m/purpose'/coin'/account'/change/index`
pub fn format_path(purpose: u32, coin: u32, account: u32, change: u32, index: u32) -> String {
    format!("m/{}'/{}'/{}'/{}/{}", purpose, coin, account, change, index)
}

/// Parse an index for a hardened level, allowing a trailing `'`
fn parse_hardened_id(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let digits = trimmed.strip_suffix('\'').unwrap_or(trimmed);
    parse_plain_id(digits)
}

fn parse_plain_id(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|id| *id < HARDENED)
}

pub fn parse_coin_id(text: &str) -> Result<u32> {
    parse_hardened_id(text).ok_or_else(|| Error::Coin(text.to_string()))
}

pub fn parse_account_id(text: &str) -> Result<u32> {
    parse_hardened_id(text).ok_or_else(|| Error::Account(text.to_string()))
}

pub fn parse_address_index(text: &str) -> Result<u32> {
    parse_plain_id(text).ok_or_else(|| Error::Address(text.to_string()))
}

/// Change flag: exactly `0` (external) or `1` (internal)
pub fn parse_change(text: &str) -> Result<Change> {
    text.trim()
        .parse::<u32>()
        .ok()
        .and_then(|index| Change::from_index(index).ok())
        .ok_or_else(|| Error::Change(text.to_string()))
}

/// Parse the `account/change/index` tail of a path
pub fn parse_path(text: &str) -> Result<(u32, Change, u32)> {
    let fields: Vec<&str> = text.split('/').map(str::trim).collect();
    let [account, change, index] = fields.as_slice() else {
        return Err(Error::Path(text.to_string()));
    };

    Ok((
        parse_account_id(account)?,
        parse_change(change)?,
        parse_address_index(index)?,
    ))
}

pub fn parse_network_byte(text: &str) -> Result<u8> {
    text.trim()
        .parse::<u8>()
        .map_err(|_| Error::Network(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(44, 125, 0, 0, 0), "m/44'/125'/0'/0/0");
        let path = DerivationPath::new(60, 3, Change::Internal, 17);
        assert_eq!(path.to_string(), "m/44'/60'/3'/1/17");
        assert_eq!(DerivationPath::for_coin(0).to_string(), "m/44'/0'/0'/0/0");
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_account_id("5'").unwrap(), 5);
        assert_eq!(parse_account_id(" 7 ").unwrap(), 7);
        assert_eq!(parse_coin_id("125'").unwrap(), 125);
        assert_eq!(parse_coin_id("abc"), Err(Error::Coin("abc".to_string())));
        assert_eq!(parse_account_id("-2"), Err(Error::Account("-2".to_string())));
        assert!(parse_account_id("5''").is_err());
        assert!(parse_account_id("").is_err());
        assert!(parse_coin_id("2147483648").is_err());
        assert_eq!(parse_coin_id("2147483647").unwrap(), HARDENED - 1);
    }

    #[test]
    fn test_parse_address_index() {
        assert_eq!(parse_address_index("12").unwrap(), 12);
        assert_eq!(parse_address_index("-1"), Err(Error::Address("-1".to_string())));
        assert!(parse_address_index("3'").is_err());
        assert!(parse_address_index("x").is_err());
    }

    #[test]
    fn test_parse_change() {
        assert_eq!(parse_change("0").unwrap(), Change::External);
        assert_eq!(parse_change("1").unwrap(), Change::Internal);
        assert_eq!(parse_change("2"), Err(Error::Change("2".to_string())));
        assert_eq!(Change::from_index(1).unwrap().index(), 1);
    }

    #[test]
    fn test_parse_path() {
        assert_eq!(parse_path("0/0/0").unwrap(), (0, Change::External, 0));
        assert_eq!(parse_path("3'/1/9").unwrap(), (3, Change::Internal, 9));
        assert_eq!(parse_path(" 2 / 0 / 4 ").unwrap(), (2, Change::External, 4));
    }

    #[test]
    fn test_parse_path_errors() {
        assert_eq!(parse_path("0/0"), Err(Error::Path("0/0".to_string())));
        assert!(matches!(parse_path("0/0/0/0"), Err(Error::Path(_))));
        assert!(matches!(parse_path(""), Err(Error::Path(_))));
        assert_eq!(parse_path("x/0/0"), Err(Error::Account("x".to_string())));
        assert_eq!(parse_path("0/2/0"), Err(Error::Change("2".to_string())));
        assert_eq!(parse_path("0/1/-1"), Err(Error::Address("-1".to_string())));
    }

    #[test]
    fn test_parse_network_byte() {
        assert_eq!(parse_network_byte("0").unwrap(), 0);
        assert_eq!(parse_network_byte("255").unwrap(), 255);
        assert_eq!(parse_network_byte("256"), Err(Error::Network("256".to_string())));
        assert!(parse_network_byte("-1").is_err());
    }
}
