//! Key Tool Core - HD wallet keys and addresses from a mnemonic
//!
//! This library derives hierarchical-deterministic keys for several
//! cryptocurrencies from a single BIP39 secret phrase, and formats them as
//! addresses, WIF strings and extended keys. It also carries the bit-level
//! buffer that the mnemonic codec is built on.

pub mod error;
pub mod crypto;
pub mod account;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use crypto::bitbuf::BitBuffer;
pub use crypto::keys::{ExtendedKey, KeyTree};
pub use account::{Currency, CurrencyRegistry, DerivationPath, Session};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
