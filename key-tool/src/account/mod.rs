//! Account management functionality
//!
//! This module turns a root key into addresses: derivation paths and their
//! parsers, the supported currencies, and the session that walks between
//! them.

pub mod address;
pub mod currency;
pub mod path;
pub mod session;

pub use address::{derive_address, validate_address, Address};
pub use currency::{encode_address, AddressFormat, Currency, CurrencyRegistry, PRESETS};
pub use path::{format_path, Change, DerivationPath};
pub use session::Session;
