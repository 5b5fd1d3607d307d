//! Cryptographic primitives and operations
//!
//! This module provides the bit buffer, mnemonic generation and validation,
//! hashing and Base58Check helpers, and key derivation.

pub mod bitbuf;
pub mod hash;
pub mod mnemonic;
pub mod keys;

pub use mnemonic::*;
pub use keys::*;
