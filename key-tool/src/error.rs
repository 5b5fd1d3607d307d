//! Error types for the key-tool library

use thiserror::Error;

/// Custom error type for key-tool operations
///
/// The validation kinds (`Coin`, `Account`, `Change`, `Address`, `Path`,
/// `Network`) carry the raw text the caller supplied so a shell can echo it
/// back. Callers branch on which field was invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Coin id \"{0}\" not valid")]
    Coin(String),

    #[error("Account id \"{0}\" not valid")]
    Account(String),

    #[error("\"{0}\" is not a valid change identifier")]
    Change(String),

    #[error("Address index \"{0}\" not valid")]
    Address(String),

    #[error("Path \"{0}\" is not valid")]
    Path(String),

    #[error("Network byte \"{0}\" not valid")]
    Network(String),

    /// An external capability (hash backend, KDF) is unavailable or failed.
    #[error("Missing dependency: {0}")]
    Dependency(String),

    #[error("Value outside domain: {0}")]
    Domain(String),

    #[error("Out of range: {0}")]
    Range(String),

    #[error("Word \"{0}\" is not in the word list")]
    UnknownWord(String),

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),
}

/// Result type for key-tool operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error came from malformed user input rather than a
    /// failed capability.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Coin(_)
                | Error::Account(_)
                | Error::Change(_)
                | Error::Address(_)
                | Error::Path(_)
                | Error::Network(_)
        )
    }
}
