//! Mnemonic phrase generation and handling
//!
//! BIP39 reads entropy and checksum as one big-endian bit string. The
//! [`BitBuffer`] is little-endian, so the codec reverses the entropy bytes,
//! puts the checksum byte underneath them and reads 11-bit groups from the
//! high end. Validation runs the same layout backwards.

use bip39::Language;
use hmac::Hmac;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::crypto::bitbuf::BitBuffer;
use crate::crypto::hash::sha256;
use crate::error::{Error, Result};

/// Bits per mnemonic word
pub const BITS_PER_WORD: usize = 11;

/// PBKDF2 rounds used to stretch a phrase into a seed
pub const PBKDF2_ROUNDS: u32 = 2048;

/// Length of a stretched seed in bytes
pub const SEED_BYTES: usize = 64;

/// Supported mnemonic strengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MnemonicStrength {
    /// 12 words (128 bits)
    Words12,
    /// 15 words (160 bits)
    Words15,
    /// 18 words (192 bits)
    Words18,
    /// 21 words (224 bits)
    Words21,
    /// 24 words (256 bits)
    Words24,
}

impl MnemonicStrength {
    pub const ALL: [MnemonicStrength; 5] = [
        Self::Words12,
        Self::Words15,
        Self::Words18,
        Self::Words21,
        Self::Words24,
    ];

    /// Strength for a standard word count
    pub fn from_word_count(words: usize) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.word_count() == words)
            .ok_or_else(|| Error::Domain(format!("Number of words ({}) is bad", words)))
    }

    /// Strength for a raw entropy length in bytes
    pub fn from_entropy_len(bytes: usize) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.entropy_bytes() == bytes)
            .ok_or_else(|| Error::Domain(format!("Entropy length ({} bytes) is bad", bytes)))
    }

    pub fn word_count(&self) -> usize {
        match self {
            Self::Words12 => 12,
            Self::Words15 => 15,
            Self::Words18 => 18,
            Self::Words21 => 21,
            Self::Words24 => 24,
        }
    }

    /// Get entropy length in bits
    pub fn entropy_bits(&self) -> usize {
        match self {
            Self::Words12 => 128,
            Self::Words15 => 160,
            Self::Words18 => 192,
            Self::Words21 => 224,
            Self::Words24 => 256,
        }
    }

    /// Get entropy length in bytes
    pub fn entropy_bytes(&self) -> usize {
        self.entropy_bits().div_ceil(8)
    }

    pub fn checksum_bits(&self) -> usize {
        self.entropy_bits().div_ceil(32)
    }

    pub fn total_bits(&self) -> usize {
        self.entropy_bits() + self.checksum_bits()
    }
}

/// Entropy size in bits for a standard word count
pub fn entropy_bits_for(word_count: usize) -> Result<usize> {
    MnemonicStrength::from_word_count(word_count).map(|s| s.entropy_bits())
}

/// A fixed 2048-entry word list
#[derive(Debug, Clone, Copy)]
pub struct Wordlist {
    language: Language,
}

impl Wordlist {
    /// The BIP39 English list
    pub fn english() -> Self {
        Self { language: Language::English }
    }

    pub fn word(&self, index: usize) -> Result<&'static str> {
        self.language
            .word_list()
            .get(index)
            .copied()
            .ok_or_else(|| Error::Range(format!("word index {} is bad", index)))
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.language.find_word(word).map(usize::from)
    }
}

impl Default for Wordlist {
    fn default() -> Self {
        Self::english()
    }
}

/// Outcome of checking a phrase
///
/// A checksum mismatch is reported through `valid`, not as an error, so the
/// same call serves strict checks and diagnostic display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MnemonicReport {
    pub words: Vec<String>,
    pub entropy_bits: usize,
    /// Entropy bits, most significant first
    pub entropy: String,
    pub entropy_hex: String,
    /// Checksum bits read from the phrase
    pub checksum: String,
    pub checksum_value: u8,
    /// Every bit the phrase encodes
    pub data: String,
    pub valid: bool,
}

/// Generate a new random mnemonic with `word_count` words
pub fn generate(word_count: usize, wordlist: &Wordlist) -> Result<Vec<String>> {
    let strength = MnemonicStrength::from_word_count(word_count)?;

    let mut entropy = Zeroizing::new(vec![0u8; strength.entropy_bytes()]);
    OsRng.fill_bytes(entropy.as_mut_slice());

    let words = from_entropy(&entropy, wordlist)?;
    tracing::debug!(words = words.len(), "generated mnemonic");
    Ok(words)
}

/// Encode raw entropy as mnemonic words
pub fn from_entropy(entropy: &[u8], wordlist: &Wordlist) -> Result<Vec<String>> {
    let strength = MnemonicStrength::from_entropy_len(entropy.len())?;
    let checksum_bits = strength.checksum_bits();
    let unused = 8 - checksum_bits;

    // checksum bits are the top bits of the first hash byte
    let checksum = sha256(entropy)[0] & (0xffu8 << unused);

    let mut checked = Vec::with_capacity(entropy.len() + 1);
    checked.push(checksum);
    checked.extend(entropy.iter().rev());

    let bits = BitBuffer::with_window(checked, unused, unused + strength.total_bits())?;
    bits.rchunk_every(BITS_PER_WORD)?
        .into_iter()
        .map(|index| wordlist.word(index as usize).map(str::to_string))
        .collect()
}

/// Check a phrase against its embedded checksum
pub fn validate(phrase: &str, wordlist: &Wordlist) -> Result<MnemonicReport> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let strength = MnemonicStrength::from_word_count(words.len())?;
    let checksum_bits = strength.checksum_bits();

    // each word goes underneath the ones before it, so that reading from
    // the high end returns them in phrase order
    let mut data = BitBuffer::new();
    for word in words.iter() {
        let index = wordlist
            .index_of(word)
            .ok_or_else(|| Error::UnknownWord(word.to_string()))?;
        let bits = BitBuffer::from_int(index, BITS_PER_WORD)?;
        data = bits.concat(&data);
    }

    let checksum = data.slice(0, checksum_bits)?;
    let entropy = data.slice(checksum_bits, data.size())?;

    let entropy_bytes = Zeroizing::new(
        entropy
            .rchunk_every(8)?
            .into_iter()
            .map(|byte| byte as u8)
            .collect::<Vec<u8>>(),
    );

    let checksum_value = checksum.to_int()? as u8;
    let expected = sha256(&entropy_bytes)[0] >> (8 - checksum_bits);
    let valid = checksum_value == expected;
    tracing::debug!(words = words.len(), valid, "checked mnemonic");

    Ok(MnemonicReport {
        words: words.iter().map(|w| w.to_string()).collect(),
        entropy_bits: strength.entropy_bits(),
        entropy: entropy.to_string(),
        entropy_hex: hex::encode(entropy_bytes.as_slice()),
        checksum: checksum.to_string(),
        checksum_value,
        data: data.to_string(),
        valid,
    })
}

/// Validate a phrase and return its entropy, failing on a checksum mismatch
pub fn to_entropy(phrase: &str, wordlist: &Wordlist) -> Result<Zeroizing<Vec<u8>>> {
    let report = validate(phrase, wordlist)?;
    if !report.valid {
        return Err(Error::Domain("mnemonic checksum does not match".to_string()));
    }
    let entropy = hex::decode(&report.entropy_hex)
        .map_err(|e| Error::Domain(format!("bad entropy encoding: {}", e)))?;
    Ok(Zeroizing::new(entropy))
}

/// Clean up a typed phrase: lowercase, keep only ASCII letters and
/// whitespace, and collapse runs of whitespace to single spaces
pub fn normalize_phrase(text: &str) -> String {
    let kept: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stretch a phrase and optional passphrase into a 64-byte seed
pub fn seed_from_mnemonic(phrase: &str, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let salt = Zeroizing::new(format!("mnemonic{}", passphrase));
    let mut seed = Zeroizing::new(vec![0u8; SEED_BYTES]);

    pbkdf2::pbkdf2::<Hmac<Sha512>>(
        phrase.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ROUNDS,
        seed.as_mut_slice(),
    )
    .map_err(|e| Error::Dependency(format!("PBKDF2-HMAC-SHA512 failed: {:?}", e)))?;

    Ok(seed)
}
