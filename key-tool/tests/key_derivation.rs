//! Tests for key derivation

use key_tool::account::currency::{BTC, ETH, XST};
use key_tool::account::*;
use key_tool::crypto::keys::*;
use key_tool::crypto::mnemonic::*;

const PHRASE: &str = "aware report movie exile buyer drum poverty supreme gym oppose float elegant";
const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn root(phrase: &str) -> ExtendedKey {
    let seed = seed_from_mnemonic(phrase, "").unwrap();
    ExtendedKey::from_seed(&seed).unwrap()
}

#[test]
fn test_stealth_key_derivation() {
    let root = root(PHRASE);
    let path = DerivationPath::for_coin(XST.coin_type());

    let address = derive_address(&root, &XST, &path).unwrap();
    assert_eq!(address.as_str(), "Ry9h2KZqgMMtNBZ33ukKVNrFFK3w7BLGys");
    assert_eq!(address.path.to_string(), "m/44'/125'/0'/0/0");
}

#[test]
fn test_bitcoin_key_derivation() {
    let root = root(PHRASE);
    let path = DerivationPath::for_coin(BTC.coin_type());

    let key = derive_address_key(&root, &path).unwrap();
    assert_eq!(
        bitcoin::p2pkh_address(&key, BTC.address_byte()),
        "1A9vZ4oPLb29szfRWVFe1VoEe7a2qEMjvJ"
    );
    assert_eq!(
        bitcoin::public_key_to_address(&key.public_key(true), 0).unwrap(),
        "1A9vZ4oPLb29szfRWVFe1VoEe7a2qEMjvJ"
    );
}

#[cfg(feature = "ethereum")]
#[test]
fn test_ethereum_key_derivation() {
    let root = root(PHRASE);
    let path = DerivationPath::for_coin(ETH.coin_type());

    let address = derive_address(&root, &ETH, &path).unwrap();
    assert_eq!(address.as_str(), "0xC5e19e780D06cBE23d4D972806bc5D30C9f3EFA3");
}

#[cfg(not(feature = "ethereum"))]
#[test]
fn test_ethereum_needs_keccak_backend() {
    let root = root(PHRASE);
    let path = DerivationPath::for_coin(ETH.coin_type());

    assert!(matches!(
        derive_address(&root, &ETH, &path),
        Err(key_tool::Error::Dependency(_))
    ));
}

#[test]
fn test_well_known_bitcoin_address() {
    let root = root(ABANDON);
    let key = derive_address_key(&root, &DerivationPath::for_coin(0)).unwrap();
    assert_eq!(bitcoin::p2pkh_address(&key, 0), "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA");
}

#[cfg(feature = "ethereum")]
#[test]
fn test_well_known_ethereum_address() {
    let root = root(ABANDON);
    let key = derive_address_key(&root, &DerivationPath::for_coin(60)).unwrap();
    assert_eq!(
        ethereum::keccak_address(&key).unwrap(),
        "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
    );
}

#[test]
fn test_account_key_is_prefix_of_address_key() {
    let root = root(PHRASE);
    let path = DerivationPath::new(0, 2, Change::Internal, 9);

    let account = derive_account_key(&root, &path).unwrap();
    let via_account = account.child(1).unwrap().child(9).unwrap();
    let direct = derive_address_key(&root, &path).unwrap();

    assert_eq!(account.depth(), 3);
    assert_eq!(direct.depth(), 5);
    assert_eq!(via_account.public_key(true), direct.public_key(true));
}

#[test]
fn test_passphrase_changes_root() {
    let plain = ExtendedKey::from_seed(&seed_from_mnemonic(ABANDON, "").unwrap()).unwrap();
    let salted = ExtendedKey::from_seed(&seed_from_mnemonic(ABANDON, "TREZOR").unwrap()).unwrap();
    assert_ne!(plain.extended_key(false), salted.extended_key(false));
}

#[test]
fn test_wif_round_trip_per_currency() {
    let root = root(PHRASE);
    for currency in CurrencyRegistry::default().iter() {
        let path = DerivationPath::for_coin(currency.coin_type());
        let key = derive_address_key(&root, &path).unwrap();

        let (network, private_key) = bitcoin::decode_wif(&currency.wif(&key)).unwrap();
        assert_eq!(network, currency.wif_byte());
        assert_eq!(private_key.as_slice(), key.private_key().as_slice());
    }
}
