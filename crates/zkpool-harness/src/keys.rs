//! mnemonic key derivation
//!
//! BIP-39 seed -> BIP-32 secp256k1 derivation along the ethereum path
//! `m/44'/60'/0'/0/{index}`. the same secret at account 0 seeds the shielded
//! spending key.

use std::fmt;

use bip39::Mnemonic;
use hmac::{Hmac, Mac};
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{FieldBytes, Scalar, SecretKey};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::evm::{eip191_hash, keccak256, Address};
use crate::{Error, Result};

type HmacSha512 = Hmac<Sha512>;

const HARDENED: u32 = 0x8000_0000;

/// `m/44'/60'/0'/0/{index}`
pub fn ethereum_path(index: u32) -> [u32; 5] {
    [44 | HARDENED, 60 | HARDENED, HARDENED, 0, index]
}

/// bip32 extended private key
#[derive(Zeroize, ZeroizeOnDrop)]
struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedKey {
    fn master(seed: &[u8]) -> Result<Self> {
        let mut mac =
            HmacSha512::new_from_slice(b"Bitcoin seed").map_err(|_| Error::KeyDerivationFailed)?;
        mac.update(seed);
        let out = mac.finalize().into_bytes();

        // IL must be a valid non-zero scalar
        SecretKey::from_slice(&out[..32]).map_err(|_| Error::KeyDerivationFailed)?;

        Ok(Self::from_halves(&out[..32], &out[32..]))
    }

    fn child(&self, index: u32) -> Result<Self> {
        let mut mac =
            HmacSha512::new_from_slice(&self.chain_code).map_err(|_| Error::KeyDerivationFailed)?;

        if index & HARDENED != 0 {
            mac.update(&[0u8]);
            mac.update(&self.key);
        } else {
            let secret =
                SecretKey::from_slice(&self.key).map_err(|_| Error::KeyDerivationFailed)?;
            mac.update(secret.public_key().to_encoded_point(true).as_bytes());
        }
        mac.update(&index.to_be_bytes());
        let out = mac.finalize().into_bytes();

        let tweak = scalar_from_bytes(&out[..32])?;
        let parent = scalar_from_bytes(&self.key)?;
        let child = tweak + parent;
        if bool::from(child.is_zero()) {
            return Err(Error::KeyDerivationFailed);
        }

        Ok(Self::from_halves(&child.to_bytes(), &out[32..]))
    }

    fn from_halves(key: &[u8], chain_code: &[u8]) -> Self {
        let mut ext = Self {
            key: [0u8; 32],
            chain_code: [0u8; 32],
        };
        ext.key.copy_from_slice(key);
        ext.chain_code.copy_from_slice(chain_code);
        ext
    }
}

fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(bytes)))
        .ok_or(Error::KeyDerivationFailed)
}

/// derive the private key at `path` from a bip39 seed
fn derive_path(seed: &[u8], path: &[u32]) -> Result<ExtendedKey> {
    let mut key = ExtendedKey::master(seed)?;
    for &index in path {
        key = key.child(index)?;
    }
    Ok(key)
}

fn seed_from_phrase(phrase: &str) -> Result<[u8; 64]> {
    let mnemonic = Mnemonic::parse(phrase).map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_seed(""))
}

/// ethereum address of a public key: last 20 bytes of keccak256(x || y)
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address(address)
}

/// secp256k1 account derived from a mnemonic
pub struct HdWallet {
    signing_key: SigningKey,
    address: Address,
    index: u32,
}

impl HdWallet {
    /// account `index` under `m/44'/60'/0'/0`
    pub fn from_mnemonic(phrase: &str, index: u32) -> Result<Self> {
        let mut seed = seed_from_phrase(phrase)?;
        let derived = derive_path(&seed, &ethereum_path(index));
        seed.zeroize();
        let derived = derived?;

        let signing_key =
            SigningKey::from_slice(&derived.key).map_err(|_| Error::KeyDerivationFailed)?;
        Ok(Self::from_signing_key(signing_key, index))
    }

    pub fn from_signing_key(signing_key: SigningKey, index: u32) -> Self {
        let address = address_of(signing_key.verifying_key());
        Self {
            signing_key,
            address,
            index,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// sign a 32-byte digest, returning `r || s || recovery_id`
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<[u8; 65]> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|e| Error::Signing(e.to_string()))?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(out)
    }

    /// EIP-191 personal message signature with `v` in {27, 28}
    pub fn sign_message(&self, message: &[u8]) -> Result<[u8; 65]> {
        let mut sig = self.sign_hash(&eip191_hash(message))?;
        sig[64] += 27;
        Ok(sig)
    }
}

impl fmt::Debug for HdWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdWallet")
            .field("address", &self.address)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// secret authorizing shielded operations.
///
/// handed to the shielded client as raw bytes; the client reduces it into
/// whatever field its circuits use.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SpendingKey([u8; 32]);

impl SpendingKey {
    pub fn from_mnemonic(phrase: &str) -> Result<Self> {
        let mut seed = seed_from_phrase(phrase)?;
        let derived = derive_path(&seed, &ethereum_path(0));
        seed.zeroize();
        Ok(Self(derived?.key))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SpendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpendingKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature};

    const HARDHAT_MNEMONIC: &str = "test test test test test test test test test test test junk";

    #[test]
    fn test_bip32_vector_1() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();

        let master = ExtendedKey::master(&seed).unwrap();
        assert_eq!(
            hex::encode(master.key),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(master.chain_code),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );

        let child = derive_path(&seed, &[HARDENED]).unwrap();
        assert_eq!(
            hex::encode(child.key),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
    }

    #[test]
    fn test_hardhat_accounts() {
        let first = HdWallet::from_mnemonic(HARDHAT_MNEMONIC, 0).unwrap();
        assert_eq!(
            first.address().to_string(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let second = HdWallet::from_mnemonic(HARDHAT_MNEMONIC, 1).unwrap();
        assert_eq!(
            second.address().to_string(),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
        assert_eq!(second.index(), 1);
    }

    #[test]
    fn test_spending_key_matches_first_account() {
        let sk = SpendingKey::from_mnemonic(HARDHAT_MNEMONIC).unwrap();
        assert_eq!(
            hex::encode(sk.as_bytes()),
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
        );
        assert_eq!(format!("{:?}", sk), "SpendingKey(..)");
    }

    #[test]
    fn test_invalid_mnemonic() {
        let err = HdWallet::from_mnemonic("not a real phrase", 0).unwrap_err();
        assert!(matches!(err, Error::InvalidMnemonic(_)));
    }

    #[test]
    fn test_sign_message_recovers_address() {
        let wallet = HdWallet::from_mnemonic(HARDHAT_MNEMONIC, 0).unwrap();
        let message = b"deposit authorization";
        let sig = wallet.sign_message(message).unwrap();

        assert!(sig[64] == 27 || sig[64] == 28);

        let signature = Signature::from_slice(&sig[..64]).unwrap();
        let recovery_id = RecoveryId::from_byte(sig[64] - 27).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&eip191_hash(message), &signature, recovery_id)
                .unwrap();

        assert_eq!(address_of(&recovered), wallet.address());
    }
}
