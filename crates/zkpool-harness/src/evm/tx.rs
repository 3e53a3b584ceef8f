//! legacy (EIP-155) transactions and the rlp subset they need

use super::{keccak256, Address};
use crate::keys::HdWallet;
use crate::{Amount, Result};

/// rlp item
enum Item<'a> {
    Bytes(&'a [u8]),
    Uint(u128),
}

fn minimal_be(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

fn encode_length(len: usize, short_base: u8, out: &mut Vec<u8>) {
    if len <= 55 {
        out.push(short_base + len as u8);
    } else {
        let len_bytes = minimal_be(len as u128);
        out.push(short_base + 55 + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        out.push(bytes[0]);
    } else {
        encode_length(bytes.len(), 0x80, out);
        out.extend_from_slice(bytes);
    }
}

fn encode_list(items: &[Item<'_>]) -> Vec<u8> {
    let mut payload = Vec::new();
    for item in items {
        match item {
            Item::Bytes(b) => encode_bytes(b, &mut payload),
            Item::Uint(v) => encode_bytes(&minimal_be(*v), &mut payload),
        }
    }

    let mut out = Vec::with_capacity(payload.len() + 9);
    encode_length(payload.len(), 0xc0, &mut out);
    out.extend_from_slice(&payload);
    out
}

/// pre-EIP-1559 transaction with replay protection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: Amount,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl LegacyTransaction {
    fn fields(&self) -> [Item<'_>; 6] {
        [
            Item::Uint(self.nonce as u128),
            Item::Uint(self.gas_price),
            Item::Uint(self.gas_limit as u128),
            Item::Bytes(self.to.as_bytes()),
            Item::Uint(self.value),
            Item::Bytes(&self.data),
        ]
    }

    /// rlp(nonce, gasPrice, gas, to, value, data, chainId, 0, 0)
    pub fn signing_payload(&self) -> Vec<u8> {
        let [a, b, c, d, e, f] = self.fields();
        encode_list(&[a, b, c, d, e, f, Item::Uint(self.chain_id as u128), Item::Uint(0), Item::Uint(0)])
    }

    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(&self.signing_payload())
    }

    /// sign and return the raw transaction for `eth_sendRawTransaction`
    pub fn sign(&self, wallet: &HdWallet) -> Result<Vec<u8>> {
        let sig = wallet.sign_hash(&self.signing_hash())?;
        let v = sig[64] as u128 + 35 + 2 * self.chain_id as u128;

        let [a, b, c, d, e, f] = self.fields();
        Ok(encode_list(&[
            a,
            b,
            c,
            d,
            e,
            f,
            Item::Uint(v),
            Item::Bytes(strip_zeros(&sig[..32])),
            Item::Bytes(strip_zeros(&sig[32..64])),
        ]))
    }
}

fn strip_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::address_of;
    use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

    fn eip155_example() -> LegacyTransaction {
        LegacyTransaction {
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_limit: 21_000,
            to: "0x3535353535353535353535353535353535353535".parse().unwrap(),
            value: 1_000_000_000_000_000_000,
            data: vec![],
            chain_id: 1,
        }
    }

    #[test]
    fn test_rlp_short_strings() {
        let mut out = Vec::new();
        encode_bytes(b"dog", &mut out);
        assert_eq!(out, vec![0x83, b'd', b'o', b'g']);

        assert_eq!(encode_list(&[]), vec![0xc0]);
        assert_eq!(encode_list(&[Item::Uint(0)]), vec![0xc1, 0x80]);
        assert_eq!(encode_list(&[Item::Uint(15)]), vec![0xc1, 0x0f]);
        assert_eq!(encode_list(&[Item::Uint(1024)]), vec![0xc3, 0x82, 0x04, 0x00]);
    }

    #[test]
    fn test_rlp_long_string() {
        let data = [0xaau8; 60];
        let mut out = Vec::new();
        encode_bytes(&data, &mut out);
        assert_eq!(&out[..2], &[0xb8, 60]);
        assert_eq!(out.len(), 62);
    }

    #[test]
    fn test_eip155_signing_payload() {
        let tx = eip155_example();
        assert_eq!(
            hex::encode(tx.signing_payload()),
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080"
        );
        assert_eq!(
            hex::encode(tx.signing_hash()),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_signed_transaction_recovers_sender() {
        let key = SigningKey::from_slice(&[0x46u8; 32]).unwrap();
        let wallet = HdWallet::from_signing_key(key, 0);
        let tx = eip155_example();

        let raw = tx.sign(&wallet).unwrap();
        let sig = wallet.sign_hash(&tx.signing_hash()).unwrap();

        // list header, then the same six fields the signing payload starts with
        let unsigned = tx.signing_payload();
        let fields = &unsigned[1..unsigned.len() - 3];
        assert_eq!(raw[0], 0xf8);
        assert_eq!(raw[1] as usize, raw.len() - 2);
        assert_eq!(&raw[2..2 + fields.len()], fields);

        // v = recovery_id + 35 + 2 * chain_id
        assert_eq!(raw[2 + fields.len()], sig[64] + 37);

        let signature = Signature::from_slice(&sig[..64]).unwrap();
        let recovered = VerifyingKey::recover_from_prehash(
            &tx.signing_hash(),
            &signature,
            RecoveryId::from_byte(sig[64]).unwrap(),
        )
        .unwrap();
        assert_eq!(address_of(&recovered), wallet.address());
        assert_eq!(
            wallet.address().to_string(),
            "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
        );
    }
}
