//! erc20 calldata encoding

use super::{keccak256, Address};
use crate::{Amount, Error, Result};

/// first 4 bytes of keccak256(signature)
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn word_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn word_uint(value: Amount) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn call(signature: &str, words: &[[u8; 32]]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * words.len());
    data.extend_from_slice(&selector(signature));
    for word in words {
        data.extend_from_slice(word);
    }
    data
}

/// `mint(address,uint256)` on a test token
pub fn mint(to: &Address, amount: Amount) -> Vec<u8> {
    call("mint(address,uint256)", &[word_address(to), word_uint(amount)])
}

/// `approve(address,uint256)`
pub fn approve(spender: &Address, amount: Amount) -> Vec<u8> {
    call("approve(address,uint256)", &[word_address(spender), word_uint(amount)])
}

/// `balanceOf(address)`
pub fn balance_of(owner: &Address) -> Vec<u8> {
    call("balanceOf(address)", &[word_address(owner)])
}

/// `decimals()`
pub fn decimals() -> Vec<u8> {
    call("decimals()", &[])
}

/// decode a single uint256 return value that must fit in 128 bits
pub fn decode_uint(output: &[u8]) -> Result<Amount> {
    if output.len() != 32 {
        return Err(Error::InvalidQuantity(format!(
            "expected 32-byte word, got {} bytes",
            output.len()
        )));
    }
    if output[..16].iter().any(|b| *b != 0) {
        return Err(Error::InvalidQuantity(format!(
            "0x{} exceeds 128 bits",
            hex::encode(output)
        )));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&output[16..]);
    Ok(Amount::from_be_bytes(low))
}
