//! public-chain collaborator traits
//!
//! a network adapter wraps one funded account on a node. the shielded client
//! borrows it as a [`Signer`] when a deposit needs an authorization signature.

use async_trait::async_trait;

use crate::{Amount, Result};

/// signs opaque payloads with the account key
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// funded account on a public chain
#[async_trait]
pub trait NetworkAdapter: Signer {
    /// mint `amount` of `token` to this account
    async fn mint(&self, token: &str, amount: Amount) -> Result<()>;

    /// allow `spender` to move `amount` of `token` from this account
    async fn approve(&self, token: &str, spender: &str, amount: Amount) -> Result<()>;

    /// public balance of `token` held by this account
    async fn token_balance(&self, token: &str) -> Result<Amount>;

    /// account address as the chain renders it
    async fn address(&self) -> Result<String>;
}

/// builds a network adapter from an rpc endpoint and an account mnemonic
#[async_trait]
pub trait NetworkConnector: Send + Sync {
    type Adapter: NetworkAdapter;

    async fn connect(&self, rpc_url: &str, mnemonic: &str) -> Result<Self::Adapter>;
}
