//! evm account adapter

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::abi;
use super::rpc::{RpcClient, TransactionReceipt};
use super::tx::LegacyTransaction;
use super::Address;
use crate::keys::HdWallet;
use crate::network::{NetworkAdapter, NetworkConnector, Signer};
use crate::{Amount, Error, Result};

/// how long to wait for a sent transaction to be mined
#[derive(Clone, Copy, Debug)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(300),
        }
    }
}

/// one mnemonic-derived account on an evm node
pub struct EvmClient {
    rpc: RpcClient,
    wallet: HdWallet,
    receipts: ReceiptPolicy,
}

impl EvmClient {
    /// first account of `mnemonic` on the node at `rpc_url`
    pub fn new(rpc_url: &str, mnemonic: &str) -> Result<Self> {
        Self::with_account(rpc_url, mnemonic, 0)
    }

    /// account `index` under `m/44'/60'/0'/0`
    pub fn with_account(rpc_url: &str, mnemonic: &str, index: u32) -> Result<Self> {
        let wallet = HdWallet::from_mnemonic(mnemonic, index)?;
        Ok(Self::from_wallet(RpcClient::new(rpc_url), wallet))
    }

    pub fn from_wallet(rpc: RpcClient, wallet: HdWallet) -> Self {
        Self {
            rpc,
            wallet,
            receipts: ReceiptPolicy::default(),
        }
    }

    pub fn with_receipt_policy(mut self, receipts: ReceiptPolicy) -> Self {
        self.receipts = receipts;
        self
    }

    pub fn wallet_address(&self) -> Address {
        self.wallet.address()
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// token `decimals()`
    pub async fn decimals(&self, token: &str) -> Result<u8> {
        let token: Address = token.parse()?;
        let out = self.rpc.eth_call(&token, &abi::decimals()).await?;
        let value = abi::decode_uint(&out)?;
        u8::try_from(value).map_err(|_| Error::InvalidQuantity(format!("decimals {}", value)))
    }

    /// sign, send and wait for a contract call to be mined
    pub async fn send_call(&self, to: &Address, data: Vec<u8>) -> Result<TransactionReceipt> {
        let from = self.wallet.address();

        let chain_id = self.rpc.chain_id().await?;
        let nonce = self.rpc.pending_nonce(&from).await?;
        let gas_price = self.rpc.gas_price().await?;
        let gas_limit = self.rpc.estimate_gas(&from, to, &data).await?;

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to: *to,
            value: 0,
            data,
            chain_id,
        };
        let raw = tx.sign(&self.wallet)?;

        let tx_hash = self.rpc.send_raw_transaction(&raw).await?;
        debug!("sent {} (nonce {}, gas {})", tx_hash, nonce, gas_limit);

        self.wait_for_receipt(&tx_hash).await
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt> {
        let start = Instant::now();
        loop {
            if let Some(receipt) = self.rpc.transaction_receipt(tx_hash).await? {
                if !receipt.succeeded() {
                    return Err(Error::TransactionReverted(tx_hash.to_string()));
                }
                return Ok(receipt);
            }

            let waited = start.elapsed();
            if waited >= self.receipts.timeout {
                return Err(Error::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited,
                });
            }
            sleep(self.receipts.poll_interval).await;
        }
    }
}

#[async_trait]
impl Signer for EvmClient {
    async fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.wallet.sign_message(data)?.to_vec())
    }
}

#[async_trait]
impl NetworkAdapter for EvmClient {
    async fn mint(&self, token: &str, amount: Amount) -> Result<()> {
        let token: Address = token.parse()?;
        let receipt = self
            .send_call(&token, abi::mint(&self.wallet.address(), amount))
            .await?;
        info!("minted {} of {} in {}", amount, token, receipt.transaction_hash);
        Ok(())
    }

    async fn approve(&self, token: &str, spender: &str, amount: Amount) -> Result<()> {
        let token: Address = token.parse()?;
        let spender: Address = spender.parse()?;
        let receipt = self
            .send_call(&token, abi::approve(&spender, amount))
            .await?;
        info!(
            "approved {} to spend {} of {} in {}",
            spender, amount, token, receipt.transaction_hash
        );
        Ok(())
    }

    async fn token_balance(&self, token: &str) -> Result<Amount> {
        let token: Address = token.parse()?;
        let out = self
            .rpc
            .eth_call(&token, &abi::balance_of(&self.wallet.address()))
            .await?;
        abi::decode_uint(&out)
    }

    async fn address(&self) -> Result<String> {
        Ok(self.wallet.address().to_string())
    }
}

/// connects [`EvmClient`]s for the scenario entry point
#[derive(Clone, Copy, Debug, Default)]
pub struct EvmConnector {
    /// account index under `m/44'/60'/0'/0`
    pub account_index: u32,
    pub receipts: ReceiptPolicy,
}

#[async_trait]
impl NetworkConnector for EvmConnector {
    type Adapter = EvmClient;

    async fn connect(&self, rpc_url: &str, mnemonic: &str) -> Result<EvmClient> {
        let client = EvmClient::with_account(rpc_url, mnemonic, self.account_index)?
            .with_receipt_policy(self.receipts);
        info!("evm account {} on {}", client.wallet_address(), rpc_url);
        Ok(client)
    }
}
