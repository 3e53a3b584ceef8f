//! ethereum json-rpc client

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::Address;
use crate::{Error, Result};

#[derive(Clone)]
pub struct RpcClient {
    url: String,
    client: Client,
}

impl RpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!("rpc {}", method);

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?;

        let json: RpcResponse = response
            .json()
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?;

        if let Some(error) = json.error {
            return Err(Error::RpcResponse {
                code: error.code,
                message: error.message,
            });
        }

        // null is a legitimate result (pending receipt), so only a missing
        // field is an error
        let result = json
            .result
            .ok_or_else(|| Error::Rpc(format!("no result in response to {}", method)))?;
        serde_json::from_value(result).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let hex: String = self.call("eth_chainId", vec![]).await?;
        parse_u64(&hex)
    }

    pub async fn gas_price(&self) -> Result<u128> {
        let hex: String = self.call("eth_gasPrice", vec![]).await?;
        parse_quantity(&hex)
    }

    pub async fn pending_nonce(&self, address: &Address) -> Result<u64> {
        let hex: String = self
            .call(
                "eth_getTransactionCount",
                vec![json!(address.to_string()), json!("pending")],
            )
            .await?;
        parse_u64(&hex)
    }

    pub async fn estimate_gas(&self, from: &Address, to: &Address, data: &[u8]) -> Result<u64> {
        let hex: String = self
            .call(
                "eth_estimateGas",
                vec![json!({
                    "from": from.to_string(),
                    "to": to.to_string(),
                    "data": format!("0x{}", hex::encode(data)),
                })],
            )
            .await?;
        parse_u64(&hex)
    }

    /// read-only contract call against the latest block
    pub async fn eth_call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        let hex: String = self
            .call(
                "eth_call",
                vec![
                    json!({
                        "to": to.to_string(),
                        "data": format!("0x{}", hex::encode(data)),
                    }),
                    json!("latest"),
                ],
            )
            .await?;
        parse_bytes(&hex)
    }

    /// returns the transaction hash
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String> {
        self.call(
            "eth_sendRawTransaction",
            vec![json!(format!("0x{}", hex::encode(raw)))],
        )
        .await
    }

    /// `None` while the transaction is still pending
    pub async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>> {
        self.call("eth_getTransactionReceipt", vec![json!(tx_hash)])
            .await
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    error: Option<RpcError>,
}

/// keeps `"result": null` distinguishable from a missing field
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` reverted
    pub status: Option<String>,
    pub gas_used: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        match self.status.as_deref() {
            Some(status) => parse_quantity(status).map(|s| s == 1).unwrap_or(false),
            // pre-byzantium receipts carry no status
            None => true,
        }
    }
}

/// parse a hex quantity like `0x1a`
pub fn parse_quantity(hex: &str) -> Result<u128> {
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidQuantity(hex.to_string()))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).map_err(|_| Error::InvalidQuantity(hex.to_string()))
}

/// parse a hex quantity that must fit in 64 bits (chain id, nonce, gas)
pub fn parse_u64(hex: &str) -> Result<u64> {
    let value = parse_quantity(hex)?;
    u64::try_from(value).map_err(|_| Error::InvalidQuantity(hex.to_string()))
}

/// parse hex data like `0xdeadbeef`
pub fn parse_bytes(hex: &str) -> Result<Vec<u8>> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    hex::decode(digits).map_err(|e| Error::Serialization(e.to_string()))
}
