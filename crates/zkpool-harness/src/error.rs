//! error types for the harness

use std::time::Duration;

use thiserror::Error;

use crate::Amount;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // === funding ===
    #[error("insufficient funds after mint: balance {balance}, required {required}")]
    InsufficientFundsAfterMint { balance: Amount, required: Amount },

    // === collaborator errors ===
    #[error("network error: {0}")]
    Network(String),

    #[error("shielded client error: {0}")]
    Shielded(String),

    // === node rpc ===
    #[error("rpc transport error: {0}")]
    Rpc(String),

    #[error("rpc error {code}: {message}")]
    RpcResponse { code: i64, message: String },

    #[error("transaction {0} reverted")]
    TransactionReverted(String),

    #[error("no receipt for transaction {tx_hash} after {waited:?}")]
    ReceiptTimeout { tx_hash: String, waited: Duration },

    // === relayer ===
    #[error("relayer is not available: {0}")]
    RelayerUnavailable(String),

    #[error("relayer rejected request: {0}")]
    Relayer(String),

    #[error("transaction [job {job_id}] failed with reason: {reason}")]
    JobFailed { job_id: String, reason: String },

    #[error("job {job_id} not completed after {waited:?}")]
    JobTimeout { job_id: String, waited: Duration },

    // === keys / encoding ===
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("key derivation failed")]
    KeyDerivationFailed,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    // === scenario ===
    #[error("{stage}: expected {kind} balance {expected}, got {actual}")]
    BalanceMismatch {
        stage: &'static str,
        kind: &'static str,
        expected: Amount,
        actual: Amount,
    },

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}
