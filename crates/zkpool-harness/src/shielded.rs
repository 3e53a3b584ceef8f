//! shielded pool client interface
//!
//! proof generation, note scanning and relayer submission live in an external
//! client library. the harness only sees the calls below.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::keys::SpendingKey;
use crate::network::Signer;
use crate::{Amount, Result};

/// opaque relayer job handle returned by a shielded submission
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// one output of a shielded transfer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutput {
    /// shielded recipient address
    pub to: String,
    pub amount: Amount,
}

#[async_trait]
pub trait ShieldedClient: Send + Sync {
    /// shielded receiving address for `token`, deterministic per spending key
    fn generate_address(&self, token: &str) -> Result<String>;

    /// move `amount` of public `token` into the pool.
    ///
    /// `signer` authorizes the public-side transfer of funds.
    async fn deposit(
        &self,
        token: &str,
        amount: Amount,
        signer: &dyn Signer,
        memo: Option<Vec<u8>>,
        fee: Amount,
        extra_data: &[Vec<u8>],
    ) -> Result<JobId>;

    async fn transfer(&self, token: &str, outputs: &[TransferOutput]) -> Result<JobId>;

    /// release `amount` from the pool to `to`
    async fn withdraw(&self, token: &str, to: &str, amount: Amount) -> Result<JobId>;

    /// suspend until the relayer reports a terminal state for `job`
    async fn wait_job_completed(&self, token: &str, job: &JobId) -> Result<()>;

    async fn optimistic_total_balance(&self, token: &str, include_pending: bool) -> Result<Amount>;
}

/// per-token pool endpoints
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    pub pool_address: String,
    pub relayer_url: String,
}

/// everything a shielded client library needs to come up
#[derive(Debug)]
pub struct ShieldedClientConfig {
    pub spending_key: SpendingKey,
    /// token address -> pool endpoints
    pub tokens: HashMap<String, TokenConfig>,
    pub network_name: String,
    pub rpc_url: String,
}

/// builds a shielded client; implemented by the host around its pool library
#[async_trait]
pub trait ShieldedConnector: Send + Sync {
    type Client: ShieldedClient;

    async fn connect(&self, config: ShieldedClientConfig) -> Result<Self::Client>;
}
