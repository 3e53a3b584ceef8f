//! relayer http client
//!
//! submits prepared shielded transactions and polls their jobs until the
//! relayer reports a terminal state.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::shielded::JobId;
use crate::{Error, Result};

/// proved transaction as the relayer accepts it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// 0 deposit, 1 transfer, 2 withdraw, 3 permittable deposit
    pub tx_type: u16,
    /// `{ proof, inputs }` as emitted by the prover
    pub proof: serde_json::Value,
    #[serde(with = "hex")]
    pub memo: Vec<u8>,
    #[serde(with = "hex", default)]
    pub extra_data: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    job_id: JobId,
}

/// relayer pool state from `/info`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerInfo {
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub optimistic_root: Option<String>,
    #[serde(default)]
    pub delta_index: Option<serde_json::Value>,
    #[serde(default)]
    pub optimistic_delta_index: Option<serde_json::Value>,
}

/// job lifecycle as reported by `/job/{id}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobState {
    Waiting,
    Pending,
    InProgress,
    Active,
    Sent,
    Delayed,
    Paused,
    Completed,
    Failed,
    Reverted,
    /// anything else the relayer queue reports; polled like a pending job
    Unknown(String),
}

impl JobState {
    fn parse(state: &str) -> Self {
        match state {
            "waiting" => Self::Waiting,
            "pending" => Self::Pending,
            "in_progress" => Self::InProgress,
            "active" => Self::Active,
            "sent" => Self::Sent,
            "delayed" => Self::Delayed,
            "paused" => Self::Paused,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "reverted" => Self::Reverted,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Reverted)
    }
}

impl<'de> Deserialize<'de> for JobState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// tx hash of a completed job; newer relayers batch several
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TxHash {
    One(String),
    Many(Vec<Option<String>>),
}

impl TxHash {
    /// last hash the relayer reported
    pub fn last(&self) -> Option<&str> {
        match self {
            Self::One(hash) => Some(hash),
            Self::Many(hashes) => hashes.iter().rev().find_map(|h| h.as_deref()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub state: JobState,
    #[serde(default)]
    pub tx_hash: Option<TxHash>,
    #[serde(default)]
    pub failed_reason: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// job polling cadence
#[derive(Clone, Copy, Debug)]
pub struct PollConfig {
    pub interval: Duration,
    /// `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            timeout: None,
        }
    }
}

#[derive(Clone)]
pub struct RelayerClient {
    url: String,
    http: Client,
    poll: PollConfig,
}

impl RelayerClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            http: Client::new(),
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// pool state; also serves as a liveness check
    pub async fn info(&self) -> Result<RelayerInfo> {
        let resp = self
            .http
            .get(format!("{}/info", self.url))
            .send()
            .await
            .map_err(|e| Error::RelayerUnavailable(e.to_string()))?;

        let resp = ensure_available(resp).await?;
        resp.json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// submit a batch and return the job that tracks it
    pub async fn send_transactions(&self, txs: &[TransactionRequest]) -> Result<JobId> {
        let resp = self
            .http
            .post(format!("{}/sendTransactions", self.url))
            .json(txs)
            .send()
            .await
            .map_err(|e| Error::RelayerUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Relayer(format!("{}: {}", status, body)));
        }

        let sent: SendResponse = resp
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;
        debug!("relayer accepted {} tx(s) as job {}", txs.len(), sent.job_id);
        Ok(sent.job_id)
    }

    pub async fn job(&self, job: &JobId) -> Result<JobStatus> {
        let resp = self
            .http
            .get(format!("{}/job/{}", self.url, job))
            .send()
            .await
            .map_err(|e| Error::RelayerUnavailable(e.to_string()))?;

        let resp = ensure_available(resp).await?;
        resp.json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// poll `job` until it completes; returns the mined tx hash if reported
    pub async fn wait_job_completed(&self, job: &JobId) -> Result<Option<String>> {
        let start = Instant::now();
        loop {
            let status = self.job(job).await?;
            match status.state {
                JobState::Completed => {
                    let hash = status.tx_hash.as_ref().and_then(|h| h.last()).map(str::to_string);
                    info!("job {} completed: {:?}", job, hash);
                    return Ok(hash);
                }
                JobState::Failed => {
                    return Err(Error::JobFailed {
                        job_id: job.to_string(),
                        reason: status
                            .failed_reason
                            .or(status.error)
                            .unwrap_or_else(|| "unknown".into()),
                    });
                }
                JobState::Reverted => {
                    return Err(Error::JobFailed {
                        job_id: job.to_string(),
                        reason: status
                            .failed_reason
                            .or(status.error)
                            .unwrap_or_else(|| "transaction reverted".into()),
                    });
                }
                JobState::Unknown(state) => warn!("job {} in unrecognized state {:?}", job, state),
                state => debug!("job {} {:?}", job, state),
            }

            if let Some(timeout) = self.poll.timeout {
                let waited = start.elapsed();
                if waited >= timeout {
                    return Err(Error::JobTimeout {
                        job_id: job.to_string(),
                        waited,
                    });
                }
            }
            sleep(self.poll.interval).await;
        }
    }
}

async fn ensure_available(resp: Response) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(Error::RelayerUnavailable(format!("{}: {}", status, body)))
}
