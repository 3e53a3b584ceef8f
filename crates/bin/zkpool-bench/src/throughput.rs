//! relayer throughput: submit every transaction at once and time each job

use std::path::Path;

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};
use zkpool_harness::{RelayerClient, TransactionRequest};

/// per-transaction result, printed as `{"time": secs}` or `{"error": msg}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Time { time: f64 },
    Error { error: String },
}

pub async fn run(relayer_url: &str, txs_path: &Path) -> Result<Vec<Outcome>> {
    let relayer = RelayerClient::new(relayer_url);
    relayer.info().await.context("relayer is not available")?;

    let raw = tokio::fs::read_to_string(txs_path)
        .await
        .with_context(|| format!("failed to read {}", txs_path.display()))?;
    let txs: Vec<TransactionRequest> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a json array of transactions", txs_path.display()))?;

    info!("submitting {} transactions to {}", txs.len(), relayer.url());
    Ok(submit_all(&relayer, txs).await)
}

/// outcomes come back in submission order
pub async fn submit_all(relayer: &RelayerClient, txs: Vec<TransactionRequest>) -> Vec<Outcome> {
    join_all(txs.into_iter().map(|tx| timed_submit(relayer, tx))).await
}

async fn timed_submit(relayer: &RelayerClient, tx: TransactionRequest) -> Outcome {
    let start = Instant::now();
    match submit(relayer, tx).await {
        Ok(()) => Outcome::Time {
            time: start.elapsed().as_secs_f64(),
        },
        Err(e) => {
            warn!("transaction failed: {}", e);
            Outcome::Error {
                error: e.to_string(),
            }
        }
    }
}

async fn submit(relayer: &RelayerClient, tx: TransactionRequest) -> zkpool_harness::Result<()> {
    let job = relayer.send_transactions(&[tx]).await?;
    let hash = relayer.wait_job_completed(&job).await?;
    info!("job {} mined in {:?}", job, hash);
    Ok(())
}
