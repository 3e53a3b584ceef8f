//! phase timing records

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// timings of a deposit, in milliseconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositTimes {
    /// token approval for the pool contract
    pub approve_time: u64,
    /// proof + submission to the relayer
    pub tx_time: u64,
    /// wait for the relayer job to complete
    pub full_time: u64,
}

/// timings of a transfer or withdrawal, in milliseconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationTimes {
    pub tx_time: u64,
    pub full_time: u64,
}

/// await `fut` and return its output with the elapsed wall time in ms.
///
/// the clock starts when the returned future is first polled, which is the
/// moment the wrapped call begins to run.
pub async fn measure_time<F, T>(fut: F) -> (T, u64)
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed().as_millis();
    (out, u64::try_from(elapsed).unwrap_or(u64::MAX))
}
