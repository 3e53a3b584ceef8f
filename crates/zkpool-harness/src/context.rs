//! scenario driver
//!
//! each operation is a fixed sequence of awaited calls into the two
//! collaborators. a failing call aborts the rest of the sequence and its error
//! is returned as-is.

use tracing::info;

use crate::network::{NetworkAdapter, Signer};
use crate::shielded::{ShieldedClient, TransferOutput};
use crate::timing::{measure_time, DepositTimes, OperationTimes};
use crate::{Amount, Error, Result};

/// collaborators plus the token and pool they operate on
pub struct Context<N, S> {
    network: N,
    shielded: S,
    token_address: String,
    pool_address: String,
}

impl<N, S> Context<N, S>
where
    N: NetworkAdapter,
    S: ShieldedClient,
{
    pub fn new(
        network: N,
        shielded: S,
        token_address: impl Into<String>,
        pool_address: impl Into<String>,
    ) -> Self {
        Self {
            network,
            shielded,
            token_address: token_address.into(),
            pool_address: pool_address.into(),
        }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn shielded(&self) -> &S {
        &self.shielded
    }

    pub fn token_address(&self) -> &str {
        &self.token_address
    }

    pub fn pool_address(&self) -> &str {
        &self.pool_address
    }

    /// mint → balance check → approve → deposit → wait
    pub async fn deposit(&self, amount: Amount) -> Result<DepositTimes> {
        let token = self.token_address.as_str();

        self.network.mint(token, amount).await?;

        let balance = self.network.token_balance(token).await?;
        info!("balance after mint: {}", balance);
        if balance < amount {
            return Err(Error::InsufficientFundsAfterMint {
                balance,
                required: amount,
            });
        }

        let (approved, approve_time) = measure_time(async {
            info!("approving {} for pool {}", amount, self.pool_address);
            self.network.approve(token, &self.pool_address, amount).await
        })
        .await;
        approved?;

        let (job, tx_time) = measure_time(async {
            info!("deposit from {}", self.network.address().await?);
            let signer: &dyn Signer = &self.network;
            self.shielded
                .deposit(token, amount, signer, None, 0, &[])
                .await
        })
        .await;
        let job = job?;

        let (completed, full_time) =
            measure_time(self.shielded.wait_job_completed(token, &job)).await;
        completed?;

        Ok(DepositTimes {
            approve_time,
            tx_time,
            full_time,
        })
    }

    /// shielded transfer → wait
    pub async fn transfer(&self, amount: Amount, to: &str) -> Result<OperationTimes> {
        let token = self.token_address.as_str();
        let outputs = [TransferOutput {
            to: to.to_string(),
            amount,
        }];

        let (job, tx_time) = measure_time(self.shielded.transfer(token, &outputs)).await;
        let job = job?;

        let (completed, full_time) =
            measure_time(self.shielded.wait_job_completed(token, &job)).await;
        completed?;

        Ok(OperationTimes { tx_time, full_time })
    }

    /// shielded withdrawal → wait
    pub async fn withdraw(&self, amount: Amount, to: &str) -> Result<OperationTimes> {
        let token = self.token_address.as_str();

        let (job, tx_time) = measure_time(self.shielded.withdraw(token, to, amount)).await;
        let job = job?;

        let (completed, full_time) =
            measure_time(self.shielded.wait_job_completed(token, &job)).await;
        completed?;

        Ok(OperationTimes { tx_time, full_time })
    }
}
