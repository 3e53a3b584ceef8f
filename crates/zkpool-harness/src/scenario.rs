//! scenario entry point
//!
//! deposit, self-transfer and withdrawal, strictly in that order. hosts call
//! [`start`] with connection parameters and connectors for both
//! collaborators, or [`run_scenario`] on a context they built themselves.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ConnectionParams, ScenarioConfig};
use crate::context::Context;
use crate::keys::SpendingKey;
use crate::network::{NetworkAdapter, NetworkConnector};
use crate::shielded::{ShieldedClient, ShieldedClientConfig, ShieldedConnector, TokenConfig};
use crate::timing::{DepositTimes, OperationTimes};
use crate::{Amount, Error, Result};

/// what to do with balances sampled between steps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceChecks {
    /// do not sample
    #[default]
    Off,
    /// sample, log and report
    Log,
    /// sample, report and fail on unexpected values
    Enforce,
}

/// balances sampled after each step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshots {
    pub public_before_deposit: Amount,
    pub shielded_after_deposit: Amount,
    pub public_after_deposit: Amount,
    pub shielded_after_transfer: Amount,
    pub shielded_after_withdraw: Amount,
    pub public_after_withdraw: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub deposit_times: DepositTimes,
    pub transfer_times: OperationTimes,
    pub withdraw_times: OperationTimes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balances: Option<BalanceSnapshots>,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deposit Times:")?;
        writeln!(f, "  Approve Time: {} ms", self.deposit_times.approve_time)?;
        writeln!(f, "  Tx Time: {} ms", self.deposit_times.tx_time)?;
        writeln!(f, "  Confirmation Time: {} ms", self.deposit_times.full_time)?;
        writeln!(f)?;
        writeln!(f, "Transfer Times:")?;
        writeln!(f, "  Tx Time: {} ms", self.transfer_times.tx_time)?;
        writeln!(f, "  Confirmation Time: {} ms", self.transfer_times.full_time)?;
        writeln!(f)?;
        writeln!(f, "Withdraw Times:")?;
        writeln!(f, "  Tx Time: {} ms", self.withdraw_times.tx_time)?;
        write!(f, "  Confirmation Time: {} ms", self.withdraw_times.full_time)
    }
}

/// builds both collaborators from `params` and runs the scenario
pub async fn start<NC, SC>(
    params: &ConnectionParams,
    network_connector: &NC,
    shielded_connector: &SC,
    config: &ScenarioConfig,
) -> Result<ScenarioReport>
where
    NC: NetworkConnector,
    SC: ShieldedConnector,
{
    info!("rpc url: {}", params.rpc_url);
    info!("pool address: {}", params.pool_address);
    info!("token address: {}", params.token_address);
    info!("relayer url: {}", params.relayer_url);

    let spending_key = SpendingKey::from_mnemonic(&params.mnemonic)?;

    let network = network_connector
        .connect(&params.rpc_url, &params.mnemonic)
        .await?;

    info!("creating shielded client");
    let mut tokens = HashMap::new();
    tokens.insert(
        params.token_address.clone(),
        TokenConfig {
            pool_address: params.pool_address.clone(),
            relayer_url: params.relayer_url.clone(),
        },
    );
    let shielded = shielded_connector
        .connect(ShieldedClientConfig {
            spending_key,
            tokens,
            network_name: "test".into(),
            rpc_url: params.rpc_url.clone(),
        })
        .await?;

    let ctx = Context::new(
        network,
        shielded,
        params.token_address.clone(),
        params.pool_address.clone(),
    );
    run_scenario(&ctx, config).await
}

/// deposit → transfer to self → withdraw on an existing context
pub async fn run_scenario<N, S>(ctx: &Context<N, S>, config: &ScenarioConfig) -> Result<ScenarioReport>
where
    N: NetworkAdapter,
    S: ShieldedClient,
{
    let token = ctx.token_address();
    let checks = config.balance_checks;

    let shielded_address = ctx.shielded().generate_address(token)?;
    info!("shielded address generated: {}", shielded_address);

    let mut balances = BalanceSnapshots::default();
    if checks.samples() {
        balances.public_before_deposit = ctx.network().token_balance(token).await?;
    }

    let deposit_times = ctx.deposit(config.deposit_amount).await?;
    if checks.samples() {
        balances.shielded_after_deposit = ctx.shielded().optimistic_total_balance(token, true).await?;
        balances.public_after_deposit = ctx.network().token_balance(token).await?;
        checks.expect(
            "after deposit",
            "shielded",
            config.deposit_amount,
            balances.shielded_after_deposit,
        )?;
        checks.expect(
            "after deposit",
            "public",
            balances.public_before_deposit,
            balances.public_after_deposit,
        )?;
    }
    info!("deposit done");

    let transfer_times = ctx
        .transfer(config.transfer_amount, &shielded_address)
        .await?;
    if checks.samples() {
        balances.shielded_after_transfer = ctx.shielded().optimistic_total_balance(token, true).await?;
        checks.expect(
            "after transfer",
            "shielded",
            config.deposit_amount,
            balances.shielded_after_transfer,
        )?;
    }
    info!("transfer done");

    let withdraw_times = ctx
        .withdraw(config.withdraw_amount, &shielded_address)
        .await?;
    if checks.samples() {
        balances.shielded_after_withdraw = ctx.shielded().optimistic_total_balance(token, true).await?;
        balances.public_after_withdraw = ctx.network().token_balance(token).await?;
        checks.expect(
            "after withdraw",
            "shielded",
            config.deposit_amount.saturating_sub(config.withdraw_amount),
            balances.shielded_after_withdraw,
        )?;
        checks.expect(
            "after withdraw",
            "public",
            balances.public_before_deposit.saturating_add(config.withdraw_amount),
            balances.public_after_withdraw,
        )?;
    }
    info!("withdraw done");

    Ok(ScenarioReport {
        deposit_times,
        transfer_times,
        withdraw_times,
        balances: checks.samples().then_some(balances),
    })
}

impl BalanceChecks {
    fn samples(self) -> bool {
        self != BalanceChecks::Off
    }

    fn expect(self, stage: &'static str, kind: &'static str, expected: Amount, actual: Amount) -> Result<()> {
        info!("{} balance {}: {}", kind, stage, actual);
        if expected == actual {
            return Ok(());
        }
        match self {
            BalanceChecks::Enforce => Err(Error::BalanceMismatch {
                stage,
                kind,
                expected,
                actual,
            }),
            _ => {
                warn!("{} balance {}: expected {}, got {}", kind, stage, expected, actual);
                Ok(())
            }
        }
    }
}
