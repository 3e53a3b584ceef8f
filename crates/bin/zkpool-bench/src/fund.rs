//! mint and approve test tokens for the benchmark accounts

use anyhow::{Context, Result};
use tracing::info;
use zkpool_harness::{Amount, EvmClient, NetworkAdapter};

/// `whole` tokens in base units for a token with `decimals`
pub fn base_units(whole: Amount, decimals: u8) -> Result<Amount> {
    10u128
        .checked_pow(decimals.into())
        .and_then(|unit| whole.checked_mul(unit))
        .with_context(|| format!("{} tokens with {} decimals overflows u128", whole, decimals))
}

pub async fn run(
    rpc_url: &str,
    mnemonic: &str,
    token: &str,
    pool: &str,
    accounts: u32,
    whole: Amount,
) -> Result<()> {
    let clients = (0..accounts)
        .map(|index| {
            EvmClient::with_account(rpc_url, mnemonic, index)
                .with_context(|| format!("failed to derive account {}", index))
        })
        .collect::<Result<Vec<_>>>()?;

    fund_accounts(&clients, token, pool, whole).await
}

/// mint `whole` tokens to each account and approve the pool for them
pub async fn fund_accounts(
    accounts: &[EvmClient],
    token: &str,
    pool: &str,
    whole: Amount,
) -> Result<()> {
    let Some(first) = accounts.first() else {
        return Ok(());
    };
    info!("minting tokens for {} accounts", accounts.len());

    let decimals = first
        .decimals(token)
        .await
        .context("failed to read token decimals")?;
    let amount = base_units(whole, decimals)?;

    for account in accounts {
        account
            .mint(token, amount)
            .await
            .with_context(|| format!("mint to {} failed", account.wallet_address()))?;
        account
            .approve(token, pool, amount)
            .await
            .with_context(|| format!("approve from {} failed", account.wallet_address()))?;

        info!("minted and approved {} to {}", whole, account.wallet_address());
    }

    Ok(())
}
