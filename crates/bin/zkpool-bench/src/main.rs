//! zkpool-bench - operator tool for shielded pool benchmarks
//!
//! Commands:
//! - fund: mint and approve test tokens for derived accounts
//! - throughput: replay proved transactions through the relayer
//! - job: wait for a relayer job
//! - address: print a derived account address

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use zkpool_harness::{HdWallet, JobId, PollConfig, RelayerClient};

mod fund;
mod throughput;

#[derive(Parser)]
#[command(name = "zkpool-bench")]
#[command(about = "shielded pool benchmark tool", long_about = None)]
struct Cli {
    /// evm json-rpc endpoint
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// shielded pool contract
    #[arg(long, env = "POOL_ADDRESS")]
    pool_address: Option<String>,

    /// erc-20 token contract
    #[arg(long, env = "TOKEN_ADDRESS")]
    token_address: Option<String>,

    /// relayer base url
    #[arg(long, env = "RELAYER_URL")]
    relayer_url: Option<String>,

    /// bip39 mnemonic for the benchmark accounts
    #[arg(long, env = "MNEMONIC", hide_env_values = true)]
    mnemonic: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint test tokens to derived accounts and approve the pool
    Fund {
        /// Number of accounts, starting at index 0
        #[arg(long, default_value_t = 10)]
        accounts: u32,
        /// Whole tokens per account
        #[arg(long, default_value_t = 1000)]
        amount: u128,
    },

    /// Submit proved transactions concurrently and time each job
    Throughput {
        /// JSON array of relayer transaction requests
        #[arg(long, default_value = "txs.json")]
        txs: PathBuf,
    },

    /// Wait for a relayer job and print its tx hash
    Job {
        id: String,
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print the address of a derived account
    Address {
        #[arg(long, default_value_t = 0)]
        index: u32,
    },
}

impl Cli {
    fn rpc_url(&self) -> Result<&str> {
        required(&self.rpc_url, "--rpc-url / RPC_URL")
    }

    fn pool_address(&self) -> Result<&str> {
        required(&self.pool_address, "--pool-address / POOL_ADDRESS")
    }

    fn token_address(&self) -> Result<&str> {
        required(&self.token_address, "--token-address / TOKEN_ADDRESS")
    }

    fn relayer_url(&self) -> Result<&str> {
        required(&self.relayer_url, "--relayer-url / RELAYER_URL")
    }

    fn mnemonic(&self) -> Result<&str> {
        required(&self.mnemonic, "--mnemonic / MNEMONIC")
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .with_context(|| format!("{} is required for this command", name))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zkpool_bench=info,zkpool_harness=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Fund { accounts, amount } => {
            fund::run(
                cli.rpc_url()?,
                cli.mnemonic()?,
                cli.token_address()?,
                cli.pool_address()?,
                *accounts,
                *amount,
            )
            .await?;
        }

        Commands::Throughput { txs } => {
            let results = throughput::run(cli.relayer_url()?, txs).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        Commands::Job { id, timeout } => {
            let relayer = RelayerClient::new(cli.relayer_url()?).with_poll_config(PollConfig {
                timeout: timeout.map(Duration::from_secs),
                ..Default::default()
            });
            info!("waiting for job {} on {}", id, relayer.url());
            let hash = relayer
                .wait_job_completed(&JobId::new(id.as_str()))
                .await
                .with_context(|| format!("job {}", id))?;
            match hash {
                Some(hash) => println!("{}", hash),
                None => println!("completed (no tx hash reported)"),
            }
        }

        Commands::Address { index } => {
            let wallet = HdWallet::from_mnemonic(cli.mnemonic()?, *index)
                .context("failed to derive account")?;
            println!("{}", wallet.address());
        }
    }

    Ok(())
}
