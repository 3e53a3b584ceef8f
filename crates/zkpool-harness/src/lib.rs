//! # zkpool-harness
//!
//! timed end-to-end scenarios against a shielded pool client running on an
//! evm network.
//!
//! the harness owns no proving or pool logic. it sequences calls into two
//! collaborators and measures how long each phase takes:
//!
//! ```text
//!  ┌────────────────────┐        ┌──────────────────────┐
//!  │  NetworkAdapter    │        │   ShieldedClient     │
//!  │  (evm account)     │◄─sign──│   (external library) │
//!  │  mint / approve    │        │   deposit / transfer │
//!  │  balance / address │        │   withdraw / wait    │
//!  └─────────┬──────────┘        └──────────┬───────────┘
//!            │                              │
//!            └──────────┬───────────────────┘
//!                       ▼
//!               ┌───────────────┐
//!               │    Context    │  mint → check → approve → submit → wait
//!               └───────┬───────┘
//!                       ▼
//!               ┌───────────────┐
//!               │   scenario    │  deposit 3 → transfer 1 → withdraw 3
//!               └───────────────┘
//! ```
//!
//! ## usage
//!
//! ```rust,ignore
//! use zkpool_harness::{scenario, ConnectionParams, EvmConnector, ScenarioConfig};
//!
//! let params = ConnectionParams::from_env()?;
//! let report = scenario::start(&params, &EvmConnector::default(), &my_pool_connector, &ScenarioConfig::default()).await?;
//! println!("{report}");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod evm;
pub mod keys;
pub mod network;
pub mod relayer;
pub mod scenario;
pub mod shielded;
pub mod timing;

pub use config::{ConnectionParams, ScenarioConfig};
pub use context::Context;
pub use error::{Error, Result};
pub use evm::{Address, EvmClient, EvmConnector};
pub use keys::{HdWallet, SpendingKey};
pub use network::{NetworkAdapter, NetworkConnector, Signer};
pub use relayer::{JobState, JobStatus, PollConfig, RelayerClient, TransactionRequest};
pub use scenario::{start, run_scenario, BalanceChecks, BalanceSnapshots, ScenarioReport};
pub use shielded::{JobId, ShieldedClient, ShieldedClientConfig, ShieldedConnector, TokenConfig, TransferOutput};
pub use timing::{measure_time, DepositTimes, OperationTimes};

/// token amount in base units
pub type Amount = u128;

/// one whole token with 18 decimals
pub const WEI_PER_UNIT: Amount = 1_000_000_000_000_000_000;
