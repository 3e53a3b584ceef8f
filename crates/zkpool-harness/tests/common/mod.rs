//! fake collaborators sharing one call log and one ledger

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use zkpool_harness::{
    Amount, Error, JobId, NetworkAdapter, NetworkConnector, Result, ShieldedClient,
    ShieldedClientConfig, ShieldedConnector, Signer, TokenConfig, TransferOutput,
};

pub const TOKEN: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
pub const POOL: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";
pub const ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const SHIELDED_ADDRESS: &str = "zk:shielded-self";
pub const MNEMONIC: &str = "test test test test test test test test test test test junk";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Mint(Amount),
    TokenBalance,
    Approve { spender: String, amount: Amount },
    Address,
    Sign,
    Deposit(Amount),
    Transfer { to: String, amount: Amount },
    Withdraw { to: String, amount: Amount },
    Wait(JobId),
    ShieldedBalance,
}

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }
}

#[derive(Default)]
pub struct Balances {
    pub public: Amount,
    pub shielded: Amount,
}

pub type Ledger = Arc<Mutex<Balances>>;

pub struct FakeNetwork {
    pub log: CallLog,
    pub ledger: Ledger,
    /// when false the mint call succeeds but credits nothing
    pub mint_credits: bool,
    pub approve_error: Option<Error>,
}

impl FakeNetwork {
    pub fn new(log: CallLog, ledger: Ledger) -> Self {
        Self {
            log,
            ledger,
            mint_credits: true,
            approve_error: None,
        }
    }
}

#[async_trait]
impl Signer for FakeNetwork {
    async fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.log.push(Call::Sign);
        let mut sig = data.to_vec();
        sig.reverse();
        Ok(sig)
    }
}

#[async_trait]
impl NetworkAdapter for FakeNetwork {
    async fn mint(&self, token: &str, amount: Amount) -> Result<()> {
        assert_eq!(token, TOKEN);
        self.log.push(Call::Mint(amount));
        if self.mint_credits {
            self.ledger.lock().unwrap().public += amount;
        }
        Ok(())
    }

    async fn approve(&self, token: &str, spender: &str, amount: Amount) -> Result<()> {
        assert_eq!(token, TOKEN);
        self.log.push(Call::Approve {
            spender: spender.to_string(),
            amount,
        });
        match &self.approve_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn token_balance(&self, _token: &str) -> Result<Amount> {
        self.log.push(Call::TokenBalance);
        Ok(self.ledger.lock().unwrap().public)
    }

    async fn address(&self) -> Result<String> {
        self.log.push(Call::Address);
        Ok(ACCOUNT.to_string())
    }
}

pub struct FakeShielded {
    pub log: CallLog,
    pub ledger: Ledger,
    pub deposit_error: Option<Error>,
    /// silently kept by the pool on withdrawal
    pub withdraw_skim: Amount,
    next_job: Mutex<u32>,
}

impl FakeShielded {
    pub fn new(log: CallLog, ledger: Ledger) -> Self {
        Self {
            log,
            ledger,
            deposit_error: None,
            withdraw_skim: 0,
            next_job: Mutex::new(1),
        }
    }

    fn job(&self) -> JobId {
        let mut next = self.next_job.lock().unwrap();
        let id = JobId::new(format!("job-{}", *next));
        *next += 1;
        id
    }
}

#[async_trait]
impl ShieldedClient for FakeShielded {
    fn generate_address(&self, token: &str) -> Result<String> {
        assert_eq!(token, TOKEN);
        Ok(SHIELDED_ADDRESS.to_string())
    }

    async fn deposit(
        &self,
        _token: &str,
        amount: Amount,
        signer: &dyn Signer,
        memo: Option<Vec<u8>>,
        fee: Amount,
        extra_data: &[Vec<u8>],
    ) -> Result<JobId> {
        self.log.push(Call::Deposit(amount));
        assert!(memo.is_none());
        assert_eq!(fee, 0);
        assert!(extra_data.is_empty());

        if let Some(err) = &self.deposit_error {
            return Err(err.clone());
        }

        let sig = signer.sign(b"nullifier").await?;
        assert_eq!(sig, b"reifillun".to_vec());

        let mut ledger = self.ledger.lock().unwrap();
        ledger.public -= amount;
        ledger.shielded += amount;
        Ok(self.job())
    }

    async fn transfer(&self, _token: &str, outputs: &[TransferOutput]) -> Result<JobId> {
        assert_eq!(outputs.len(), 1);
        self.log.push(Call::Transfer {
            to: outputs[0].to.clone(),
            amount: outputs[0].amount,
        });
        Ok(self.job())
    }

    async fn withdraw(&self, _token: &str, to: &str, amount: Amount) -> Result<JobId> {
        self.log.push(Call::Withdraw {
            to: to.to_string(),
            amount,
        });
        let mut ledger = self.ledger.lock().unwrap();
        ledger.shielded -= amount;
        ledger.public += amount - self.withdraw_skim;
        Ok(self.job())
    }

    async fn wait_job_completed(&self, _token: &str, job: &JobId) -> Result<()> {
        self.log.push(Call::Wait(job.clone()));
        Ok(())
    }

    async fn optimistic_total_balance(&self, _token: &str, include_pending: bool) -> Result<Amount> {
        assert!(include_pending);
        self.log.push(Call::ShieldedBalance);
        Ok(self.ledger.lock().unwrap().shielded)
    }
}

/// hands out [`FakeNetwork`]s and remembers the mnemonic it was given
#[derive(Default)]
pub struct FakeNetworkConnector {
    pub log: CallLog,
    pub ledger: Ledger,
    pub approve_error: Option<Error>,
    pub seen: Mutex<Option<(String, String)>>,
}

#[async_trait]
impl NetworkConnector for FakeNetworkConnector {
    type Adapter = FakeNetwork;

    async fn connect(&self, rpc_url: &str, mnemonic: &str) -> Result<FakeNetwork> {
        *self.seen.lock().unwrap() = Some((rpc_url.to_string(), mnemonic.to_string()));
        let mut network = FakeNetwork::new(self.log.clone(), self.ledger.clone());
        network.approve_error = self.approve_error.clone();
        Ok(network)
    }
}

/// what the shielded connector was asked to build
#[derive(Clone, Debug)]
pub struct SeenShieldedConfig {
    pub spending_key: [u8; 32],
    pub tokens: HashMap<String, TokenConfig>,
    pub network_name: String,
}

#[derive(Default)]
pub struct FakeShieldedConnector {
    pub log: CallLog,
    pub ledger: Ledger,
    pub deposit_error: Option<Error>,
    pub withdraw_skim: Amount,
    pub seen: Mutex<Option<SeenShieldedConfig>>,
}

#[async_trait]
impl ShieldedConnector for FakeShieldedConnector {
    type Client = FakeShielded;

    async fn connect(&self, config: ShieldedClientConfig) -> Result<FakeShielded> {
        *self.seen.lock().unwrap() = Some(SeenShieldedConfig {
            spending_key: *config.spending_key.as_bytes(),
            tokens: config.tokens.clone(),
            network_name: config.network_name.clone(),
        });
        let mut client = FakeShielded::new(self.log.clone(), self.ledger.clone());
        client.deposit_error = self.deposit_error.clone();
        client.withdraw_skim = self.withdraw_skim;
        Ok(client)
    }
}

/// network + shielded connectors wired to the same log and ledger
pub fn connectors() -> (FakeNetworkConnector, FakeShieldedConnector) {
    let log = CallLog::default();
    let ledger = Ledger::default();
    let network = FakeNetworkConnector {
        log: log.clone(),
        ledger: ledger.clone(),
        ..Default::default()
    };
    let shielded = FakeShieldedConnector {
        log,
        ledger,
        ..Default::default()
    };
    (network, shielded)
}
