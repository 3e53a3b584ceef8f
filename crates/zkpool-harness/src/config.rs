//! connection parameters and scenario settings

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::scenario::BalanceChecks;
use crate::{Amount, Error, Result, WEI_PER_UNIT};

/// the five strings a host passes to the entry point
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ConnectionParams {
    pub rpc_url: String,
    pub pool_address: String,
    pub token_address: String,
    pub relayer_url: String,
    pub mnemonic: String,
}

impl ConnectionParams {
    pub fn new(
        rpc_url: impl Into<String>,
        pool_address: impl Into<String>,
        token_address: impl Into<String>,
        relayer_url: impl Into<String>,
        mnemonic: impl Into<String>,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            pool_address: pool_address.into(),
            token_address: token_address.into(),
            relayer_url: relayer_url.into(),
            mnemonic: mnemonic.into(),
        }
    }

    /// read `RPC_URL`, `POOL_ADDRESS`, `TOKEN_ADDRESS`, `RELAYER_URL`, `MNEMONIC`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self> {
        let get = |key: &'static str| lookup(key).ok_or(Error::MissingEnv(key));
        Ok(Self {
            rpc_url: get("RPC_URL")?,
            pool_address: get("POOL_ADDRESS")?,
            token_address: get("TOKEN_ADDRESS")?,
            relayer_url: get("RELAYER_URL")?,
            mnemonic: get("MNEMONIC")?,
        })
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("rpc_url", &self.rpc_url)
            .field("pool_address", &self.pool_address)
            .field("token_address", &self.token_address)
            .field("relayer_url", &self.relayer_url)
            .field("mnemonic", &"<redacted>")
            .finish()
    }
}

/// amounts and strictness of the fixed deposit/transfer/withdraw run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScenarioConfig {
    pub deposit_amount: Amount,
    /// sent to our own shielded address
    pub transfer_amount: Amount,
    pub withdraw_amount: Amount,
    pub balance_checks: BalanceChecks,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            deposit_amount: 3 * WEI_PER_UNIT,
            transfer_amount: WEI_PER_UNIT,
            withdraw_amount: 3 * WEI_PER_UNIT,
            balance_checks: BalanceChecks::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("RPC_URL", "http://127.0.0.1:8545"),
            ("POOL_ADDRESS", "0x01"),
            ("TOKEN_ADDRESS", "0x02"),
            ("RELAYER_URL", "http://127.0.0.1:8000"),
            ("MNEMONIC", "test test test test test test test test test test test junk"),
        ]
        .into_iter()
        .collect();

        let params = ConnectionParams::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(params.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(params.relayer_url, "http://127.0.0.1:8000");

        let debug = format!("{:?}", params);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("junk"));
    }

    #[test]
    fn test_missing_var() {
        let err = ConnectionParams::from_lookup(|k| (k == "RPC_URL").then(|| "x".into())).unwrap_err();
        assert_eq!(err, Error::MissingEnv("POOL_ADDRESS"));
    }

    #[test]
    fn test_default_amounts() {
        let config = ScenarioConfig::default();
        assert_eq!(config.deposit_amount, 3_000_000_000_000_000_000);
        assert_eq!(config.transfer_amount, 1_000_000_000_000_000_000);
        assert_eq!(config.withdraw_amount, config.deposit_amount);
        assert_eq!(config.balance_checks, BalanceChecks::Off);
    }
}
