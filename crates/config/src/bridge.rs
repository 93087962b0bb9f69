//! Bridge session configuration.
//!
//! Everything a session needs to talk to both chains and the proof
//! services. The syncer and watcher URLs are optional; without them,
//! proof-based withdrawal confirmation is disabled and the corresponding
//! calls fail with a "proof source unavailable" condition.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Addresses of the fixed protocol contracts on the root chain, plus the
/// wrapped native token used to represent the root-chain currency on the
/// child chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// RootChain contract (deposit entry point)
    pub root_chain: Address,

    /// WithdrawManager contract (proof verification, exits)
    pub withdraw_manager: Address,

    /// DepositManager contract (token mapping registry)
    pub deposit_manager: Address,

    /// Wrapped native token on the child chain
    pub wrapped_native_token: Address,
}

/// Complete bridge session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Child chain RPC endpoint url
    pub child_rpc_url: String,

    /// Root chain RPC endpoint url
    pub root_rpc_url: String,

    /// Syncer service base url (proof material)
    pub syncer_url: Option<String>,

    /// Watcher service base url (checkpoint status)
    pub watcher_url: Option<String>,

    /// Protocol contract addresses
    pub contracts: ContractAddresses,
}

impl BridgeConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }
}
