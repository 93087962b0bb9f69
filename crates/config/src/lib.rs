//! Configuration types for the plasma bridge client.
//!
//! This crate provides:
//! - Endpoint and contract-address configuration for both chain sides
//! - Configuration loading from TOML files

pub mod bridge;

pub use bridge::{BridgeConfig, ConfigError, ContractAddresses};
