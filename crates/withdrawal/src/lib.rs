//! Withdrawal confirmation protocol.
//!
//! A child-chain burn becomes claimable on the root chain only once its
//! block is covered by a published checkpoint. This crate gathers the proof
//! material (syncer/watcher HTTP services, child-chain RPC fallback) and
//! assembles the exact argument tuple the withdraw-manager contract
//! verifies on-chain.

pub mod proof;
pub mod source;
pub mod types;

pub use proof::{assemble, WithdrawError, WithdrawalProofParams};
pub use source::{ProofLookup, ProofSource, SourceError};
pub use types::{CheckpointHeader, HeaderProof, TrieProof};
