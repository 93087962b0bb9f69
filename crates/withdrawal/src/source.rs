//! HTTP accessors for the syncer and watcher proof services.
//!
//! Transport failures stay distinguishable from "not found" at this
//! boundary; consumers collapse the two only where the protocol allows it.
//! Transaction and receipt fetches fall back to the child-chain RPC when
//! the syncer is unset or unhelpful. Proof lookups have no RPC fallback.

use crate::types::{CheckpointHeader, HeaderProof, ProofEnvelope, TrieProof};
use alloy_primitives::TxHash;
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types_eth::{Transaction, TransactionReceipt};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SourceError {
    /// The required service URL was not configured for this session
    #[error("proof service not configured")]
    Unconfigured,

    /// The request could not be completed
    #[error("proof service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("proof service returned status {0}")]
    Status(StatusCode),

    /// The child-chain RPC fallback failed
    #[error("chain rpc request failed: {0}")]
    Rpc(String),
}

/// Proof material lookups needed to confirm a withdrawal.
///
/// Implemented by [`ProofSource`]; the assembler is written against this
/// trait so the protocol steps can be exercised without live services.
pub trait ProofLookup: Send + Sync {
    /// Inclusion proof for the transaction itself.
    fn tx_proof(
        &self,
        tx_id: TxHash,
    ) -> impl Future<Output = Result<Option<TrieProof>, SourceError>> + Send;

    /// Inclusion proof for the transaction's receipt.
    fn receipt_proof(
        &self,
        tx_id: TxHash,
    ) -> impl Future<Output = Result<Option<TrieProof>, SourceError>> + Send;

    /// Checkpoint header covering a child-chain block, if one exists yet.
    fn header_for_block(
        &self,
        block_number: u64,
    ) -> impl Future<Output = Result<Option<CheckpointHeader>, SourceError>> + Send;

    /// Sibling hashes for a block within a checkpointed range.
    fn header_proof(
        &self,
        block_number: u64,
        start: u64,
        end: u64,
    ) -> impl Future<Output = Result<Option<HeaderProof>, SourceError>> + Send;
}

/// Typed accessor over the syncer and watcher services.
pub struct ProofSource {
    http: reqwest::Client,
    syncer_url: Option<String>,
    watcher_url: Option<String>,
    child: DynProvider,
}

impl ProofSource {
    pub fn new(
        child: DynProvider,
        syncer_url: Option<String>,
        watcher_url: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            syncer_url: syncer_url.map(|u| u.trim_end_matches('/').to_owned()),
            watcher_url: watcher_url.map(|u| u.trim_end_matches('/').to_owned()),
            child,
        }
    }

    fn syncer(&self) -> Result<&str, SourceError> {
        self.syncer_url.as_deref().ok_or(SourceError::Unconfigured)
    }

    fn watcher(&self) -> Result<&str, SourceError> {
        self.watcher_url.as_deref().ok_or(SourceError::Unconfigured)
    }

    /// GET a JSON object, mapping 404 and malformed bodies to `None`.
    ///
    /// Some deployments signal absence with an empty body rather than a 404,
    /// so decode failures on a success status count as "not found".
    async fn fetch<T: DeserializeOwned>(&self, url: String) -> Result<Option<T>, SourceError> {
        debug!(url = %url, "querying proof service");

        let response = self.http.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body).ok())
    }

    /// Fetch a child-chain transaction, preferring the syncer's indexed copy.
    pub async fn transaction(&self, tx_id: TxHash) -> Result<Option<Transaction>, SourceError> {
        if let Ok(base) = self.syncer() {
            match self.fetch::<Transaction>(format!("{base}/tx/{tx_id}")).await {
                Ok(Some(tx)) => return Ok(Some(tx)),
                Ok(None) => {}
                Err(e) => {
                    debug!(error = %e, "syncer transaction lookup failed, falling back to rpc");
                }
            }
        }

        self.child
            .get_transaction_by_hash(tx_id)
            .await
            .map_err(|e| SourceError::Rpc(e.to_string()))
    }

    /// Fetch a child-chain receipt, preferring the syncer's indexed copy.
    pub async fn transaction_receipt(
        &self,
        tx_id: TxHash,
    ) -> Result<Option<TransactionReceipt>, SourceError> {
        if let Ok(base) = self.syncer() {
            match self
                .fetch::<TransactionReceipt>(format!("{base}/tx/{tx_id}/receipt"))
                .await
            {
                Ok(Some(receipt)) => return Ok(Some(receipt)),
                Ok(None) => {}
                Err(e) => {
                    debug!(error = %e, "syncer receipt lookup failed, falling back to rpc");
                }
            }
        }

        self.child
            .get_transaction_receipt(tx_id)
            .await
            .map_err(|e| SourceError::Rpc(e.to_string()))
    }
}

impl ProofLookup for ProofSource {
    async fn tx_proof(&self, tx_id: TxHash) -> Result<Option<TrieProof>, SourceError> {
        let base = self.syncer()?;
        let envelope: Option<ProofEnvelope<TrieProof>> =
            self.fetch(format!("{base}/tx/{tx_id}/proof")).await?;

        Ok(envelope.map(|e| e.proof))
    }

    async fn receipt_proof(&self, tx_id: TxHash) -> Result<Option<TrieProof>, SourceError> {
        let base = self.syncer()?;
        let envelope: Option<ProofEnvelope<TrieProof>> =
            self.fetch(format!("{base}/tx/{tx_id}/receipt/proof")).await?;

        Ok(envelope.map(|e| e.proof))
    }

    async fn header_for_block(
        &self,
        block_number: u64,
    ) -> Result<Option<CheckpointHeader>, SourceError> {
        let base = self.watcher()?;

        // Absence of a checkpoint is signaled by an error/empty response,
        // not a distinguished JSON flag
        self.fetch(format!("{base}/header/included/{block_number}"))
            .await
    }

    async fn header_proof(
        &self,
        block_number: u64,
        start: u64,
        end: u64,
    ) -> Result<Option<HeaderProof>, SourceError> {
        let base = self.syncer()?;
        let envelope: Option<ProofEnvelope<HeaderProof>> = self
            .fetch(format!(
                "{base}/block/{block_number}/proof?start={start}&end={end}"
            ))
            .await?;

        Ok(envelope.map(|e| e.proof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::create_provider;

    fn offline_source(syncer: Option<&str>, watcher: Option<&str>) -> ProofSource {
        let child = create_provider("http://localhost:8545").expect("Failed to build provider");
        ProofSource::new(
            child,
            syncer.map(str::to_owned),
            watcher.map(str::to_owned),
        )
    }

    #[test]
    fn test_base_urls_are_normalized() {
        let source = offline_source(
            Some("https://syncer.example.network/api/v1/"),
            Some("https://watcher.example.network/api/v1"),
        );
        assert_eq!(
            source.syncer().expect("syncer configured"),
            "https://syncer.example.network/api/v1"
        );
        assert_eq!(
            source.watcher().expect("watcher configured"),
            "https://watcher.example.network/api/v1"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_syncer_is_reported() {
        let source = offline_source(None, None);
        let result = source.tx_proof(TxHash::ZERO).await;
        assert!(matches!(result, Err(SourceError::Unconfigured)));

        let result = source.header_for_block(100).await;
        assert!(matches!(result, Err(SourceError::Unconfigured)));
    }
}
