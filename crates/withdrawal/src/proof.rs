//! Withdrawal proof assembly.
//!
//! Builds the exact argument tuple the withdraw-manager contract expects
//! when confirming a child-chain burn against a published checkpoint. This
//! module only gathers and encodes; submission happens at the session layer.

use crate::source::{ProofLookup, SourceError};
use alloy_primitives::{Bytes, TxHash, B256, U256};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum WithdrawError {
    /// The transaction's block has not been checkpointed yet.
    ///
    /// Terminal for this call; callers poll externally until a checkpoint
    /// covering the block exists.
    #[error("no checkpoint found for transaction {0}")]
    NoCheckpoint(TxHash),

    /// The syncer has no inclusion proof for the transaction
    #[error("transaction proof not found for {0}")]
    MissingTxProof(TxHash),

    /// The syncer has no inclusion proof for the receipt
    #[error("receipt proof not found for {0}")]
    MissingReceiptProof(TxHash),

    /// The syncer has no sibling hashes for the checkpointed range
    #[error("header proof not found for block {0}")]
    MissingHeaderProof(u64),

    /// No syncer/watcher URL was configured for this session
    #[error("proof source unavailable: syncer/watcher url not configured")]
    SourceUnavailable,
}

/// Argument tuple for `withdrawBurntTokens`, in contract order.
#[derive(Debug, Clone)]
pub struct WithdrawalProofParams {
    pub header_number: U256,
    /// Flat concatenation of the checkpoint sibling hashes, `32 * N` bytes
    pub header_proof: Bytes,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub tx_root: B256,
    pub receipt_root: B256,
    /// RLP-encoded trie key; the only pre-encoded field
    pub path: Bytes,
    pub tx_bytes: Bytes,
    pub tx_proof_nodes: Bytes,
    pub receipt_bytes: Bytes,
    pub receipt_proof_nodes: Bytes,
}

/// Collapse a lookup outcome to found/not-found.
///
/// Transport errors were kept distinguishable at the source boundary for
/// diagnosability; here they become "not found", with a trace retaining the
/// detail. A missing service URL stays a distinct, actionable condition.
fn available<T>(result: Result<Option<T>, SourceError>) -> Result<Option<T>, WithdrawError> {
    match result {
        Ok(found) => Ok(found),
        Err(SourceError::Unconfigured) => Err(WithdrawError::SourceUnavailable),
        Err(e) => {
            warn!(error = %e, "proof lookup failed");
            Ok(None)
        }
    }
}

/// Concatenate checkpoint sibling hashes into the verifier's proof buffer.
///
/// Order must match the service response exactly; no sorting, no
/// deduplication, no separators or length prefixes.
fn concat_sibling_hashes(siblings: &[B256]) -> Bytes {
    let mut buffer = Vec::with_capacity(siblings.len() * 32);
    for hash in siblings {
        buffer.extend_from_slice(hash.as_slice());
    }

    Bytes::from(buffer)
}

/// RLP-encode a trie key as a single byte-string item.
///
/// The verifier expects this one field pre-encoded; every other byte field
/// is passed raw.
fn encode_path(path: &Bytes) -> Bytes {
    Bytes::from(alloy_rlp::encode(path.as_ref()))
}

/// Resolve the checkpoint covering `tx_id` and assemble the full
/// `withdrawBurntTokens` argument tuple.
pub async fn assemble<L>(source: &L, tx_id: TxHash) -> Result<WithdrawalProofParams, WithdrawError>
where
    L: ProofLookup,
{
    // The two trie proofs are independent of each other
    let (tx_proof, receipt_proof) =
        tokio::join!(source.tx_proof(tx_id), source.receipt_proof(tx_id));

    // The header lookup needs the transaction's block number
    let tx_proof = available(tx_proof)?.ok_or(WithdrawError::MissingTxProof(tx_id))?;

    let header = available(source.header_for_block(tx_proof.block_number).await)?
        .ok_or(WithdrawError::NoCheckpoint(tx_id))?;

    debug!(
        header = header.number,
        start = header.start,
        end = header.end,
        block = tx_proof.block_number,
        "found covering checkpoint header"
    );

    let receipt_proof =
        available(receipt_proof)?.ok_or(WithdrawError::MissingReceiptProof(tx_id))?;

    let header_proof = available(
        source
            .header_proof(tx_proof.block_number, header.start, header.end)
            .await,
    )?
    .ok_or(WithdrawError::MissingHeaderProof(tx_proof.block_number))?;

    Ok(WithdrawalProofParams {
        header_number: U256::from(header.number),
        header_proof: concat_sibling_hashes(&header_proof.proof),
        block_number: tx_proof.block_number,
        block_timestamp: tx_proof.block_timestamp,
        tx_root: tx_proof.root,
        receipt_root: receipt_proof.root,
        path: encode_path(&receipt_proof.path),
        tx_bytes: tx_proof.value,
        tx_proof_nodes: tx_proof.parent_nodes,
        receipt_bytes: receipt_proof.value,
        receipt_proof_nodes: receipt_proof.parent_nodes,
    })
}
