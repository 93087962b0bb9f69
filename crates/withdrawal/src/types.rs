//! Wire types returned by the syncer and watcher services.

use alloy_primitives::{Bytes, B256};
use serde::{Deserialize, Deserializer};

/// Accept a JSON number or a decimal string; the proof services emit both.
pub(crate) fn u64_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Inclusion proof for a single child-chain trie entry.
///
/// The same shape serves both the transaction trie and the receipt trie.
/// Beyond the named fields the contents are opaque to this client; they are
/// forwarded to the on-chain verifier untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrieProof {
    /// Child-chain block holding the proven entry
    #[serde(deserialize_with = "u64_or_string")]
    pub block_number: u64,

    /// Timestamp of that block
    #[serde(deserialize_with = "u64_or_string")]
    pub block_timestamp: u64,

    /// Trie root the proof commits to
    pub root: B256,

    /// Trie key of the proven entry
    pub path: Bytes,

    /// Raw leaf value (transaction or receipt bytes)
    pub value: Bytes,

    /// Sibling/parent node bytes along the path
    pub parent_nodes: Bytes,
}

/// Checkpoint header covering a contiguous range of child-chain blocks.
///
/// A transaction only has a header once its block has been checkpointed to
/// the root chain; until then no header exists for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CheckpointHeader {
    /// Header block number on the root chain
    #[serde(deserialize_with = "u64_or_string")]
    pub number: u64,

    /// First covered child-chain block
    #[serde(deserialize_with = "u64_or_string")]
    pub start: u64,

    /// Last covered child-chain block
    #[serde(deserialize_with = "u64_or_string")]
    pub end: u64,
}

/// Sibling hashes proving a block range's inclusion under a checkpoint
/// header. Order is load-bearing: it matches the on-chain trie structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HeaderProof {
    #[serde(default)]
    pub proof: Vec<B256>,
}

/// Envelope for syncer proof responses (`{"proof": ...}`).
#[derive(Debug, Deserialize)]
pub(crate) struct ProofEnvelope<T> {
    pub proof: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_trie_proof_from_service_json() {
        let json = r#"{
            "blockNumber": "4053",
            "blockTimestamp": 1549108232,
            "root": "0x9c87049868d7f55bf5b64c05fc9ceef1f8f77a0fcba4a07c1f4d67ffbc488619",
            "path": "0x0806",
            "value": "0xf86b",
            "parentNodes": "0xf871a0"
        }"#;

        let proof: TrieProof = serde_json::from_str(json).expect("Failed to parse proof");
        assert_eq!(proof.block_number, 4053);
        assert_eq!(proof.block_timestamp, 1549108232);
        assert_eq!(
            proof.root,
            b256!("9c87049868d7f55bf5b64c05fc9ceef1f8f77a0fcba4a07c1f4d67ffbc488619")
        );
        assert_eq!(proof.path.as_ref(), &[0x08, 0x06]);
    }

    #[test]
    fn test_checkpoint_header_accepts_mixed_number_forms() {
        let json = r#"{"number": "10000", "start": 90, "end": "110"}"#;

        let header: CheckpointHeader = serde_json::from_str(json).expect("Failed to parse header");
        assert_eq!(header.number, 10000);
        assert_eq!(header.start, 90);
        assert_eq!(header.end, 110);
    }

    #[test]
    fn test_header_proof_defaults_to_empty() {
        let proof: HeaderProof = serde_json::from_str("{}").expect("Failed to parse");
        assert!(proof.proof.is_empty());

        let json = r#"{"proof": [
            "0x1111111111111111111111111111111111111111111111111111111111111111",
            "0x2222222222222222222222222222222222222222222222222222222222222222"
        ]}"#;
        let proof: HeaderProof = serde_json::from_str(json).expect("Failed to parse");
        assert_eq!(proof.proof.len(), 2);
    }

    #[test]
    fn test_envelope_unwraps_proof_object() {
        let json = r#"{"proof": {"number": 5, "start": 1, "end": 9}}"#;
        let envelope: ProofEnvelope<CheckpointHeader> =
            serde_json::from_str(json).expect("Failed to parse envelope");
        assert_eq!(envelope.proof.number, 5);
    }
}
