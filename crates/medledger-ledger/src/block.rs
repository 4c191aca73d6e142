//! Block structure and canonical hashing.

use medledger_canonical::{CanonicalEncoder, Digest};
use medledger_core::Transaction;
use serde::{Deserialize, Serialize};

/// `previous_hash` value carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Data marker for the genesis block.
const DATA_GENESIS: u8 = 0x00;
/// Data marker for a block carrying a transaction.
const DATA_TRANSACTION: u8 = 0x01;

/// Contents of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockData {
    /// Empty marker carried only by the genesis block.
    Genesis,
    /// An admitted, co-signed transaction.
    Transaction(Transaction),
}

/// An entry in the ledger.
///
/// Blocks handed out by a ledger are snapshots; changing one does not change
/// the ledger. A block's own hash is never stored, see [`Block::hash`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, starting at 1 for genesis.
    pub index: u64,
    /// Admission time in seconds since the Unix epoch.
    pub timestamp: f64,
    /// Genesis marker or admitted transaction.
    pub data: BlockData,
    /// Hash of the preceding block, or `"0"` for genesis.
    pub previous_hash: String,
}

impl Block {
    /// Builds the genesis block.
    pub fn genesis(timestamp: f64) -> Self {
        Self {
            index: 1,
            timestamp,
            data: BlockData::Genesis,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        }
    }

    /// Whether this block carries the genesis marker.
    pub fn is_genesis(&self) -> bool {
        matches!(self.data, BlockData::Genesis)
    }

    /// The admitted transaction, if any.
    pub fn transaction(&self) -> Option<&Transaction> {
        match &self.data {
            BlockData::Genesis => None,
            BlockData::Transaction(tx) => Some(tx),
        }
    }

    /// Canonical encoding of `{index, timestamp, data, previous_hash}`.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut enc = CanonicalEncoder::block();
        enc.u64(self.index).f64(self.timestamp);
        match &self.data {
            BlockData::Genesis => {
                enc.tag(DATA_GENESIS);
            }
            BlockData::Transaction(tx) => {
                enc.tag(DATA_TRANSACTION)
                    .str(tx.patient_id().as_str())
                    .str(tx.hospital_id().as_str())
                    .value(tx.payload())
                    .bytes(tx.patient_signature().as_bytes())
                    .bytes(tx.hospital_signature().as_bytes());
            }
        }
        enc.str(&self.previous_hash);
        enc.finish()
    }

    /// SHA-256 of [`canonical_bytes`](Self::canonical_bytes), recomputed on every call.
    pub fn hash(&self) -> Digest {
        Digest::of(&self.canonical_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medledger_core::Signature;
    use serde_json::json;

    fn sample_tx(payload: serde_json::Value) -> Transaction {
        Transaction::new(
            "p1",
            "h1",
            payload,
            Signature::from_bytes(vec![1, 2, 3]),
            Signature::from_bytes(vec![4, 5, 6]),
        )
    }

    #[test]
    fn genesis_has_sentinel_previous_hash() {
        let genesis = Block::genesis(0.0);
        assert_eq!(genesis.index, 1);
        assert!(genesis.is_genesis());
        assert_eq!(genesis.previous_hash, "0");
        assert!(genesis.transaction().is_none());
    }

    #[test]
    fn every_field_affects_the_hash() {
        let base = Block {
            index: 2,
            timestamp: 1_700_000_000.25,
            data: BlockData::Transaction(sample_tx(json!("X"))),
            previous_hash: Block::genesis(0.0).hash().to_string(),
        };
        let hash = base.hash();

        let mut changed = base.clone();
        changed.index = 3;
        assert_ne!(changed.hash(), hash);

        let mut changed = base.clone();
        changed.timestamp += 0.5;
        assert_ne!(changed.hash(), hash);

        let mut changed = base.clone();
        changed.data = BlockData::Transaction(sample_tx(json!("Y")));
        assert_ne!(changed.hash(), hash);

        let mut changed = base.clone();
        changed.data = BlockData::Genesis;
        assert_ne!(changed.hash(), hash);

        let mut changed = base;
        changed.previous_hash = "0".to_string();
        assert_ne!(changed.hash(), hash);
    }

    #[test]
    fn signatures_are_covered_by_the_block_hash() {
        let a = Block {
            index: 2,
            timestamp: 1.5,
            data: BlockData::Transaction(sample_tx(json!("X"))),
            previous_hash: "0".into(),
        };
        let mut b = a.clone();
        b.data = BlockData::Transaction(Transaction::new(
            "p1",
            "h1",
            json!("X"),
            Signature::from_bytes(vec![1, 2, 3]),
            Signature::from_bytes(vec![4, 5, 7]),
        ));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn json_shape_tags_block_data() {
        let genesis = serde_json::to_value(Block::genesis(12.5)).unwrap();
        assert_eq!(
            genesis,
            json!({"index": 1, "timestamp": 12.5, "data": {"kind": "genesis"}, "previous_hash": "0"})
        );

        let block = Block {
            index: 2,
            timestamp: 13.0,
            data: BlockData::Transaction(sample_tx(json!({"a": 1}))),
            previous_hash: "0".into(),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["data"]["kind"], "transaction");
        assert_eq!(value["data"]["patient_signature"], "010203");
        let parsed: Block = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, block);
    }
}
