use medledger_core::AuthError;
use thiserror::Error;

/// Errors raised while checking a chain.
///
/// Every variant means the history can no longer be trusted from the reported
/// index onward. None of them is repaired automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A stored `previous_hash` does not match the recomputed hash of its predecessor.
    #[error("integrity violation at block {index}: expected previous_hash {expected}, found {found}")]
    IntegrityViolation {
        /// Index of the block whose link is broken.
        index: u64,
        /// Recomputed hash of the preceding block.
        expected: String,
        /// Hash stored in the block.
        found: String,
    },
    /// The first block is not a well-formed genesis block.
    #[error("invalid genesis block: {0}")]
    Genesis(&'static str),
    /// Indices are not contiguous.
    #[error("index gap: expected block {expected}, found {found}")]
    IndexGap {
        /// Index that should come next.
        expected: u64,
        /// Index actually present.
        found: u64,
    },
    /// A block after genesis carries the genesis marker.
    #[error("block {index} carries no transaction")]
    UnexpectedGenesis {
        /// Index of the offending block.
        index: u64,
    },
    /// A non-genesis `previous_hash` is not a 64-character lowercase hex digest.
    #[error("malformed previous_hash at block {index}: {value}")]
    MalformedPreviousHash {
        /// Index of the offending block.
        index: u64,
        /// Value stored in the block.
        value: String,
    },
    /// A restored block carries a transaction that does not pass authorization.
    #[error("block {index} is not authorized: {source}")]
    Unauthorized {
        /// Index of the offending block.
        index: u64,
        /// Why authorization failed.
        #[source]
        source: AuthError,
    },
    /// The chain has no blocks at all.
    #[error("chain is empty")]
    Empty,
}
