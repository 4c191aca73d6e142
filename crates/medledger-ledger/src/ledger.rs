//! In-memory, append-only ledger.

use chrono::Utc;
use medledger_core::{AuthError, AuthorizedTransaction, KeyRegistry, Transaction, TransactionAuthorizer};
use parking_lot::RwLock;
use std::fmt;

use crate::block::{Block, BlockData};
use crate::errors::LedgerError;
use crate::verification::verify_blocks;

/// Source of admission timestamps.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> f64;
}

/// Wall clock, microsecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        let now = Utc::now();
        now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
    }
}

/// Block storage that can never be empty.
struct Chain {
    genesis: Block,
    appended: Vec<Block>,
}

impl Chain {
    fn tip(&self) -> &Block {
        self.appended.last().unwrap_or(&self.genesis)
    }

    fn iter(&self) -> impl Iterator<Item = &Block> {
        std::iter::once(&self.genesis).chain(self.appended.iter())
    }
}

/// Ordered, hash-linked sequence of blocks.
///
/// The ledger has a single state, open for append, for its whole lifetime.
/// Appends are serialized behind a write lock that covers reading the tip,
/// hashing it and pushing the new block, so no two appends can observe the
/// same tip. Readers share the lock and never see a block mid-construction.
///
/// # Example
///
/// ```rust
/// use medledger_canonical::ActorId;
/// use medledger_core::{ActorKind, InMemoryKeyRegistry, KeyPair, TransactionAuthorizer, TransactionRequest};
/// use medledger_ledger::Ledger;
/// use serde_json::json;
///
/// let registry = InMemoryKeyRegistry::new();
/// let patient = KeyPair::generate();
/// let hospital = KeyPair::generate();
/// registry.register(ActorKind::Patient, ActorId::from("p1"), patient.public_key());
/// registry.register(ActorKind::Hospital, ActorId::from("h1"), hospital.public_key());
/// let authorizer = TransactionAuthorizer::new(registry);
///
/// let ledger = Ledger::initialize();
/// let tx = TransactionRequest::new("p1", "h1", json!("X")).sign(&patient, &hospital);
/// let block = ledger.admit(&authorizer, tx)?;
///
/// assert_eq!(block.index, 2);
/// assert!(ledger.verify_integrity());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Ledger {
    chain: RwLock<Chain>,
    clock: Box<dyn Clock>,
}

impl Ledger {
    /// Creates a ledger holding only the genesis block, stamped by the wall clock.
    pub fn initialize() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates a ledger whose timestamps come from `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        let genesis = Block::genesis(clock.now());
        tracing::info!(timestamp = genesis.timestamp, "ledger initialized");
        Self {
            chain: RwLock::new(Chain {
                genesis,
                appended: Vec::new(),
            }),
            clock: Box::new(clock),
        }
    }

    /// Restores a ledger from an exported snapshot.
    ///
    /// The chain must link correctly and every transaction in it must pass
    /// `authorizer` against the current registry, exactly as if it were being
    /// admitted now.
    pub fn from_blocks<R: KeyRegistry>(
        authorizer: &TransactionAuthorizer<R>,
        blocks: Vec<Block>,
    ) -> Result<Self, LedgerError> {
        Self::from_blocks_with_clock(authorizer, blocks, SystemClock)
    }

    /// Like [`from_blocks`](Self::from_blocks) with an explicit clock.
    pub fn from_blocks_with_clock<R: KeyRegistry>(
        authorizer: &TransactionAuthorizer<R>,
        blocks: Vec<Block>,
        clock: impl Clock + 'static,
    ) -> Result<Self, LedgerError> {
        let mut blocks = blocks.into_iter();
        let genesis = blocks.next().ok_or(LedgerError::Empty)?;
        let appended: Vec<Block> = blocks.collect();
        verify_blocks(std::iter::once(&genesis).chain(appended.iter()))?;

        for block in &appended {
            if let Some(tx) = block.transaction() {
                authorizer
                    .authorize(tx.clone())
                    .map_err(|source| LedgerError::Unauthorized {
                        index: block.index,
                        source,
                    })?;
            }
        }
        tracing::info!(height = appended.len() + 1, "ledger restored");
        Ok(Self {
            chain: RwLock::new(Chain { genesis, appended }),
            clock: Box::new(clock),
        })
    }

    /// Appends an authorized transaction and returns the new block by value.
    pub fn append(&self, tx: AuthorizedTransaction) -> Block {
        let mut chain = self.chain.write();
        let tip = chain.tip();
        let block = Block {
            index: tip.index + 1,
            timestamp: self.clock.now(),
            data: BlockData::Transaction(tx.into_inner()),
            previous_hash: tip.hash().to_string(),
        };
        chain.appended.push(block.clone());
        drop(chain);

        tracing::info!(
            index = block.index,
            previous_hash = %block.previous_hash,
            "block appended"
        );
        block
    }

    /// Authorizes `tx` and appends it; a rejected transaction never touches the chain.
    pub fn admit<R: KeyRegistry>(
        &self,
        authorizer: &TransactionAuthorizer<R>,
        tx: Transaction,
    ) -> Result<Block, AuthError> {
        let authorized = authorizer.authorize(tx)?;
        Ok(self.append(authorized))
    }

    /// Snapshot of the most recent block.
    pub fn tip(&self) -> Block {
        self.chain.read().tip().clone()
    }

    /// Number of blocks, genesis included.
    pub fn height(&self) -> u64 {
        self.chain.read().appended.len() as u64 + 1
    }

    /// Snapshot of the block at `index` (1-based).
    pub fn block(&self, index: u64) -> Option<Block> {
        let chain = self.chain.read();
        match index {
            0 => None,
            1 => Some(chain.genesis.clone()),
            n => chain.appended.get((n - 2) as usize).cloned(),
        }
    }

    /// Snapshot of the whole chain in order.
    pub fn blocks(&self) -> Vec<Block> {
        self.chain.read().iter().cloned().collect()
    }

    /// Recomputes every link; `false` means the history cannot be trusted.
    pub fn verify_integrity(&self) -> bool {
        self.check_integrity().is_ok()
    }

    /// Like [`verify_integrity`](Self::verify_integrity), reporting the first broken link.
    pub fn check_integrity(&self) -> Result<(), LedgerError> {
        let chain = self.chain.read();
        verify_blocks(chain.iter())
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(f64);

    impl Clock for FixedClock {
        fn now(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn fresh_ledger_holds_only_genesis() {
        let ledger = Ledger::with_clock(FixedClock(100.0));
        let tip = ledger.tip();

        assert_eq!(ledger.height(), 1);
        assert_eq!(tip, Block::genesis(100.0));
        assert_eq!(ledger.block(1), Some(tip));
        assert_eq!(ledger.block(0), None);
        assert_eq!(ledger.block(2), None);
        assert!(ledger.verify_integrity());
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800.0);
    }

    #[test]
    fn from_blocks_rejects_empty_snapshot() {
        let authorizer = TransactionAuthorizer::new(medledger_core::InMemoryKeyRegistry::new());
        assert_eq!(
            Ledger::from_blocks(&authorizer, Vec::new()).unwrap_err(),
            LedgerError::Empty
        );
    }
}
