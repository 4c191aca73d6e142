//! Hash-linkage verification for chains and chain snapshots.

use medledger_canonical::Digest;

use crate::block::{Block, GENESIS_PREVIOUS_HASH};
use crate::errors::LedgerError;

/// Verifies an exported chain snapshot.
///
/// Recomputes every block hash from its canonical encoding; stored links are
/// compared against the recomputed values, never against each other.
pub fn verify_chain(blocks: &[Block]) -> Result<(), LedgerError> {
    verify_blocks(blocks.iter())
}

/// Verifies blocks in chain order, stopping at the first broken link.
pub(crate) fn verify_blocks<'a, I>(blocks: I) -> Result<(), LedgerError>
where
    I: IntoIterator<Item = &'a Block>,
{
    let mut iter = blocks.into_iter();
    let genesis = iter.next().ok_or(LedgerError::Empty)?;
    if genesis.index != 1 {
        return Err(LedgerError::Genesis("index must be 1"));
    }
    if genesis.previous_hash != GENESIS_PREVIOUS_HASH {
        return Err(LedgerError::Genesis("previous_hash must be \"0\""));
    }
    if !genesis.is_genesis() {
        return Err(LedgerError::Genesis("data must be empty"));
    }

    let mut prev = genesis;
    for block in iter {
        let expected_index = prev.index + 1;
        if block.index != expected_index {
            return Err(LedgerError::IndexGap {
                expected: expected_index,
                found: block.index,
            });
        }
        if block.is_genesis() {
            return Err(LedgerError::UnexpectedGenesis { index: block.index });
        }

        if Digest::parse(block.previous_hash.as_str()).is_err() {
            tracing::warn!(index = block.index, "previous_hash is not a digest");
            return Err(LedgerError::MalformedPreviousHash {
                index: block.index,
                value: block.previous_hash.clone(),
            });
        }

        let expected = prev.hash();
        if expected != block.previous_hash {
            tracing::warn!(index = block.index, "previous_hash does not match predecessor");
            return Err(LedgerError::IntegrityViolation {
                index: block.index,
                expected: expected.to_string(),
                found: block.previous_hash.clone(),
            });
        }
        prev = block;
    }
    Ok(())
}
