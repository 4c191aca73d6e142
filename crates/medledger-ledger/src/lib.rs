//! Hash-linked, append-only ledger of co-signed medledger transactions.
//!
//! This crate provides:
//! - [`Block`] and its canonical hash
//! - [`Ledger`], the single-writer in-memory chain (`initialize`, `append`, `tip`,
//!   `verify_integrity`)
//! - [`verify_chain`] for checking exported chain snapshots
//!
//! Every block after genesis stores `previous_hash = hash(canonical(block[i-1]))`.
//! Block hashes are derived on demand and never stored, so verification always
//! recomputes them.

#![deny(missing_docs)]

/// Block structure and hashing.
pub mod block;
/// Error types for ledger operations.
pub mod errors;
/// The in-memory ledger.
pub mod ledger;
/// Chain verification.
pub mod verification;

pub use block::{Block, BlockData, GENESIS_PREVIOUS_HASH};
pub use errors::LedgerError;
pub use ledger::{Clock, Ledger, SystemClock};
pub use verification::verify_chain;
