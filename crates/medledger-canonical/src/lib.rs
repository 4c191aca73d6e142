//! Canonical encoding primitives for medledger transactions and blocks.
//!
//! Every byte that is signed by a patient or hospital, and every byte that is
//! hashed to link one block to the next, is produced by this crate. Signers and
//! verifiers must agree on these bytes exactly, so the encoding is explicit:
//! fixed field order, a type tag in front of every value, and big-endian length
//! prefixes. Nothing here goes through a generic "stringify" step.
//!
#![deny(missing_docs)]

/// Digest primitives (SHA-256, lowercase hex).
pub mod digest;
/// Tagged, length-prefixed canonical encoder.
pub mod encoder;
/// Actor identifiers.
pub mod identifiers;
/// Validation helpers used by canonical types.
pub mod validation;

pub use digest::Digest;
pub use encoder::{encode_transaction_message, CanonicalEncoder, BLOCK_DOMAIN, TRANSACTION_DOMAIN};
pub use identifiers::ActorId;
pub use validation::ValidationError;
