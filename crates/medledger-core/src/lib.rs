//! Dual-party transaction authorization for medledger.
//!
//! This crate provides:
//! - The co-signed [`Transaction`] record and its canonical signing message
//! - secp256k1 signature verification and signer-side key helpers
//! - The [`KeyRegistry`] seam through which actor public keys are resolved
//! - [`TransactionAuthorizer`], which turns a request into an [`AuthorizedTransaction`]
//!
//! Core invariants:
//! - A transaction is admitted only when both the patient and the hospital signed
//!   the exact canonical bytes of `{patient_id, hospital_id, payload}`
//! - Keys are resolved on every call; nothing is cached between calls
//! - Malformed keys or signatures are verification failures, never panics
//!
#![deny(missing_docs)]

/// Transaction authorization.
pub mod authorizer;
/// Error types for core operations.
pub mod errors;
/// Actor namespaces, public keys and key registries.
pub mod keys;
/// Signature verification and signer-side helpers.
pub mod signature;
/// Transaction records.
pub mod transaction;

pub use authorizer::TransactionAuthorizer;
pub use errors::{AuthError, KeyError};
pub use keys::{ActorKind, InMemoryKeyRegistry, KeyRegistry, PublicKey};
pub use signature::{verify, KeyPair, Signature};
pub use transaction::{AuthorizedTransaction, Transaction, TransactionRequest};
