use medledger_canonical::ActorId;
use thiserror::Error;

use crate::keys::ActorKind;

/// Reasons a transaction is refused admission.
///
/// All variants are final for the given input: resubmitting the same request
/// against the same registry produces the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No public key is registered for the actor.
    #[error("unknown {kind} '{id}'")]
    UnknownActor {
        /// Namespace that was searched.
        kind: ActorKind,
        /// Identifier that was not found.
        id: ActorId,
    },
    /// A signature did not verify against the canonical message.
    #[error("invalid {which} signature")]
    InvalidSignature {
        /// Party whose signature failed.
        which: ActorKind,
    },
    /// A structurally required field is absent.
    #[error("malformed input: {field} is missing")]
    MalformedInput {
        /// Name of the missing field.
        field: &'static str,
    },
}

/// Errors raised while decoding key or signature material.
#[derive(Error, Debug)]
pub enum KeyError {
    /// Value was not valid hex.
    #[error("{field} is not valid hex: {source}")]
    InvalidHex {
        /// Field being decoded.
        field: &'static str,
        /// Underlying decoder error.
        #[source]
        source: hex::FromHexError,
    },
    /// Secret key bytes are not a valid secp256k1 scalar.
    #[error("invalid secret key")]
    InvalidSecretKey,
    /// A directory entry could not be imported.
    #[error("invalid key for '{id}': {reason}")]
    InvalidEntry {
        /// Actor identifier of the entry.
        id: String,
        /// Reason for rejection.
        reason: String,
    },
}
