//! Two-of-two authorization of transaction requests.

use medledger_canonical::ActorId;

use crate::errors::AuthError;
use crate::keys::{ActorKind, KeyRegistry, PublicKey};
use crate::signature::verify;
use crate::transaction::{AuthorizedTransaction, Transaction};

/// Checks that a transaction carries valid signatures from both its patient
/// and its hospital.
///
/// Order of checks:
/// 1. both actor ids are present (`MalformedInput`)
/// 2. both public keys resolve (`UnknownActor`); no signature is checked before
///    both keys are known
/// 3. both signatures verify over the same canonical message
///    (`InvalidSignature`, patient reported first)
///
/// The authorizer holds no state besides the registry handle, so it can be
/// shared freely between threads.
#[derive(Debug, Clone)]
pub struct TransactionAuthorizer<R> {
    registry: R,
}

impl<R: KeyRegistry> TransactionAuthorizer<R> {
    /// Creates an authorizer backed by `registry`.
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// The backing registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Authorizes `tx`, returning it wrapped as an [`AuthorizedTransaction`].
    pub fn authorize(&self, tx: Transaction) -> Result<AuthorizedTransaction, AuthError> {
        if tx.patient_id().is_blank() {
            tracing::warn!("rejecting transaction without patient_id");
            return Err(AuthError::MalformedInput { field: "patient_id" });
        }
        if tx.hospital_id().is_blank() {
            tracing::warn!("rejecting transaction without hospital_id");
            return Err(AuthError::MalformedInput { field: "hospital_id" });
        }

        let patient_key = self.resolve(ActorKind::Patient, tx.patient_id())?;
        let hospital_key = self.resolve(ActorKind::Hospital, tx.hospital_id())?;

        let message = tx.canonical_message();
        let patient_ok = verify(&message, tx.patient_signature(), &patient_key);
        let hospital_ok = verify(&message, tx.hospital_signature(), &hospital_key);

        let failed = match (patient_ok, hospital_ok) {
            (true, true) => None,
            (false, _) => Some(ActorKind::Patient),
            (true, false) => Some(ActorKind::Hospital),
        };
        if let Some(which) = failed {
            tracing::warn!(
                which = %which,
                patient = %tx.patient_id(),
                hospital = %tx.hospital_id(),
                "signature verification failed"
            );
            return Err(AuthError::InvalidSignature { which });
        }

        tracing::debug!(
            patient = %tx.patient_id(),
            hospital = %tx.hospital_id(),
            "transaction authorized"
        );
        Ok(AuthorizedTransaction::new(tx))
    }

    fn resolve(&self, kind: ActorKind, id: &ActorId) -> Result<PublicKey, AuthError> {
        self.registry.lookup(kind, id).ok_or_else(|| {
            tracing::warn!(kind = %kind, actor = %id, "no public key registered");
            AuthError::UnknownActor {
                kind,
                id: id.clone(),
            }
        })
    }
}
