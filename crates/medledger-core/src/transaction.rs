use medledger_canonical::{encode_transaction_message, ActorId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::signature::{KeyPair, Signature};

/// Unsigned transaction request: the fields both parties sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Patient the record belongs to.
    #[serde(default)]
    pub patient_id: ActorId,
    /// Hospital producing the record.
    #[serde(default)]
    pub hospital_id: ActorId,
    /// Opaque application data.
    #[serde(alias = "data")]
    pub payload: Value,
}

impl TransactionRequest {
    /// Creates a request.
    pub fn new(patient_id: impl Into<ActorId>, hospital_id: impl Into<ActorId>, payload: Value) -> Self {
        Self {
            patient_id: patient_id.into(),
            hospital_id: hospital_id.into(),
            payload,
        }
    }

    /// Canonical bytes both parties sign.
    pub fn canonical_message(&self) -> Vec<u8> {
        encode_transaction_message(
            self.patient_id.as_str(),
            self.hospital_id.as_str(),
            &self.payload,
        )
    }

    /// Produces the co-signed transaction.
    pub fn sign(self, patient: &KeyPair, hospital: &KeyPair) -> Transaction {
        let message = self.canonical_message();
        let patient_signature = patient.sign(&message);
        let hospital_signature = hospital.sign(&message);
        Transaction {
            patient_id: self.patient_id,
            hospital_id: self.hospital_id,
            payload: self.payload,
            patient_signature,
            hospital_signature,
        }
    }
}

/// A co-signed transaction as received from the transport layer.
///
/// Fields are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    patient_id: ActorId,
    #[serde(default)]
    hospital_id: ActorId,
    #[serde(alias = "data")]
    payload: Value,
    patient_signature: Signature,
    hospital_signature: Signature,
}

impl Transaction {
    /// Assembles a transaction from already-produced signatures.
    pub fn new(
        patient_id: impl Into<ActorId>,
        hospital_id: impl Into<ActorId>,
        payload: Value,
        patient_signature: Signature,
        hospital_signature: Signature,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            hospital_id: hospital_id.into(),
            payload,
            patient_signature,
            hospital_signature,
        }
    }

    /// Patient identifier.
    pub fn patient_id(&self) -> &ActorId {
        &self.patient_id
    }

    /// Hospital identifier.
    pub fn hospital_id(&self) -> &ActorId {
        &self.hospital_id
    }

    /// Opaque application data.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Patient's signature over [`canonical_message`](Self::canonical_message).
    pub fn patient_signature(&self) -> &Signature {
        &self.patient_signature
    }

    /// Hospital's signature over [`canonical_message`](Self::canonical_message).
    pub fn hospital_signature(&self) -> &Signature {
        &self.hospital_signature
    }

    /// Canonical bytes of `{patient_id, hospital_id, payload}`; signatures excluded.
    pub fn canonical_message(&self) -> Vec<u8> {
        encode_transaction_message(
            self.patient_id.as_str(),
            self.hospital_id.as_str(),
            &self.payload,
        )
    }
}

/// A transaction whose two signatures have been verified.
///
/// Only [`TransactionAuthorizer`](crate::TransactionAuthorizer) can produce one,
/// which makes it the only value a ledger accepts for appending.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedTransaction {
    tx: Transaction,
}

impl AuthorizedTransaction {
    pub(crate) fn new(tx: Transaction) -> Self {
        Self { tx }
    }

    /// The verified transaction.
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// Unwraps the verified transaction.
    pub fn into_inner(self) -> Transaction {
        self.tx
    }
}

impl AsRef<Transaction> for AuthorizedTransaction {
    fn as_ref(&self) -> &Transaction {
        &self.tx
    }
}
