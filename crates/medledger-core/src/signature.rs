//! secp256k1 ECDSA (SHA-256) signatures over canonical messages.
//!
//! Verification is a pure function that never panics: bad key bytes, bad
//! signature bytes and a valid signature under the wrong key all return `false`.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::errors::KeyError;
use crate::keys::PublicKey;

/// Signature bytes as carried on a transaction (64-byte `r || s` when well formed).
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Wraps raw signature bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decodes a hex-encoded signature.
    pub fn from_hex(value: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(value.trim()).map_err(|source| KeyError::InvalidHex {
            field: "signature",
            source,
        })?;
        Ok(Self(bytes))
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Checks `signature` over `message` under `public_key`.
pub fn verify(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Some(key) = verifying_key(public_key) else {
        return false;
    };
    let Ok(sig) = EcdsaSignature::from_slice(signature.as_bytes()) else {
        return false;
    };
    key.verify(message, &sig).is_ok()
}

fn verifying_key(public_key: &PublicKey) -> Option<VerifyingKey> {
    let bytes = public_key.as_bytes();
    match bytes.len() {
        64 => {
            let mut sec1 = Vec::with_capacity(65);
            sec1.push(0x04);
            sec1.extend_from_slice(bytes);
            VerifyingKey::from_sec1_bytes(&sec1).ok()
        }
        33 | 65 => VerifyingKey::from_sec1_bytes(bytes).ok(),
        _ => None,
    }
}

/// Signer-side key pair.
///
/// Used by tooling and tests to produce co-signatures; the authorizer itself
/// only ever sees public keys.
#[derive(Clone)]
pub struct KeyPair {
    signing: SigningKey,
}

impl KeyPair {
    /// Generates a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::random(&mut OsRng),
        }
    }

    /// Restores a key pair from a hex-encoded 32-byte secret scalar.
    pub fn from_secret_hex(value: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(value.trim()).map_err(|source| KeyError::InvalidHex {
            field: "secret_key",
            source,
        })?;
        let signing = SigningKey::from_slice(&bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing })
    }

    /// Hex-encoded secret scalar.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing.to_bytes())
    }

    /// Public key in 64-byte raw `x || y` form.
    pub fn public_key(&self) -> PublicKey {
        let point = self.signing.verifying_key().to_encoded_point(false);
        PublicKey::from_bytes(&point.as_bytes()[1..])
    }

    /// Signs `message` (hashed with SHA-256).
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig: EcdsaSignature = self.signing.sign(message);
        Signature::from_bytes(sig.to_bytes().to_vec())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips_through_verify() {
        let pair = KeyPair::generate();
        let sig = pair.sign(b"message");
        assert_eq!(sig.as_bytes().len(), 64);
        assert!(verify(b"message", &sig, &pair.public_key()));
        assert!(!verify(b"other message", &sig, &pair.public_key()));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let signer = KeyPair::generate();
        let other = KeyPair::generate();
        let sig = signer.sign(b"message");
        assert!(!verify(b"message", &sig, &other.public_key()));
    }

    #[test]
    fn malformed_inputs_return_false() {
        let pair = KeyPair::generate();
        let sig = pair.sign(b"message");

        assert!(!verify(b"message", &Signature::from_bytes(vec![]), &pair.public_key()));
        assert!(!verify(b"message", &Signature::from_bytes(vec![0u8; 64]), &pair.public_key()));
        assert!(!verify(b"message", &Signature::from_bytes(vec![0xff; 64]), &pair.public_key()));
        assert!(!verify(b"message", &sig, &PublicKey::from_bytes(vec![])));
        assert!(!verify(b"message", &sig, &PublicKey::from_bytes(vec![0u8; 64])));
        assert!(!verify(b"message", &sig, &PublicKey::from_bytes(vec![7u8; 33])));
    }

    #[test]
    fn sec1_key_encodings_are_accepted() {
        let pair = KeyPair::generate();
        let sig = pair.sign(b"message");
        let vk = pair.signing.verifying_key();
        let compressed = PublicKey::from_bytes(vk.to_encoded_point(true).as_bytes());
        let uncompressed = PublicKey::from_bytes(vk.to_encoded_point(false).as_bytes());

        assert!(verify(b"message", &sig, &compressed));
        assert!(verify(b"message", &sig, &uncompressed));
    }

    #[test]
    fn secret_hex_restores_same_public_key() {
        let pair = KeyPair::generate();
        let restored = KeyPair::from_secret_hex(&pair.secret_hex()).unwrap();
        assert_eq!(restored.public_key(), pair.public_key());
        assert!(matches!(
            KeyPair::from_secret_hex(&"00".repeat(32)),
            Err(KeyError::InvalidSecretKey)
        ));
    }
}
