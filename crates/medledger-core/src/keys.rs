use medledger_canonical::ActorId;
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::KeyError;

/// Namespace an actor is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    /// The patient the record belongs to.
    Patient,
    /// The hospital producing the record.
    Hospital,
}

impl ActorKind {
    /// Lowercase name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorKind::Patient => "patient",
            ActorKind::Hospital => "hospital",
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(ActorKind::Patient),
            "hospital" => Ok(ActorKind::Hospital),
            other => Err(format!("unknown actor kind '{}'", other)),
        }
    }
}

/// Public verification key bytes as registered for an actor.
///
/// The bytes are kept as supplied. Accepted encodings are 64-byte raw `x || y`,
/// 65-byte SEC1 uncompressed and 33-byte SEC1 compressed; anything else simply
/// never verifies.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decodes a hex-encoded key.
    pub fn from_hex(value: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(value.trim()).map_err(|source| KeyError::InvalidHex {
            field: "public_key",
            source,
        })?;
        Ok(Self(bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Source of truth for actor public keys.
///
/// Implementations must reflect registration, rotation and revocation
/// immediately; the authorizer consults the registry on every call and keeps
/// nothing between calls. `lookup` may block.
pub trait KeyRegistry: Send + Sync {
    /// Returns the key currently registered for `actor_id` in `kind`, if any.
    fn lookup(&self, kind: ActorKind, actor_id: &ActorId) -> Option<PublicKey>;
}

impl<R: KeyRegistry + ?Sized> KeyRegistry for Arc<R> {
    fn lookup(&self, kind: ActorKind, actor_id: &ActorId) -> Option<PublicKey> {
        (**self).lookup(kind, actor_id)
    }
}

impl<R: KeyRegistry + ?Sized> KeyRegistry for &R {
    fn lookup(&self, kind: ActorKind, actor_id: &ActorId) -> Option<PublicKey> {
        (**self).lookup(kind, actor_id)
    }
}

/// Thread-safe in-memory registry.
///
/// Reads take a shared lock so concurrent authorizations do not serialize on
/// the registry; registration and revocation take the write lock briefly.
#[derive(Debug, Default)]
pub struct InMemoryKeyRegistry {
    keys: RwLock<HashMap<(ActorKind, ActorId), PublicKey>>,
}

impl InMemoryKeyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or rotates a key, returning the key it replaced.
    pub fn register(&self, kind: ActorKind, actor_id: ActorId, key: PublicKey) -> Option<PublicKey> {
        tracing::debug!(kind = %kind, actor = %actor_id, "registering public key");
        self.keys.write().insert((kind, actor_id), key)
    }

    /// Removes a key, returning it if it was registered.
    pub fn revoke(&self, kind: ActorKind, actor_id: &ActorId) -> Option<PublicKey> {
        tracing::debug!(kind = %kind, actor = %actor_id, "revoking public key");
        self.keys.write().remove(&(kind, actor_id.clone()))
    }

    /// Imports a key directory of `{actor_id: public_key_hex}` entries.
    ///
    /// The whole directory is decoded before anything is registered, so a bad
    /// entry leaves the registry untouched. Returns the number of entries imported.
    pub fn load_directory<I, K, V>(&self, kind: ActorKind, entries: I) -> Result<usize, KeyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut decoded = Vec::new();
        for (id, hex_key) in entries {
            let id = id.into();
            let actor_id = ActorId::parse(id.clone()).map_err(|e| KeyError::InvalidEntry {
                id: id.clone(),
                reason: e.to_string(),
            })?;
            let key = PublicKey::from_hex(hex_key.as_ref()).map_err(|e| KeyError::InvalidEntry {
                id,
                reason: e.to_string(),
            })?;
            decoded.push((actor_id, key));
        }

        let count = decoded.len();
        let mut keys = self.keys.write();
        for (actor_id, key) in decoded {
            keys.insert((kind, actor_id), key);
        }
        tracing::info!(kind = %kind, count, "loaded key directory");
        Ok(count)
    }

    /// Number of registered keys across both namespaces.
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    /// Whether no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

impl KeyRegistry for InMemoryKeyRegistry {
    fn lookup(&self, kind: ActorKind, actor_id: &ActorId) -> Option<PublicKey> {
        self.keys.read().get(&(kind, actor_id.clone())).cloned()
    }
}
