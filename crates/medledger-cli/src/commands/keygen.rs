//! Keygen command implementation.

use crate::input::{self, KeyDirectory};
use medledger_canonical::ActorId;
use medledger_core::{ActorKind, KeyPair};

pub fn run(
    kind: ActorKind,
    id: String,
    registry: String,
    secrets: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let actor_id = ActorId::parse(id).map_err(|e| format!("Invalid actor id: {}", e))?;

    let mut public_keys: KeyDirectory = input::read_directory_or_default(&registry)?;
    let mut secret_keys: KeyDirectory = input::read_directory_or_default(&secrets)?;

    let pair = KeyPair::generate();
    let public_hex = pair.public_key().to_hex();
    let replaced = public_keys
        .insert(actor_id.to_string(), public_hex.clone())
        .is_some();
    secret_keys.insert(actor_id.to_string(), pair.secret_hex());

    input::write_json(&registry, &public_keys)?;
    input::write_json(&secrets, &secret_keys)?;

    if replaced {
        tracing::warn!(kind = %kind, actor = %actor_id, "replaced existing key");
    }
    println!("Generated {} key for {}: {}", kind, actor_id, public_hex);
    Ok(())
}
