//! Sign command implementation.

use crate::error::CliError;
use crate::input::{self, KeyDirectory};
use medledger_core::{ActorKind, KeyPair, TransactionRequest};

pub fn run(
    input: Option<String>,
    patient_secrets: String,
    hospital_secrets: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let request: TransactionRequest = input::read_json(input.as_deref())?;

    let patient_keys: KeyDirectory = input::read_json(Some(patient_secrets.as_str()))?;
    let hospital_keys: KeyDirectory = input::read_json(Some(hospital_secrets.as_str()))?;

    let patient = secret_for(&patient_keys, ActorKind::Patient, request.patient_id.as_str())?;
    let hospital = secret_for(&hospital_keys, ActorKind::Hospital, request.hospital_id.as_str())?;

    let tx = request.sign(&patient, &hospital);
    println!("{}", serde_json::to_string(&tx)?);
    Ok(())
}

fn secret_for(
    keys: &KeyDirectory,
    kind: ActorKind,
    id: &str,
) -> Result<KeyPair, Box<dyn std::error::Error>> {
    let secret = keys.get(id).ok_or_else(|| CliError::NotRegistered {
        kind,
        id: id.to_string(),
    })?;
    KeyPair::from_secret_hex(secret)
        .map_err(|e| format!("Invalid secret key for {} '{}': {}", kind, id, e).into())
}
