//! Canonicalize command implementation.

use crate::input;
use medledger_canonical::Digest;
use medledger_core::TransactionRequest;

pub fn run(input: Option<String>, digest: bool) -> Result<(), Box<dyn std::error::Error>> {
    let request: TransactionRequest = input::read_json(input.as_deref())?;
    let message = request.canonical_message();

    if digest {
        println!("{}", Digest::of(&message));
    } else {
        println!("{}", hex::encode(&message));
    }
    Ok(())
}
