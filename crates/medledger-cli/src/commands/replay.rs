//! Replay command implementation.

use crate::input::{self, KeyDirectory};
use crate::output;
use medledger_core::{ActorKind, InMemoryKeyRegistry, Transaction, TransactionAuthorizer};
use medledger_ledger::Ledger;
use serde_json::json;

/// Outcome of one input line.
enum Outcome {
    Admitted(u64),
    Rejected(String),
}

pub fn run(
    source: String,
    patients: String,
    hospitals: String,
    export: Option<String>,
    json_output: bool,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = InMemoryKeyRegistry::new();
    let patient_keys: KeyDirectory = input::read_json(Some(patients.as_str()))?;
    let hospital_keys: KeyDirectory = input::read_json(Some(hospitals.as_str()))?;
    registry
        .load_directory(ActorKind::Patient, patient_keys)
        .map_err(|e| format!("Failed to load {}: {}", patients, e))?;
    registry
        .load_directory(ActorKind::Hospital, hospital_keys)
        .map_err(|e| format!("Failed to load {}: {}", hospitals, e))?;

    let authorizer = TransactionAuthorizer::new(registry);
    let ledger = Ledger::initialize();

    let text = input::read_source(Some(source.as_str()))?;
    let mut results = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let outcome = match serde_json::from_str::<Transaction>(line) {
            Ok(tx) => match ledger.admit(&authorizer, tx) {
                Ok(block) => Outcome::Admitted(block.index),
                Err(e) => Outcome::Rejected(e.to_string()),
            },
            Err(e) => Outcome::Rejected(format!("invalid JSON: {}", e)),
        };
        results.push((n + 1, outcome));
    }

    let rejected = results
        .iter()
        .filter(|(_, outcome)| matches!(outcome, Outcome::Rejected(_)))
        .count();
    let admitted = results.len() - rejected;
    let intact = ledger.verify_integrity();

    if json_output {
        let lines: Vec<_> = results
            .iter()
            .map(|(line, outcome)| match outcome {
                Outcome::Admitted(index) => {
                    json!({"line": line, "status": "admitted", "index": index})
                }
                Outcome::Rejected(reason) => {
                    json!({"line": line, "status": "rejected", "error": reason})
                }
            })
            .collect();
        let report = json!({
            "results": lines,
            "admitted": admitted,
            "rejected": rejected,
            "height": ledger.height(),
            "tip": ledger.tip().hash().to_string(),
            "integrity": intact,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:<6} {:<10} {}", "LINE", "STATUS", "DETAIL");
        println!("{}", "-".repeat(70));
        for (line, outcome) in &results {
            match outcome {
                Outcome::Admitted(index) => {
                    println!("{:<6} {:<10} block {}", line, "admitted", index)
                }
                Outcome::Rejected(reason) => {
                    println!("{:<6} {:<10} {}", line, "rejected", output::truncate(reason, 52))
                }
            }
        }
        println!();
        println!(
            "admitted: {}  rejected: {}  height: {}  integrity: {}",
            admitted,
            rejected,
            ledger.height(),
            if intact { "ok" } else { "BROKEN" }
        );
    }

    if let Some(path) = export {
        input::write_json(&path, &ledger.blocks())?;
        tracing::info!(path = %path, height = ledger.height(), "chain exported");
    }

    if strict && rejected > 0 {
        std::process::exit(1);
    }

    Ok(())
}
