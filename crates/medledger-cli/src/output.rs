//! Output formatting utilities.

use chrono::DateTime;
use medledger_ledger::Block;
use serde_json::{json, Value};

/// Formats a block as a JSON summary.
pub fn block_summary(block: &Block) -> Value {
    let (patient, hospital) = parties(block);
    json!({
        "index": block.index,
        "timestamp": block.timestamp,
        "patient_id": patient,
        "hospital_id": hospital,
        "previous_hash": block.previous_hash,
        "hash": block.hash().to_string(),
    })
}

/// Formats a block as a simple table row.
pub fn format_table_row(block: &Block) -> String {
    let (patient, hospital) = parties(block);
    format!(
        "{:<6} {:<26} {:<12} {:<12} {}",
        block.index,
        format_timestamp(block.timestamp),
        truncate(patient, 12),
        truncate(hospital, 12),
        truncate(block.hash().as_str(), 20)
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!(
        "{:<6} {:<26} {:<12} {:<12} {}",
        "INDEX", "TIMESTAMP", "PATIENT", "HOSPITAL", "HASH"
    );
    println!("{}", "-".repeat(80));
}

/// Renders seconds since the epoch as RFC 3339, falling back to the raw number.
pub fn format_timestamp(timestamp: f64) -> String {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn parties(block: &Block) -> (&str, &str) {
    match block.transaction() {
        Some(tx) => (tx.patient_id().as_str(), tx.hospital_id().as_str()),
        None => ("-", "-"),
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
