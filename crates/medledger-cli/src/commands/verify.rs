//! Verify command implementation.

use crate::input;
use crate::output;
use medledger_ledger::{verify_chain, Block};
use serde_json::json;

pub fn run(chain: String, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let blocks: Vec<Block> = input::read_json(Some(chain.as_str()))?;
    let result = verify_chain(&blocks);

    if json_output {
        let summaries: Vec<_> = blocks.iter().map(output::block_summary).collect();
        let report = json!({
            "blocks": summaries,
            "height": blocks.len(),
            "ok": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_table_header();
        for block in &blocks {
            println!("{}", output::format_table_row(block));
        }
        println!();
        match &result {
            Ok(()) => println!("VERDICT: ok ({} blocks)", blocks.len()),
            Err(e) => println!("VERDICT: broken ({})", e),
        }
    }

    result.map_err(|e| format!("Chain verification failed: {}", e).into())
}
