use medledger_canonical::ActorId;
use medledger_core::{
    ActorKind, InMemoryKeyRegistry, KeyPair, Signature, Transaction, TransactionAuthorizer,
    TransactionRequest,
};
use medledger_ledger::{verify_chain, Block, BlockData, Ledger, LedgerError};
use serde_json::json;

const CHAIN_LEN: usize = 8;

fn build_chain() -> Vec<Block> {
    build_chain_with_authorizer().0
}

fn build_chain_with_authorizer() -> (Vec<Block>, TransactionAuthorizer<InMemoryKeyRegistry>) {
    let registry = InMemoryKeyRegistry::new();
    let patient = KeyPair::generate();
    let hospital = KeyPair::generate();
    registry.register(ActorKind::Patient, ActorId::from("p1"), patient.public_key());
    registry.register(ActorKind::Hospital, ActorId::from("h1"), hospital.public_key());
    let authorizer = TransactionAuthorizer::new(registry);

    let ledger = Ledger::initialize();
    for i in 1..CHAIN_LEN {
        let tx = TransactionRequest::new("p1", "h1", json!({"entry": i})).sign(&patient, &hospital);
        ledger.admit(&authorizer, tx).unwrap();
    }
    let blocks = ledger.blocks();
    assert_eq!(blocks.len(), CHAIN_LEN);
    (blocks, authorizer)
}

fn with_payload(block: &Block, payload: serde_json::Value) -> BlockData {
    let tx = block.transaction().unwrap();
    BlockData::Transaction(Transaction::new(
        tx.patient_id().clone(),
        tx.hospital_id().clone(),
        payload,
        tx.patient_signature().clone(),
        tx.hospital_signature().clone(),
    ))
}

/// Asserts that every prefix ending before `first_bad` verifies and every
/// prefix reaching it fails at exactly that link.
fn assert_broken_from(blocks: &[Block], first_bad: u64) {
    for end in 1..=blocks.len() {
        let result = verify_chain(&blocks[..end]);
        if (end as u64) < first_bad {
            assert!(result.is_ok(), "prefix of {} should verify", end);
        } else {
            match result {
                Err(LedgerError::IntegrityViolation { index, .. }) => assert_eq!(index, first_bad),
                other => panic!("prefix of {} should fail at {}: {:?}", end, first_bad, other),
            }
        }
    }
}

#[test]
fn test_corrupted_payload_breaks_every_later_prefix() {
    for target in 2..=CHAIN_LEN {
        let mut blocks = build_chain();
        let pos = target - 1;
        blocks[pos].data = with_payload(&blocks[pos], json!({"entry": "forged"}));

        if target == CHAIN_LEN {
            // Nothing links to the tip, so the tampering is invisible to linkage.
            assert!(verify_chain(&blocks).is_ok());
        } else {
            assert_broken_from(&blocks, target as u64 + 1);
        }
    }
}

#[test]
fn test_corrupted_signature_bytes_break_the_next_link() {
    let mut blocks = build_chain();
    let tx = blocks[2].transaction().unwrap().clone();
    let mut sig = tx.patient_signature().as_bytes().to_vec();
    sig[0] ^= 0xff;
    blocks[2].data = BlockData::Transaction(Transaction::new(
        tx.patient_id().clone(),
        tx.hospital_id().clone(),
        tx.payload().clone(),
        Signature::from_bytes(sig),
        tx.hospital_signature().clone(),
    ));

    assert_broken_from(&blocks, 4);
}

#[test]
fn test_corrupted_timestamp_breaks_the_next_link() {
    let mut blocks = build_chain();
    blocks[1].timestamp += 1.0;
    assert_broken_from(&blocks, 3);
}

#[test]
fn test_corrupted_genesis_timestamp_breaks_first_link() {
    let mut blocks = build_chain();
    blocks[0].timestamp -= 10.0;
    assert_broken_from(&blocks, 2);
}

#[test]
fn test_rewritten_previous_hash_is_detected() {
    let mut blocks = build_chain();
    blocks[4].previous_hash = "0".repeat(64);

    assert_eq!(
        verify_chain(&blocks).unwrap_err(),
        LedgerError::IntegrityViolation {
            index: 5,
            expected: blocks[3].hash().to_string(),
            found: "0".repeat(64),
        }
    );
}

#[test]
fn test_malformed_previous_hash_is_reported() {
    let mut blocks = build_chain();
    blocks[2].previous_hash = "tampered".to_string();
    assert_eq!(
        verify_chain(&blocks).unwrap_err(),
        LedgerError::MalformedPreviousHash {
            index: 3,
            value: "tampered".to_string(),
        }
    );

    let mut blocks = build_chain();
    blocks[2].previous_hash = blocks[2].previous_hash.to_uppercase();
    assert!(matches!(
        verify_chain(&blocks),
        Err(LedgerError::MalformedPreviousHash { index: 3, .. })
    ));
}

#[test]
fn test_reordered_blocks_are_detected() {
    let mut blocks = build_chain();
    blocks.swap(3, 4);
    assert_eq!(
        verify_chain(&blocks).unwrap_err(),
        LedgerError::IndexGap {
            expected: 4,
            found: 5
        }
    );
}

#[test]
fn test_dropped_block_is_detected() {
    let mut blocks = build_chain();
    blocks.remove(2);
    assert_eq!(
        verify_chain(&blocks).unwrap_err(),
        LedgerError::IndexGap {
            expected: 3,
            found: 4
        }
    );
}

#[test]
fn test_malformed_genesis_is_detected() {
    let mut blocks = build_chain();
    blocks[0].previous_hash = "1".to_string();
    assert!(matches!(verify_chain(&blocks), Err(LedgerError::Genesis(_))));

    let mut blocks = build_chain();
    blocks[0].data = blocks[1].data.clone();
    assert!(matches!(verify_chain(&blocks), Err(LedgerError::Genesis(_))));

    let mut blocks = build_chain();
    blocks.remove(0);
    assert!(matches!(verify_chain(&blocks), Err(LedgerError::Genesis(_))));
}

#[test]
fn test_emptied_block_after_genesis_is_detected() {
    let mut blocks = build_chain();
    blocks[3].data = BlockData::Genesis;
    assert_eq!(
        verify_chain(&blocks).unwrap_err(),
        LedgerError::UnexpectedGenesis { index: 4 }
    );
}

#[test]
fn test_tampered_export_is_refused_on_restore() {
    let (blocks, authorizer) = build_chain_with_authorizer();
    let mut exported = serde_json::to_value(&blocks).unwrap();
    exported[2]["data"]["payload"] = json!({"entry": "rewritten"});
    let tampered: Vec<Block> = serde_json::from_value(exported).unwrap();

    assert!(matches!(
        Ledger::from_blocks(&authorizer, tampered),
        Err(LedgerError::IntegrityViolation { index: 4, .. })
    ));
    assert!(Ledger::from_blocks(&authorizer, blocks).is_ok());
}
