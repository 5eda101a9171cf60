//! End-to-end integration tests for the TRINARY client.
//!
//! These tests drive the whole stack against the in-memory node: address
//! derivation, input discovery, bundle building and signing, attaching and
//! submitting, traversal, validation, replay, and history. They prove the
//! pieces compose, not just that each one works alone.
//!
//! Each test builds its own node. No shared state, no ordering dependencies.

use std::sync::Arc;

use trinary_protocol::config::{SendOptions, TransferOptions, TransfersOptions};
use trinary_protocol::crypto::{generate_address, SecurityLevel};
use trinary_protocol::network::{MemoryNode, NodeApi, NodeError};
use trinary_protocol::transaction::{validate_bundle, Input, Transaction, Transfer};
use trinary_protocol::{Client, Error};

const SEED: &str =
    "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Level-2 address at key index 0 of `SEED`.
const INPUT_0: &str =
    "JEUFD9BHVP9SV9JHZURXTZF9YXFOPABAHVRXTTYRMP9KZIABVMPFFDIJPYFWKYNMQBYITQZCMTYNHAZX9";

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn setup() -> (Arc<MemoryNode>, Client<Arc<MemoryNode>>) {
    let node = Arc::new(MemoryNode::new());
    let client = Client::new(Arc::clone(&node));
    (node, client)
}

fn two_outputs() -> Vec<Transfer> {
    vec![
        Transfer::new("B".repeat(81), 60).with_tag("ALPHA"),
        Transfer::new("C".repeat(81), 40).with_tag("BETA"),
    ]
}

fn tail_hash(sent: &[Transaction]) -> String {
    sent.last().expect("sent bundle is empty").hash().expect("hashable")
}

// ---------------------------------------------------------------------------
// Full Lifecycle
// ---------------------------------------------------------------------------

/// Two outputs funded exactly by one level-2 input: four entries, no
/// remainder, and the bundle reads back valid.
#[tokio::test]
async fn two_outputs_one_input_round_trip() {
    let (node, client) = setup();
    node.set_balance(INPUT_0, 100);

    let trytes = client
        .prepare_transfers(SEED, &two_outputs(), &TransferOptions::default())
        .await
        .unwrap();
    assert_eq!(trytes.len(), 4);

    let sent = client.send_trytes(&trytes, &SendOptions::default()).await.unwrap();
    assert_eq!(node.len(), 4);
    assert!(sent.last().unwrap().is_tail());

    let bundle = client.get_bundle(&tail_hash(&sent)).await.unwrap();
    let txs = bundle.transactions();
    assert_eq!(txs.iter().map(|t| t.value).collect::<Vec<_>>(), vec![60, 40, -100, 0]);
    assert_eq!(txs.iter().map(|t| t.current_index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(txs[2].address, INPUT_0);
    assert_eq!(txs[3].address, INPUT_0);
    assert!(txs.iter().all(|t| t.last_index == 3 && t.bundle == bundle.hash()));
}

/// Excess input balance goes to a derived remainder address, the first
/// unused one after the input's key index.
#[tokio::test]
async fn remainder_entry_is_added() {
    let (node, client) = setup();
    node.set_balance(INPUT_0, 150);

    let sent = client
        .send_transfer(
            SEED,
            &two_outputs(),
            &TransferOptions::default(),
            &SendOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(sent.len(), 5);

    let bundle = client.get_bundle(&tail_hash(&sent)).await.unwrap();
    let txs = bundle.transactions();
    assert_eq!(
        txs.iter().map(|t| t.value).collect::<Vec<_>>(),
        vec![60, 40, -150, 0, 50]
    );
    let remainder = generate_address(SEED, 1, SecurityLevel::Medium).unwrap();
    assert_eq!(txs[4].address, remainder);
}

/// Explicit inputs and remainder address are honored; balances come from
/// the node, not the caller.
#[tokio::test]
async fn explicit_inputs_use_node_balances() {
    let (node, client) = setup();
    node.set_balance(INPUT_0, 120);

    let options = TransferOptions {
        // The stated balance is wrong on purpose.
        inputs: Some(vec![Input::new(INPUT_0, 999, 0, SecurityLevel::Medium)]),
        remainder_address: Some("R".repeat(81)),
        security: SecurityLevel::Medium,
    };
    let trytes = client
        .prepare_transfers(SEED, &two_outputs(), &options)
        .await
        .unwrap();
    assert_eq!(trytes.len(), 5);

    let remainder = Transaction::from_trytes(&trytes[0]).unwrap();
    assert_eq!(remainder.value, 20);
    assert_eq!(remainder.address, "R".repeat(81));
}

#[tokio::test]
async fn value_free_message_needs_no_inputs() {
    let (node, client) = setup();
    let transfers = [Transfer::new("D".repeat(81), 0)
        .with_message(trinary_protocol::ternary::str_to_trytes("hello, ternary"))];

    let sent = client
        .send_transfer(SEED, &transfers, &TransferOptions::default(), &SendOptions::default())
        .await
        .unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(node.len(), 1);
    assert!(client.get_bundle(&tail_hash(&sent)).await.is_ok());
}

// ---------------------------------------------------------------------------
// Failure Paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insufficient_balance_reported() {
    let (node, client) = setup();
    node.set_balance(INPUT_0, 99);

    let result = client
        .prepare_transfers(SEED, &two_outputs(), &TransferOptions::default())
        .await;
    assert_eq!(
        result,
        Err(Error::InsufficientBalance { required: 100, available: 99 })
    );
    assert!(node.is_empty());
}

/// After one spend from an address, a second one is refused, whether the
/// input is given explicitly or discovered.
#[tokio::test]
async fn spent_address_is_refused() {
    let (node, client) = setup();
    node.set_balance(INPUT_0, 100);
    client
        .send_transfer(SEED, &two_outputs(), &TransferOptions::default(), &SendOptions::default())
        .await
        .unwrap();

    // The ledger "forgets" the spend but the transaction is still there.
    node.set_balance(INPUT_0, 100);

    let explicit = TransferOptions {
        inputs: Some(vec![Input::new(INPUT_0, 100, 0, SecurityLevel::Medium)]),
        ..TransferOptions::default()
    };
    let result = client.prepare_transfers(SEED, &two_outputs(), &explicit).await;
    assert_eq!(result, Err(Error::SpentAddress { address: INPUT_0.to_string() }));

    let discovered = client
        .prepare_transfers(SEED, &two_outputs(), &TransferOptions::default())
        .await;
    assert!(matches!(discovered, Err(Error::SpentAddress { .. })));
}

#[tokio::test]
async fn shape_errors_precede_node_errors() {
    let (node, client) = setup();
    node.set_offline(true);

    let bad = [Transfer::new("not an address", 1)];
    let result = client
        .prepare_transfers(SEED, &bad, &TransferOptions::default())
        .await;
    assert!(matches!(result, Err(Error::InvalidTransferSpec(_))));

    let result = client
        .prepare_transfers(SEED, &two_outputs(), &TransferOptions::default())
        .await;
    assert!(matches!(result, Err(Error::Node(NodeError::Unavailable(_)))));
}

#[tokio::test]
async fn tampered_bundle_on_node_fails_validation() {
    let (node, client) = setup();
    node.set_balance(INPUT_0, 100);
    let mut trytes = client
        .prepare_transfers(SEED, &two_outputs(), &TransferOptions::default())
        .await
        .unwrap();

    // Redirect the first output (index 0 is the tail, last in the list).
    let mut tail = Transaction::from_trytes(trytes.last().unwrap()).unwrap();
    tail.address = "E".repeat(81);
    *trytes.last_mut().unwrap() = tail.to_trytes().unwrap();

    let sent = client.send_trytes(&trytes, &SendOptions::default()).await.unwrap();
    let result = client.get_bundle(&tail_hash(&sent)).await;
    assert!(matches!(result, Err(Error::InvalidBundleHash { .. })));
}

// ---------------------------------------------------------------------------
// Replay, Broadcast, History
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replay_reattaches_the_same_bundle() {
    let (node, client) = setup();
    node.set_balance(INPUT_0, 100);
    let sent = client
        .send_transfer(SEED, &two_outputs(), &TransferOptions::default(), &SendOptions::default())
        .await
        .unwrap();
    let original_tail = tail_hash(&sent);

    let replayed = client
        .replay_transfer(&original_tail, &SendOptions::default())
        .await
        .unwrap();
    let replayed_tail = tail_hash(&replayed);
    assert_ne!(replayed_tail, original_tail);
    assert_eq!(node.len(), 8);

    let a = client.get_bundle(&original_tail).await.unwrap();
    let b = client.get_bundle(&replayed_tail).await.unwrap();
    assert_eq!(a.hash(), b.hash());

    client.broadcast_bundle(&replayed_tail).await.unwrap();
    assert_eq!(node.len(), 8);
}

#[tokio::test]
async fn history_finds_sent_bundle() {
    let (node, client) = setup();
    node.set_balance(INPUT_0, 100);
    let sent = client
        .send_transfer(SEED, &two_outputs(), &TransferOptions::default(), &SendOptions::default())
        .await
        .unwrap();

    let history = client
        .get_transfers(SEED, &TransfersOptions::default())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].hash(), sent[0].bundle);
    assert!(validate_bundle(&history[0]).is_ok());
}

#[tokio::test]
async fn next_address_skips_spent_one() {
    let (node, client) = setup();
    node.set_balance(INPUT_0, 100);
    client
        .send_transfer(SEED, &two_outputs(), &TransferOptions::default(), &SendOptions::default())
        .await
        .unwrap();

    let fresh = client
        .get_new_address(SEED, &Default::default())
        .await
        .unwrap();
    assert_eq!(fresh, vec![generate_address(SEED, 1, SecurityLevel::Medium).unwrap()]);
    assert_eq!(
        node.get_balances(&fresh, 100).await.unwrap(),
        vec![0],
        "fresh address should hold nothing"
    );
}
