//! # Client
//!
//! The user-facing layer. A [`Client`] wraps any [`NodeApi`] and composes
//! the crypto and bundle primitives into whole operations: find a fresh
//! address, gather inputs, prepare and send a transfer, fetch and validate a
//! bundle, assemble an account's history.
//!
//! Every operation is a plain sequence of awaited node calls with `?`
//! between them. Shape checks (trytes, lengths, option ranges) happen before
//! the first node call; node errors come back unchanged.
//!
//! ## Layout
//!
//! ```text
//! mod.rs       — Client, transaction-object lookups
//! addresses.rs — get_new_address, get_inputs
//! transfers.rs — prepare / send / replay / broadcast, offline preparation
//! bundles.rs   — traverse_bundle, get_bundle, get_transfers
//! ```
//!
//! The seed passes through these methods by reference and is never stored or
//! logged.

pub mod addresses;
pub mod bundles;
pub mod transfers;

pub use transfers::{prepare_transfers_offline, select_inputs};

use crate::config::HASH_TRYTES;
use crate::error::{Error, Result};
use crate::network::{FindTransactionsQuery, NodeApi, NodeError};
use crate::ternary::validate_trytes;
use crate::transaction::Transaction;

/// A ledger client over a node implementation.
///
/// Cheap to construct; wrap the node in an `Arc` to share it.
#[derive(Debug, Clone)]
pub struct Client<N> {
    node: N,
}

impl<N: NodeApi> Client<N> {
    pub fn new(node: N) -> Self {
        Self { node }
    }

    /// The underlying node.
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Fetch and decode transactions by hash, in the given order.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] for a malformed hash (before any node call)
    ///   or undecodable trytes.
    /// - [`Error::TransactionNotFound`] for a hash the node doesn't know.
    pub async fn get_transactions_objects(&self, hashes: &[String]) -> Result<Vec<Transaction>> {
        Ok(self
            .fetch_with_hashes(hashes)
            .await?
            .into_iter()
            .map(|(_, tx)| tx)
            .collect())
    }

    /// Search the node, then fetch and decode every match.
    pub async fn find_transaction_objects(
        &self,
        query: &FindTransactionsQuery,
    ) -> Result<Vec<Transaction>> {
        let hashes = self.node.find_transactions(query).await?;
        self.get_transactions_objects(&hashes).await
    }

    /// Like [`get_transactions_objects`](Self::get_transactions_objects), but
    /// keeps each transaction paired with the hash it was fetched by.
    pub(crate) async fn fetch_with_hashes(
        &self,
        hashes: &[String],
    ) -> Result<Vec<(String, Transaction)>> {
        for hash in hashes {
            validate_trytes("transaction hash", hash, Some(HASH_TRYTES))?;
        }
        if hashes.is_empty() {
            return Ok(Vec::new());
        }

        let trytes = self.node.get_trytes(hashes).await?;
        if trytes.len() != hashes.len() {
            return Err(NodeError::InvalidResponse(format!(
                "asked for {} transactions, got {}",
                hashes.len(),
                trytes.len()
            ))
            .into());
        }

        hashes
            .iter()
            .zip(trytes)
            .map(|(hash, raw)| {
                let raw = found(hash, raw)?;
                Ok((hash.clone(), Transaction::from_trytes(&raw)?))
            })
            .collect()
    }
}

/// Unwrap a node lookup, treating both `None` and an all-`9` record (what
/// real nodes return for unknown hashes) as missing.
pub(crate) fn found(hash: &str, trytes: Option<String>) -> Result<String> {
    match trytes {
        Some(raw) if !raw.bytes().all(|b| b == b'9') => Ok(raw),
        _ => Err(Error::TransactionNotFound {
            hash: hash.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::MemoryNode;
    use crate::transaction::BundleBuilder;
    use std::sync::Arc;

    #[tokio::test]
    async fn objects_keep_request_order_and_report_missing() {
        let node = Arc::new(MemoryNode::new());
        let mut builder = BundleBuilder::new();
        builder.add_entry(2, &"C".repeat(81), 0, "", 1_700_000_000).unwrap();
        let trytes = builder.finalize(&[]).unwrap().to_trytes().unwrap();
        node.submit_transactions(&trytes).await.unwrap();

        let client = Client::new(node.clone());
        let mut hashes = client
            .node()
            .find_transactions(&FindTransactionsQuery::addresses(["C".repeat(81)]))
            .await
            .unwrap();
        hashes.reverse();

        let objects = client.get_transactions_objects(&hashes).await.unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].hash().unwrap(), hashes[0]);

        let missing = client.get_transactions_objects(&["A".repeat(81)]).await;
        assert!(matches!(missing, Err(Error::TransactionNotFound { .. })));
    }

    #[tokio::test]
    async fn malformed_hash_fails_before_the_node() {
        let node = Arc::new(MemoryNode::new());
        node.set_offline(true);
        let client = Client::new(node);
        let result = client.get_transactions_objects(&["short".to_string()]).await;
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn all_nines_is_missing() {
        assert!(found("X", Some("9".repeat(2673))).is_err());
        assert!(found("X", None).is_err());
        assert!(found("X", Some("A".into())).is_ok());
    }
}
