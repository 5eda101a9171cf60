//! Bundle traversal, retrieval, and account history.

use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::{debug, warn};

use super::{found, Client};
use crate::config::{TransfersOptions, HASH_TRYTES, MAX_ADDRESS_RANGE};
use crate::crypto::generate_address;
use crate::error::{Error, Result};
use crate::network::{FindTransactionsQuery, NodeApi, NodeError};
use crate::ternary::validate_trytes;
use crate::transaction::{hash_trytes, validate_bundle, Bundle, Transaction};

impl<N: NodeApi> Client<N> {
    /// Reassemble a bundle by following trunk links from `trunk`.
    ///
    /// Without `bundle_hash`, `trunk` must be a tail transaction and its
    /// bundle hash is adopted. The walk stops when a transaction belongs to
    /// a different bundle, after a single-entry bundle, or once the entry
    /// with `currentIndex == lastIndex` has been collected. The result is not
    /// validated.
    ///
    /// At most `lastIndex + 1` entries (as declared by the first one) are
    /// collected, and every fetched record must hash to the hash it was
    /// requested by.
    ///
    /// # Errors
    ///
    /// - [`Error::TransactionNotFound`] when a link points nowhere.
    /// - [`Error::NotATailTransaction`] when starting mid-bundle without a
    ///   bundle hash.
    /// - [`NodeError::InvalidResponse`] when the node returns trytes that do
    ///   not match the requested hash.
    pub async fn traverse_bundle(&self, trunk: &str, bundle_hash: Option<&str>) -> Result<Bundle> {
        validate_trytes("transaction hash", trunk, Some(HASH_TRYTES))?;
        let mut expected = bundle_hash.map(str::to_string);
        let mut next = trunk.to_string();
        let mut transactions: Vec<Transaction> = Vec::new();

        loop {
            let raw = self.node.get_trytes(std::slice::from_ref(&next)).await?;
            let raw = found(&next, raw.into_iter().next().flatten())?;
            let actual = hash_trytes(&raw)?;
            if actual != next {
                return Err(NodeError::InvalidResponse(format!(
                    "trytes requested as {next} hash to {actual}"
                ))
                .into());
            }
            let tx = Transaction::from_trytes(&raw)?;

            match &expected {
                None => {
                    if !tx.is_tail() {
                        return Err(Error::NotATailTransaction { hash: next });
                    }
                    expected = Some(tx.bundle.clone());
                }
                Some(hash) if *hash != tx.bundle => break,
                Some(_) => {}
            }

            if tx.current_index == 0 && tx.last_index == 0 {
                transactions.push(tx);
                break;
            }

            let head_reached = tx.current_index == tx.last_index;
            let limit = transactions.first().map_or(tx.last_index, |t| t.last_index);
            next = tx.trunk_transaction.clone();
            transactions.push(tx);
            // Never collect more than the first entry's lastIndex allows.
            if head_reached || transactions.len() > limit {
                break;
            }
            debug!(hop = transactions.len(), next = %next, "following trunk");
        }

        Ok(Bundle::from_transactions(transactions))
    }

    /// Traverse from a tail and validate the result.
    pub async fn get_bundle(&self, tail: &str) -> Result<Bundle> {
        let bundle = self.traverse_bundle(tail, None).await?;
        validate_bundle(&bundle)?;
        Ok(bundle)
    }

    /// Every valid bundle touching the seed's addresses, oldest first.
    ///
    /// Addresses are scanned from `options.start` until the first unused one,
    /// or taken from the inclusive range `start..=end`. Transactions found on
    /// them lead to their bundles' tails; each tail's bundle is fetched and
    /// validated concurrently. Bundles that fail validation are skipped with
    /// a warning. The result is sorted by tail timestamp.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTransferSpec`] for a bad range; node and format errors
    /// otherwise.
    pub async fn get_transfers(&self, seed: &str, options: &TransfersOptions) -> Result<Vec<Bundle>> {
        let addresses = match options.end {
            Some(end) => {
                if options.start > end || end - options.start >= MAX_ADDRESS_RANGE {
                    return Err(Error::InvalidTransferSpec(format!(
                        "invalid address range {}..={end} (at most {MAX_ADDRESS_RANGE} addresses)",
                        options.start
                    )));
                }
                (options.start..=end)
                    .map(|index| generate_address(seed, index, options.security))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                self.scan_addresses(seed, options.start, options.security)
                    .await?
                    .0
            }
        };

        let hashes = self
            .node
            .find_transactions(&FindTransactionsQuery::addresses(addresses))
            .await?;
        let found_txs = self.fetch_with_hashes(&hashes).await?;

        let mut tails: HashSet<String> = HashSet::new();
        let mut other_bundles: HashSet<String> = HashSet::new();
        for (hash, tx) in found_txs {
            if tx.is_tail() {
                tails.insert(hash);
            } else {
                other_bundles.insert(tx.bundle);
            }
        }

        if !other_bundles.is_empty() {
            let bundle_hashes = self
                .node
                .find_transactions(&FindTransactionsQuery::bundles(other_bundles))
                .await?;
            for (hash, tx) in self.fetch_with_hashes(&bundle_hashes).await? {
                if tx.is_tail() {
                    tails.insert(hash);
                }
            }
        }

        let fetches = tails.into_iter().map(|tail| async move {
            match self.get_bundle(&tail).await {
                Ok(bundle) => Ok(Some(bundle)),
                Err(Error::Node(e)) => Err(Error::Node(e)),
                Err(e) => {
                    warn!(tail = %tail, error = %e, "skipping invalid bundle");
                    Ok(None)
                }
            }
        });
        let mut bundles: Vec<Bundle> = try_join_all(fetches).await?.into_iter().flatten().collect();
        bundles.sort_by_key(|b| b.tail().map(|t| t.timestamp).unwrap_or_default());

        debug!(bundles = bundles.len(), "transfer history assembled");
        Ok(bundles)
    }
}
