//! An in-process ledger node.
//!
//! [`MemoryNode`] implements [`NodeApi`] over a few maps behind a
//! `parking_lot::RwLock`. It is what the integration tests and offline
//! tooling run against. It stores trytes by hash, reports balances the
//! caller sets, picks tips from what it has stored, and attaches bundles by
//! linking trunk/branch and stamping attachment timestamps. It never does
//! proof-of-work; the minimum weight magnitude is checked and ignored.
//!
//! Lock scope is always a single call. Nothing holds the lock across an
//! `.await`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use super::node::{FindTransactionsQuery, NodeApi, NodeError, Tips};
use crate::config::{HASH_TRYTES, HASH_LENGTH, TAG_TRYTES};
use crate::transaction::builder::pad_trytes;
use crate::transaction::{hash_trytes, Transaction};

/// Upper bound for the attachment timestamp field: the largest 27-trit value.
const MAX_ATTACHMENT_TIMESTAMP: i64 = 3_812_798_742_493;

#[derive(Debug, Default)]
struct Ledger {
    /// hash → trytes
    transactions: HashMap<String, String>,
    /// Hashes in arrival order; tip selection walks this.
    arrival: Vec<String>,
    balances: HashMap<String, i64>,
    offline: bool,
}

/// A [`NodeApi`] backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryNode {
    ledger: RwLock<Ledger>,
}

impl MemoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confirmed balance reported for `address` (checksum optional).
    pub fn set_balance(&self, address: &str, balance: i64) {
        self.ledger
            .write()
            .balances
            .insert(bare_address(address), balance);
    }

    /// Simulate an unreachable node. Every call fails with
    /// [`NodeError::Unavailable`] while set.
    pub fn set_offline(&self, offline: bool) {
        self.ledger.write().offline = offline;
    }

    /// Number of stored transactions.
    pub fn len(&self) -> usize {
        self.ledger.read().transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.ledger.read().transactions.contains_key(hash)
    }

    fn check_online(&self) -> Result<(), NodeError> {
        if self.ledger.read().offline {
            return Err(NodeError::Unavailable("memory node is offline".to_string()));
        }
        Ok(())
    }
}

fn bare_address(address: &str) -> String {
    address.chars().take(HASH_TRYTES).collect()
}

fn parse(trytes: &str) -> Result<Transaction, NodeError> {
    Transaction::from_trytes(trytes).map_err(|e| NodeError::Rejected(e.to_string()))
}

fn matches_query(tx: &Transaction, query: &FindTransactionsQuery) -> bool {
    let addresses = query.addresses.is_empty()
        || query.addresses.iter().any(|a| bare_address(a) == tx.address);
    let bundles = query.bundles.is_empty() || query.bundles.iter().any(|b| *b == tx.bundle);
    let tags = query.tags.is_empty()
        || query.tags.iter().any(|t| pad_trytes(t, TAG_TRYTES) == tx.tag);
    let approvees = query.approvees.is_empty()
        || query
            .approvees
            .iter()
            .any(|h| *h == tx.trunk_transaction || *h == tx.branch_transaction);
    addresses && bundles && tags && approvees
}

#[async_trait]
impl NodeApi for MemoryNode {
    async fn get_trytes(&self, hashes: &[String]) -> Result<Vec<Option<String>>, NodeError> {
        self.check_online()?;
        let ledger = self.ledger.read();
        Ok(hashes
            .iter()
            .map(|h| ledger.transactions.get(h).cloned())
            .collect())
    }

    async fn find_transactions(
        &self,
        query: &FindTransactionsQuery,
    ) -> Result<Vec<String>, NodeError> {
        self.check_online()?;
        if query.is_empty() {
            return Err(NodeError::Rejected(
                "find_transactions needs at least one filter".to_string(),
            ));
        }

        let ledger = self.ledger.read();
        let mut found = Vec::new();
        for hash in &ledger.arrival {
            let Some(trytes) = ledger.transactions.get(hash) else {
                continue;
            };
            if matches_query(&parse(trytes)?, query) {
                found.push(hash.clone());
            }
        }
        Ok(found)
    }

    async fn get_balances(
        &self,
        addresses: &[String],
        threshold: u8,
    ) -> Result<Vec<i64>, NodeError> {
        self.check_online()?;
        if threshold > 100 {
            return Err(NodeError::Rejected(format!(
                "threshold must be a percentage, got {threshold}"
            )));
        }
        let ledger = self.ledger.read();
        Ok(addresses
            .iter()
            .map(|a| ledger.balances.get(&bare_address(a)).copied().unwrap_or(0))
            .collect())
    }

    async fn get_transactions_to_approve(&self, depth: usize) -> Result<Tips, NodeError> {
        self.check_online()?;
        if depth == 0 {
            return Err(NodeError::Rejected("depth must be at least 1".to_string()));
        }

        let ledger = self.ledger.read();
        let genesis = "9".repeat(HASH_TRYTES);
        let tips = match ledger.arrival.len() {
            0 => Tips {
                trunk_transaction: genesis.clone(),
                branch_transaction: genesis,
            },
            n => Tips {
                trunk_transaction: ledger.arrival[n - 1].clone(),
                // `depth` transactions back from the newest, clamped to the oldest.
                branch_transaction: ledger.arrival[n - 1 - depth.min(n - 1)].clone(),
            },
        };
        Ok(tips)
    }

    async fn attach_to_tangle(
        &self,
        trunk: &str,
        branch: &str,
        min_weight_magnitude: u8,
        trytes: &[String],
    ) -> Result<Vec<String>, NodeError> {
        self.check_online()?;
        if usize::from(min_weight_magnitude) > HASH_LENGTH {
            return Err(NodeError::Rejected(format!(
                "min weight magnitude {min_weight_magnitude} exceeds {HASH_LENGTH}"
            )));
        }

        let mut attached = Vec::with_capacity(trytes.len());
        let mut previous: Option<String> = None;
        for raw in trytes {
            let mut tx = parse(raw)?;
            match &previous {
                None => {
                    tx.trunk_transaction = trunk.to_string();
                    tx.branch_transaction = branch.to_string();
                }
                Some(hash) => {
                    tx.trunk_transaction = hash.clone();
                    tx.branch_transaction = trunk.to_string();
                }
            }
            tx.attachment_timestamp = Utc::now().timestamp_millis();
            tx.attachment_timestamp_lower_bound = 0;
            tx.attachment_timestamp_upper_bound = MAX_ATTACHMENT_TIMESTAMP;

            let out = tx
                .to_trytes()
                .map_err(|e| NodeError::Rejected(e.to_string()))?;
            previous = Some(hash_trytes(&out).map_err(|e| NodeError::Rejected(e.to_string()))?);
            attached.push(out);
        }
        debug!(count = attached.len(), "attached transactions");
        Ok(attached)
    }

    async fn submit_transactions(&self, trytes: &[String]) -> Result<(), NodeError> {
        self.check_online()?;

        // Parse and hash everything before taking the write lock.
        let mut hashed = Vec::with_capacity(trytes.len());
        for raw in trytes {
            parse(raw)?;
            let hash = hash_trytes(raw).map_err(|e| NodeError::Rejected(e.to_string()))?;
            hashed.push((hash, raw.clone()));
        }

        let mut ledger = self.ledger.write();
        for (hash, raw) in hashed {
            if ledger.transactions.insert(hash.clone(), raw).is_none() {
                ledger.arrival.push(hash);
            }
        }
        debug!(count = trytes.len(), stored = ledger.transactions.len(), "stored transactions");
        Ok(())
    }
}
