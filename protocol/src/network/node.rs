//! The node collaborator interface.
//!
//! The client never talks to a transport directly. Everything it needs from
//! a ledger node goes through [`NodeApi`]: fetching trytes, searching,
//! balances, tip selection, attaching, and submitting. A real HTTP adapter
//! and the in-memory [`super::MemoryNode`] are interchangeable behind it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The node could not be reached or is not serving requests.
    #[error("node unavailable: {0}")]
    Unavailable(String),

    /// The node understood the request and refused it.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The node answered with something the client cannot use.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Search filters for [`NodeApi::find_transactions`].
///
/// Values within one filter are alternatives; non-empty filters must all
/// match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindTransactionsQuery {
    pub addresses: Vec<String>,
    pub bundles: Vec<String>,
    pub tags: Vec<String>,
    pub approvees: Vec<String>,
}

impl FindTransactionsQuery {
    pub fn addresses(addresses: impl IntoIterator<Item = String>) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn bundles(bundles: impl IntoIterator<Item = String>) -> Self {
        Self {
            bundles: bundles.into_iter().collect(),
            ..Self::default()
        }
    }

    /// `true` when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
            && self.bundles.is_empty()
            && self.tags.is_empty()
            && self.approvees.is_empty()
    }
}

/// Two transactions for a new bundle to approve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tips {
    pub trunk_transaction: String,
    pub branch_transaction: String,
}

/// Everything the client needs from a ledger node.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Raw trytes for each hash, `None` where the node has nothing.
    async fn get_trytes(&self, hashes: &[String]) -> Result<Vec<Option<String>>, NodeError>;

    /// Hashes of transactions matching the query.
    async fn find_transactions(
        &self,
        query: &FindTransactionsQuery,
    ) -> Result<Vec<String>, NodeError>;

    /// Confirmed balance per address, in the same order.
    async fn get_balances(&self, addresses: &[String], threshold: u8)
        -> Result<Vec<i64>, NodeError>;

    /// Tips to approve, selected at `depth`.
    async fn get_transactions_to_approve(&self, depth: usize) -> Result<Tips, NodeError>;

    /// Chain `trytes` (head first) onto `trunk`/`branch` and return the
    /// attached trytes in the same order.
    async fn attach_to_tangle(
        &self,
        trunk: &str,
        branch: &str,
        min_weight_magnitude: u8,
        trytes: &[String],
    ) -> Result<Vec<String>, NodeError>;

    /// Store and broadcast attached trytes.
    async fn submit_transactions(&self, trytes: &[String]) -> Result<(), NodeError>;
}

#[async_trait]
impl<T: NodeApi + ?Sized> NodeApi for Arc<T> {
    async fn get_trytes(&self, hashes: &[String]) -> Result<Vec<Option<String>>, NodeError> {
        (**self).get_trytes(hashes).await
    }

    async fn find_transactions(
        &self,
        query: &FindTransactionsQuery,
    ) -> Result<Vec<String>, NodeError> {
        (**self).find_transactions(query).await
    }

    async fn get_balances(
        &self,
        addresses: &[String],
        threshold: u8,
    ) -> Result<Vec<i64>, NodeError> {
        (**self).get_balances(addresses, threshold).await
    }

    async fn get_transactions_to_approve(&self, depth: usize) -> Result<Tips, NodeError> {
        (**self).get_transactions_to_approve(depth).await
    }

    async fn attach_to_tangle(
        &self,
        trunk: &str,
        branch: &str,
        min_weight_magnitude: u8,
        trytes: &[String],
    ) -> Result<Vec<String>, NodeError> {
        (**self)
            .attach_to_tangle(trunk, branch, min_weight_magnitude, trytes)
            .await
    }

    async fn submit_transactions(&self, trytes: &[String]) -> Result<(), NodeError> {
        (**self).submit_transactions(trytes).await
    }
}
