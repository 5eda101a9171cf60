//! Crate-wide error type.
//!
//! One variant per failure kind a caller might want to branch on. Codec and
//! shape problems surface as [`Error::InvalidFormat`] before any node is
//! contacted; node failures pass through unchanged as [`Error::Node`].
//! Nothing in the library retries.

use thiserror::Error;

use crate::network::NodeError;
use crate::ternary::TernaryError;

/// Errors returned by bundle construction, validation, and the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed trytes, trits, lengths, or integers.
    #[error("invalid format: {0}")]
    InvalidFormat(#[from] TernaryError),

    /// A transfer, input, or option that can never produce a valid bundle.
    #[error("invalid transfer: {0}")]
    InvalidTransferSpec(String),

    /// The selected inputs cannot cover the requested outputs.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },

    /// Bundle values do not sum to zero.
    #[error("bundle values do not sum to zero")]
    InvalidBundleSum,

    /// An entry's `currentIndex` does not match its position.
    #[error("bundle entry at position {position} has current index {current_index}")]
    InvalidBundleOrder { position: usize, current_index: usize },

    /// The recomputed essence hash differs from the recorded bundle hash.
    #[error("bundle hash mismatch: expected {expected}, computed {computed}")]
    InvalidBundleHash { expected: String, computed: String },

    /// The bundle is empty or its last entry is not the head.
    #[error("bundle is incomplete")]
    IncompleteBundle,

    /// A signature does not verify against its input address.
    #[error("invalid signature for input address {address}")]
    InvalidSignature { address: String },

    /// Traversal started from a transaction that is not `currentIndex == 0`.
    #[error("transaction {hash} is not a tail transaction")]
    NotATailTransaction { hash: String },

    /// The node has no trytes for a referenced transaction.
    #[error("transaction {hash} not found")]
    TransactionNotFound { hash: String },

    /// An input address has already been spent from. Signing again would
    /// reuse a one-time key.
    #[error("address {address} has already been spent from")]
    SpentAddress { address: String },

    /// The node collaborator failed.
    #[error("node error: {0}")]
    Node(#[from] NodeError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
