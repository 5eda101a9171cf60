//! Value types for describing what a bundle should do.
//!
//! A [`Transfer`] is what the user asks for ("send 10 to X with this
//! message"); an [`Input`] is where the money comes from. Neither is a ledger
//! record yet. The builder turns them into [`super::Transaction`] entries.

use serde::{Deserialize, Serialize};

use crate::config::{HASH_TRYTES, TAG_TRYTES};
use crate::crypto::SecurityLevel;
use crate::error::{Error, Result};
use crate::ternary::{is_address, is_trytes};

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// One intended movement of value and/or data.
///
/// `address` may carry a checksum; it is stripped when the transfer becomes
/// a bundle entry. `message` is arbitrary-length trytes (see
/// [`crate::ternary::str_to_trytes`] for text). `tag` is at most 27 trytes
/// and is right-padded with `9`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub address: String,
    pub value: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub tag: String,
}

impl Transfer {
    /// A value transfer with no message and an empty tag.
    pub fn new(address: impl Into<String>, value: i64) -> Self {
        Self {
            address: address.into(),
            value,
            message: String::new(),
            tag: String::new(),
        }
    }

    /// Attach a message (already encoded as trytes).
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a tag of at most 27 trytes.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Shape checks that need no node and no hashing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTransferSpec`] for a malformed address, a negative
    /// value, a non-tryte message, or a tag that is too long or not trytes.
    pub fn validate(&self) -> Result<()> {
        if !is_address(&self.address) {
            return Err(Error::InvalidTransferSpec(format!(
                "address must be {HASH_TRYTES} or {} trytes: {:?}",
                HASH_TRYTES + 9,
                self.address
            )));
        }
        if self.value < 0 {
            return Err(Error::InvalidTransferSpec(format!(
                "transfer value must not be negative, got {}",
                self.value
            )));
        }
        if !is_trytes(&self.message, None) {
            return Err(Error::InvalidTransferSpec(
                "message must consist of trytes".to_string(),
            ));
        }
        if self.tag.len() > TAG_TRYTES || !is_trytes(&self.tag, None) {
            return Err(Error::InvalidTransferSpec(format!(
                "tag must be at most {TAG_TRYTES} trytes: {:?}",
                self.tag
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A spendable address and what is needed to sign for it.
///
/// `key_index` and `security` re-derive the private key from the seed. The
/// number of entries an input occupies in a bundle equals its security
/// level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub address: String,
    pub balance: i64,
    pub key_index: usize,
    #[serde(default)]
    pub security: SecurityLevel,
}

impl Input {
    pub fn new(
        address: impl Into<String>,
        balance: i64,
        key_index: usize,
        security: SecurityLevel,
    ) -> Self {
        Self {
            address: address.into(),
            balance,
            key_index,
            security,
        }
    }
}

/// The result of input discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inputs {
    pub inputs: Vec<Input>,
    pub total_balance: i64,
}
