//! # Protocol Configuration & Constants
//!
//! Every magic number of the ledger format lives here. Offsets, widths,
//! defaults: if you're hardcoding one of these somewhere else, you're doing it
//! wrong.
//!
//! These values are the wire contract. A transaction that is off by one tryte
//! is not "almost valid", it is a different transaction with a different hash,
//! and funds signed against the wrong layout are simply gone. Change nothing
//! here without a test vector to back it up.
//!
//! The second half of the file holds the per-operation option structs. They
//! replace loosely-typed option bags: every field has a documented default,
//! and unknown fields are rejected at deserialization time instead of being
//! silently ignored.

use serde::{Deserialize, Serialize};

use crate::crypto::SecurityLevel;
use crate::transaction::Input;

// ---------------------------------------------------------------------------
// Sponge Parameters
// ---------------------------------------------------------------------------

/// Width of one hash (and of one sponge rate block) in trits.
pub const HASH_LENGTH: usize = 243;

/// Width of one hash in trytes.
pub const HASH_TRYTES: usize = 81;

/// Full sponge state: three hash widths.
pub const STATE_LENGTH: usize = 3 * HASH_LENGTH;

/// Default number of transform rounds. General hashing, signing, and bundle
/// hashing all use this.
pub const NUMBER_OF_ROUNDS: usize = 81;

/// The reduced-round variant, available through `Curl::with_rounds`. No
/// operation in this client selects it; keys, addresses, bundles and
/// transactions all hash with [`NUMBER_OF_ROUNDS`].
pub const REDUCED_ROUNDS: usize = 27;

// ---------------------------------------------------------------------------
// Signature Parameters
// ---------------------------------------------------------------------------

/// Number of 243-trit chunks in one key (or signature) fragment.
pub const CHUNKS_PER_FRAGMENT: usize = 27;

/// Trits in one key fragment: 27 chunks of one hash width each.
pub const KEY_FRAGMENT_LENGTH: usize = CHUNKS_PER_FRAGMENT * HASH_LENGTH;

/// Highest absolute value of a normalized tryte. A chunk is hashed
/// `13 - n` times to sign and `13 + n` times to verify; 26 in total.
pub const MAX_TRYTE_VALUE: i8 = 13;

/// Times each key chunk is hashed to produce its public digest chunk.
pub const DIGEST_HASH_ROUNDS: usize = 26;

// ---------------------------------------------------------------------------
// Address Parameters
// ---------------------------------------------------------------------------

/// Trytes of checksum appended to an address for display.
pub const ADDRESS_CHECKSUM_TRYTES: usize = 9;

/// Seeds are padded with `9` to a multiple of this many trytes.
pub const SEED_TRYTES: usize = 81;

/// Upper bound on the number of addresses any single scan or range may
/// touch. Keeps a typo in `end` from turning into hours of hashing.
pub const MAX_ADDRESS_RANGE: usize = 500;

// ---------------------------------------------------------------------------
// Transaction Layout
// ---------------------------------------------------------------------------

/// A serialized transaction is exactly this many trytes. Not one more.
pub const TRANSACTION_TRYTES: usize = 2673;

/// Trits in a serialized transaction.
pub const TRANSACTION_TRITS: usize = TRANSACTION_TRYTES * 3;

/// Signature-message fragment capacity in trytes.
pub const SIGNATURE_FRAGMENT_TRYTES: usize = 2187;

/// Tag and obsolete-tag width in trytes.
pub const TAG_TRYTES: usize = 27;

/// Nonce width in trytes.
pub const NONCE_TRYTES: usize = 27;

/// Width of the value field in trits.
pub const VALUE_TRITS: usize = 81;

/// Only this many low trits of the value field may be non-zero on the wire.
pub const VALUE_USABLE_TRITS: usize = 33;

/// Width of timestamp and index fields in trits.
pub const SHORT_FIELD_TRITS: usize = 27;

/// Essence width in trytes: address, value, obsolete tag, timestamp,
/// current index, last index.
pub const ESSENCE_TRYTES: usize = 162;

/// Tryte offsets of each field inside a serialized transaction.
pub mod offsets {
    pub const SIGNATURE_MESSAGE_FRAGMENT: usize = 0;
    pub const ADDRESS: usize = 2187;
    pub const VALUE: usize = 2268;
    /// Trytes `VALUE_UNUSED..OBSOLETE_TAG` must all be `9`.
    pub const VALUE_UNUSED: usize = 2279;
    pub const OBSOLETE_TAG: usize = 2295;
    pub const TIMESTAMP: usize = 2322;
    pub const CURRENT_INDEX: usize = 2331;
    pub const LAST_INDEX: usize = 2340;
    pub const BUNDLE: usize = 2349;
    pub const TRUNK_TRANSACTION: usize = 2430;
    pub const BRANCH_TRANSACTION: usize = 2511;
    pub const TAG: usize = 2592;
    pub const ATTACHMENT_TIMESTAMP: usize = 2619;
    pub const ATTACHMENT_TIMESTAMP_LOWER_BOUND: usize = 2628;
    pub const ATTACHMENT_TIMESTAMP_UPPER_BOUND: usize = 2637;
    pub const NONCE: usize = 2646;
}

// ---------------------------------------------------------------------------
// Node Interaction Defaults
// ---------------------------------------------------------------------------

/// Confirmation threshold (percent) passed to the node's balance query.
pub const BALANCE_THRESHOLD: u8 = 100;

/// Default tip-selection depth.
pub const DEFAULT_DEPTH: usize = 3;

/// Default minimum weight magnitude requested from the node's attach step.
pub const DEFAULT_MIN_WEIGHT_MAGNITUDE: u8 = 14;

// ---------------------------------------------------------------------------
// Operation Options
// ---------------------------------------------------------------------------

/// Options for address generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AddressOptions {
    /// Key index to start at. Default 0.
    pub index: usize,
    /// Generate exactly this many consecutive addresses without asking the
    /// node anything. When `None` (the default), scan from `index` until the
    /// first address with no transactions on the node.
    pub total: Option<usize>,
    /// Security level of the generated addresses. Default 2.
    pub security: SecurityLevel,
    /// Append the 9-tryte checksum. Default `false`.
    pub checksum: bool,
    /// When scanning, also return every used address visited on the way.
    /// Default `false`: only the first unused one.
    pub return_all: bool,
}

impl Default for AddressOptions {
    fn default() -> Self {
        Self {
            index: 0,
            total: None,
            security: SecurityLevel::default(),
            checksum: false,
            return_all: false,
        }
    }
}

/// Options for input discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InputOptions {
    /// First key index to consider. Default 0.
    pub start: usize,
    /// Last key index to consider (inclusive). When `None`, scan like
    /// [`AddressOptions`] does until the first unused address.
    pub end: Option<usize>,
    /// Stop as soon as the collected balance reaches this value; fail with
    /// insufficient balance if it never does. Default: collect everything.
    pub threshold: Option<i64>,
    /// Security level of the scanned addresses. Default 2.
    pub security: SecurityLevel,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
            threshold: None,
            security: SecurityLevel::default(),
        }
    }
}

/// Options for preparing a transfer bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TransferOptions {
    /// Inputs to spend from. Their balances are re-checked against the node.
    /// When `None`, inputs are discovered by scanning the seed's addresses.
    pub inputs: Option<Vec<Input>>,
    /// Where to send any leftover input balance. When `None`, a fresh address
    /// is derived from the seed.
    pub remainder_address: Option<String>,
    /// Security level used for discovered inputs and derived remainder
    /// addresses. Default 2.
    pub security: SecurityLevel,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            inputs: None,
            remainder_address: None,
            security: SecurityLevel::default(),
        }
    }
}

/// Options for attaching and submitting trytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SendOptions {
    /// Tip-selection depth. Default 3.
    pub depth: usize,
    /// Minimum weight magnitude for the node's attach step. Default 14.
    pub min_weight_magnitude: u8,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            min_weight_magnitude: DEFAULT_MIN_WEIGHT_MAGNITUDE,
        }
    }
}

/// Options for transfer-history assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TransfersOptions {
    /// First key index to include. Default 0.
    pub start: usize,
    /// Last key index to include (inclusive). When `None`, scan until the
    /// first unused address.
    pub end: Option<usize>,
    /// Security level of the scanned addresses. Default 2.
    pub security: SecurityLevel,
}

impl Default for TransfersOptions {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
            security: SecurityLevel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_adds_up() {
        // The offsets must tile the transaction exactly.
        assert_eq!(offsets::ADDRESS, SIGNATURE_FRAGMENT_TRYTES);
        assert_eq!(offsets::VALUE, offsets::ADDRESS + HASH_TRYTES);
        assert_eq!(offsets::OBSOLETE_TAG, offsets::VALUE + VALUE_TRITS / 3);
        assert_eq!(offsets::VALUE_UNUSED, offsets::VALUE + VALUE_USABLE_TRITS / 3);
        assert_eq!(offsets::TIMESTAMP, offsets::OBSOLETE_TAG + TAG_TRYTES);
        assert_eq!(offsets::BUNDLE, offsets::LAST_INDEX + SHORT_FIELD_TRITS / 3);
        assert_eq!(offsets::TAG, offsets::BRANCH_TRANSACTION + HASH_TRYTES);
        assert_eq!(offsets::NONCE + NONCE_TRYTES, TRANSACTION_TRYTES);
        assert_eq!(offsets::BUNDLE - offsets::ADDRESS, ESSENCE_TRYTES);
    }

    #[test]
    fn key_fragment_fills_one_signature_field() {
        assert_eq!(KEY_FRAGMENT_LENGTH, SIGNATURE_FRAGMENT_TRYTES * 3);
    }

    #[test]
    fn address_options_defaults_and_partial_json() {
        let opts: AddressOptions = serde_json::from_str(r#"{"index": 5, "checksum": true}"#).unwrap();
        assert_eq!(opts.index, 5);
        assert!(opts.checksum);
        assert_eq!(opts.total, None);
        assert_eq!(opts.security, SecurityLevel::Medium);
    }

    #[test]
    fn unknown_option_fields_are_rejected() {
        let result: Result<AddressOptions, _> = serde_json::from_str(r#"{"returnAll": true}"#);
        assert!(result.is_err());

        let result: Result<SendOptions, _> = serde_json::from_str(r#"{"depth": 4, "mwm": 9}"#);
        assert!(result.is_err());
    }

    #[test]
    fn security_level_serializes_as_integer() {
        let opts: InputOptions = serde_json::from_str(r#"{"security": 3, "threshold": 50}"#).unwrap();
        assert_eq!(opts.security, SecurityLevel::High);
        assert_eq!(opts.threshold, Some(50));

        let bad: Result<InputOptions, _> = serde_json::from_str(r#"{"security": 4}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn send_defaults() {
        let opts = SendOptions::default();
        assert_eq!(opts.depth, DEFAULT_DEPTH);
        assert_eq!(opts.min_weight_magnitude, DEFAULT_MIN_WEIGHT_MAGNITUDE);
    }
}
