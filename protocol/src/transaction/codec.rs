//! The 2673-tryte transaction record and its wire codec.
//!
//! [`Transaction`] is the decoded form of one ledger entry. Serialization is
//! tryte-exact: `from_trytes(t)?.to_trytes()? == t` for every well-formed
//! `t`, and a transaction's identity is the Curl hash of those trytes.
//!
//! # Wire Layout
//!
//! Field offsets live in [`crate::config::offsets`]. Integer fields are
//! little-endian balanced ternary, zero-padded to their width. The value
//! field is 81 trits wide but only its low 33 trits may be non-zero;
//! anything else in trytes 2279..2295 makes the record malformed.

use serde::{Deserialize, Serialize};

use crate::config::{
    offsets, HASH_TRYTES, NONCE_TRYTES, SHORT_FIELD_TRITS, SIGNATURE_FRAGMENT_TRYTES, TAG_TRYTES,
    TRANSACTION_TRYTES, VALUE_TRITS, VALUE_USABLE_TRITS,
};
use crate::crypto::curl;
use crate::ternary::{
    int_to_trits_padded, trits_to_int, trits_to_trytes, trytes_to_trits, validate_trytes,
    TernaryError, Trit,
};

/// One decoded ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// 2187 trytes: a signature fragment for spending entries, a message
    /// fragment (or all `9`) otherwise.
    pub signature_message_fragment: String,
    /// 81-tryte address, no checksum.
    pub address: String,
    pub value: i64,
    /// 27 trytes. Starts equal to `tag`; the first entry's copy is bumped
    /// during bundle finalization.
    pub obsolete_tag: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub current_index: usize,
    pub last_index: usize,
    /// 81-tryte bundle hash shared by every entry of the bundle.
    pub bundle: String,
    pub trunk_transaction: String,
    pub branch_transaction: String,
    pub tag: String,
    /// Milliseconds since the Unix epoch, set when the node attaches.
    pub attachment_timestamp: i64,
    pub attachment_timestamp_lower_bound: i64,
    pub attachment_timestamp_upper_bound: i64,
    pub nonce: String,
}

impl Transaction {
    /// `true` for the entry with `currentIndex == 0`.
    pub fn is_tail(&self) -> bool {
        self.current_index == 0
    }

    /// The 162-tryte essence as trits: address, value, obsolete tag,
    /// timestamp, current index, last index. This is what the bundle hash
    /// commits to.
    pub fn essence_trits(&self) -> Result<Vec<Trit>, TernaryError> {
        let mut trits = Vec::with_capacity(HASH_TRYTES * 6);
        trits.extend(field_trits("address", &self.address, HASH_TRYTES)?);
        trits.extend(value_trits(self.value)?);
        trits.extend(field_trits("obsolete tag", &self.obsolete_tag, TAG_TRYTES)?);
        trits.extend(int_to_trits_padded(self.timestamp, SHORT_FIELD_TRITS)?);
        trits.extend(index_trits(self.current_index)?);
        trits.extend(index_trits(self.last_index)?);
        Ok(trits)
    }

    /// Serialize to exactly 2673 trytes.
    ///
    /// # Errors
    ///
    /// [`TernaryError`] if any string field has the wrong width or is not
    /// trytes, or if an integer does not fit its field.
    pub fn to_trytes(&self) -> Result<String, TernaryError> {
        let mut out = String::with_capacity(TRANSACTION_TRYTES);
        out.push_str(fixed(
            "signature message fragment",
            &self.signature_message_fragment,
            SIGNATURE_FRAGMENT_TRYTES,
        )?);
        out.push_str(fixed("address", &self.address, HASH_TRYTES)?);
        out.push_str(&trits_to_trytes(&value_trits(self.value)?)?);
        out.push_str(fixed("obsolete tag", &self.obsolete_tag, TAG_TRYTES)?);
        out.push_str(&short_field(self.timestamp)?);
        out.push_str(&trits_to_trytes(&index_trits(self.current_index)?)?);
        out.push_str(&trits_to_trytes(&index_trits(self.last_index)?)?);
        out.push_str(fixed("bundle", &self.bundle, HASH_TRYTES)?);
        out.push_str(fixed("trunk transaction", &self.trunk_transaction, HASH_TRYTES)?);
        out.push_str(fixed("branch transaction", &self.branch_transaction, HASH_TRYTES)?);
        out.push_str(fixed("tag", &self.tag, TAG_TRYTES)?);
        out.push_str(&short_field(self.attachment_timestamp)?);
        out.push_str(&short_field(self.attachment_timestamp_lower_bound)?);
        out.push_str(&short_field(self.attachment_timestamp_upper_bound)?);
        out.push_str(fixed("nonce", &self.nonce, NONCE_TRYTES)?);
        debug_assert_eq!(out.len(), TRANSACTION_TRYTES);
        Ok(out)
    }

    /// Parse a 2673-tryte record.
    ///
    /// # Errors
    ///
    /// - [`TernaryError::InvalidLength`] for the wrong length.
    /// - [`TernaryError::InvalidTryte`] for characters outside the alphabet.
    /// - [`TernaryError::Overflow`] when trytes 2279..2295 are not all `9`,
    ///   or when an index field is negative.
    pub fn from_trytes(trytes: &str) -> Result<Self, TernaryError> {
        validate_trytes("transaction", trytes, Some(TRANSACTION_TRYTES))?;
        if let Some(position) = trytes[offsets::VALUE_UNUSED..offsets::OBSOLETE_TAG]
            .find(|c: char| c != '9')
        {
            return Err(TernaryError::Overflow(format!(
                "value field has a non-zero tryte at offset {}",
                offsets::VALUE_UNUSED + position
            )));
        }

        let trits = trytes_to_trits(trytes)?;
        let int_at = |offset: usize, width: usize| trits_to_int(&trits[offset * 3..offset * 3 + width]);
        let index_at = |offset: usize| -> Result<usize, TernaryError> {
            let value = int_at(offset, SHORT_FIELD_TRITS)?;
            usize::try_from(value)
                .map_err(|_| TernaryError::Overflow(format!("negative bundle index {value}")))
        };
        let slice = |from: usize, len: usize| trytes[from..from + len].to_string();

        Ok(Self {
            signature_message_fragment: slice(
                offsets::SIGNATURE_MESSAGE_FRAGMENT,
                SIGNATURE_FRAGMENT_TRYTES,
            ),
            address: slice(offsets::ADDRESS, HASH_TRYTES),
            value: int_at(offsets::VALUE, VALUE_USABLE_TRITS)?,
            obsolete_tag: slice(offsets::OBSOLETE_TAG, TAG_TRYTES),
            timestamp: int_at(offsets::TIMESTAMP, SHORT_FIELD_TRITS)?,
            current_index: index_at(offsets::CURRENT_INDEX)?,
            last_index: index_at(offsets::LAST_INDEX)?,
            bundle: slice(offsets::BUNDLE, HASH_TRYTES),
            trunk_transaction: slice(offsets::TRUNK_TRANSACTION, HASH_TRYTES),
            branch_transaction: slice(offsets::BRANCH_TRANSACTION, HASH_TRYTES),
            tag: slice(offsets::TAG, TAG_TRYTES),
            attachment_timestamp: int_at(offsets::ATTACHMENT_TIMESTAMP, SHORT_FIELD_TRITS)?,
            attachment_timestamp_lower_bound: int_at(
                offsets::ATTACHMENT_TIMESTAMP_LOWER_BOUND,
                SHORT_FIELD_TRITS,
            )?,
            attachment_timestamp_upper_bound: int_at(
                offsets::ATTACHMENT_TIMESTAMP_UPPER_BOUND,
                SHORT_FIELD_TRITS,
            )?,
            nonce: slice(offsets::NONCE, NONCE_TRYTES),
        })
    }

    /// The transaction hash: Curl-81 over all 8019 trits of the record.
    pub fn hash(&self) -> Result<String, TernaryError> {
        hash_trytes(&self.to_trytes()?)
    }
}

/// Hash serialized transaction trytes without decoding them.
pub fn hash_trytes(trytes: &str) -> Result<String, TernaryError> {
    validate_trytes("transaction", trytes, Some(TRANSACTION_TRYTES))?;
    trits_to_trytes(&curl::hash(&trytes_to_trits(trytes)?))
}

fn fixed<'a>(what: &'static str, value: &'a str, len: usize) -> Result<&'a str, TernaryError> {
    validate_trytes(what, value, Some(len))?;
    Ok(value)
}

fn field_trits(what: &'static str, value: &str, len: usize) -> Result<Vec<Trit>, TernaryError> {
    trytes_to_trits(fixed(what, value, len)?)
}

fn value_trits(value: i64) -> Result<Vec<Trit>, TernaryError> {
    let mut trits = int_to_trits_padded(value, VALUE_USABLE_TRITS)?;
    trits.resize(VALUE_TRITS, 0);
    Ok(trits)
}

fn index_trits(index: usize) -> Result<Vec<Trit>, TernaryError> {
    let value = i64::try_from(index)
        .map_err(|_| TernaryError::Overflow(format!("bundle index {index} too large")))?;
    int_to_trits_padded(value, SHORT_FIELD_TRITS)
}

fn short_field(value: i64) -> Result<String, TernaryError> {
    trits_to_trytes(&int_to_trits_padded(value, SHORT_FIELD_TRITS)?)
}
