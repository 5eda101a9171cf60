//! Bundle construction via an owning builder.
//!
//! The [`BundleBuilder`] owns its entry list exclusively. Add entries, call
//! [`finalize`](BundleBuilder::finalize), and get back an immutable
//! [`Bundle`] whose hash, order, and essence are fixed. Signing (in
//! [`super::signing`]) can then only touch signature fragments.
//!
//! # The Essence Hash
//!
//! Every entry contributes 162 trytes of essence (address, value, obsolete
//! tag, timestamp, current index, last index). All of them are absorbed into
//! one sponge and a single 81-tryte hash is squeezed out. That hash is what
//! inputs sign.
//!
//! There is a wrinkle. If the normalized hash contains a `13` (an `M`), the
//! signature for that tryte would reveal the key chunk hashed zero times,
//! i.e. the raw private key chunk. Finalization therefore bumps the first
//! entry's obsolete tag by one and re-hashes until no `13` remains. Expect a
//! handful of iterations on average.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::codec::Transaction;
use crate::config::{
    HASH_TRYTES, MAX_TRYTE_VALUE, NONCE_TRYTES, SIGNATURE_FRAGMENT_TRYTES, TAG_TRYTES,
};
use crate::crypto::{normalize_hash, remove_checksum, Curl};
use crate::error::{Error, Result};
use crate::ternary::{
    increment_trits, trits_to_trytes, trytes_to_trits, validate_trytes, TernaryError,
};

/// Right-pad `value` with `9` to `len` trytes.
pub(crate) fn pad_trytes(value: &str, len: usize) -> String {
    let mut out = String::with_capacity(len.max(value.len()));
    out.push_str(value);
    while out.len() < len {
        out.push('9');
    }
    out
}

/// Split a message into 2187-tryte fragments, padding the last with `9`.
///
/// An empty message still occupies one (all-`9`) fragment; a message of
/// `n` trytes needs `ceil(n / 2187)` fragments.
pub fn split_message(message: &str) -> Vec<String> {
    if message.is_empty() {
        return vec![pad_trytes("", SIGNATURE_FRAGMENT_TRYTES)];
    }
    message
        .as_bytes()
        .chunks(SIGNATURE_FRAGMENT_TRYTES)
        // Trytes are ASCII, so every byte chunk is valid UTF-8.
        .map(|chunk| pad_trytes(&String::from_utf8_lossy(chunk), SIGNATURE_FRAGMENT_TRYTES))
        .collect()
}

// ---------------------------------------------------------------------------
// BundleBuilder
// ---------------------------------------------------------------------------

/// Accumulates bundle entries until finalization.
///
/// ```
/// use trinary_protocol::transaction::BundleBuilder;
///
/// let mut builder = BundleBuilder::new();
/// builder.add_entry(1, &"B".repeat(81), 0, "HELLO", 1_700_000_000).unwrap();
/// let bundle = builder.finalize(&[]).unwrap();
/// assert_eq!(bundle.len(), 1);
/// assert_eq!(bundle.hash().len(), 81);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BundleBuilder {
    entries: Vec<Transaction>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `signature_message_length` entries for one address.
    ///
    /// The first entry carries `value`; continuations carry zero. The tag is
    /// right-padded to 27 trytes and also seeds the obsolete tag. A checksum
    /// on the address is stripped.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] for a malformed address.
    /// - [`Error::InvalidTransferSpec`] for a zero length or a tag longer
    ///   than 27 trytes.
    pub fn add_entry(
        &mut self,
        signature_message_length: usize,
        address: &str,
        value: i64,
        tag: &str,
        timestamp: i64,
    ) -> Result<&mut Self> {
        if signature_message_length == 0 {
            return Err(Error::InvalidTransferSpec(
                "an entry needs at least one signature-message slot".to_string(),
            ));
        }
        if tag.len() > TAG_TRYTES {
            return Err(Error::InvalidTransferSpec(format!(
                "tag must be at most {TAG_TRYTES} trytes, got {}",
                tag.len()
            )));
        }
        validate_trytes("tag", tag, None)?;
        let address = remove_checksum(address)?;
        let tag = pad_trytes(tag, TAG_TRYTES);

        for slot in 0..signature_message_length {
            self.entries.push(Transaction {
                signature_message_fragment: String::new(),
                address: address.clone(),
                value: if slot == 0 { value } else { 0 },
                obsolete_tag: tag.clone(),
                timestamp,
                current_index: 0,
                last_index: 0,
                bundle: String::new(),
                trunk_transaction: String::new(),
                branch_transaction: String::new(),
                tag: tag.clone(),
                attachment_timestamp: 0,
                attachment_timestamp_lower_bound: 0,
                attachment_timestamp_upper_bound: 0,
                nonce: String::new(),
            });
        }
        Ok(self)
    }

    /// Entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry values so far.
    pub fn total_value(&self) -> i64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    /// Fix indices, compute the bundle hash, and fill the remaining fields.
    ///
    /// `signature_fragments[i]` (right-padded to 2187 trytes) becomes entry
    /// `i`'s fragment; entries beyond the list get 2187 `9`s. Trunk, branch,
    /// and nonce are all-`9` and attachment fields zero until a node attaches
    /// the bundle.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTransferSpec`] for an empty builder, or for more
    ///   fragments than entries.
    /// - [`Error::InvalidFormat`] for a fragment that is too long or not
    ///   trytes.
    pub fn finalize(mut self, signature_fragments: &[String]) -> Result<Bundle> {
        if self.entries.is_empty() {
            return Err(Error::InvalidTransferSpec(
                "cannot finalize an empty bundle".to_string(),
            ));
        }
        if signature_fragments.len() > self.entries.len() {
            return Err(Error::InvalidTransferSpec(format!(
                "{} signature fragments for {} entries",
                signature_fragments.len(),
                self.entries.len()
            )));
        }

        let last_index = self.entries.len() - 1;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.current_index = index;
            entry.last_index = last_index;
        }

        let mut iterations = 1usize;
        let hash = loop {
            let hash = Bundle::essence_hash(&self.entries)?;
            if !normalize_hash(&hash)?.contains(&MAX_TRYTE_VALUE) {
                break hash;
            }
            let head = &mut self.entries[0];
            let mut tag_trits = trytes_to_trits(&head.obsolete_tag)?;
            increment_trits(&mut tag_trits);
            head.obsolete_tag = trits_to_trytes(&tag_trits)?;
            iterations += 1;
        };
        debug!(entries = self.entries.len(), iterations, bundle = %hash, "bundle finalized");

        for (index, entry) in self.entries.iter_mut().enumerate() {
            let fragment = signature_fragments
                .get(index)
                .map(String::as_str)
                .unwrap_or_default();
            validate_trytes("signature message fragment", fragment, None)?;
            if fragment.len() > SIGNATURE_FRAGMENT_TRYTES {
                return Err(TernaryError::InvalidLength {
                    what: "signature message fragment",
                    expected: format!("at most {SIGNATURE_FRAGMENT_TRYTES}"),
                    actual: fragment.len(),
                }
                .into());
            }
            entry.signature_message_fragment = pad_trytes(fragment, SIGNATURE_FRAGMENT_TRYTES);
            entry.bundle = hash.clone();
            entry.trunk_transaction = pad_trytes("", HASH_TRYTES);
            entry.branch_transaction = pad_trytes("", HASH_TRYTES);
            entry.nonce = pad_trytes("", NONCE_TRYTES);
        }

        Ok(Bundle {
            transactions: self.entries,
        })
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// An ordered group of transactions sharing one bundle hash.
///
/// A finalized bundle has fixed identity: indices, essence, and hash cannot
/// change. A bundle assembled from the ledger (via traversal) is not
/// validated by construction; run
/// [`validate_bundle`](super::verification::validate_bundle) on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    transactions: Vec<Transaction>,
}

impl Bundle {
    /// Wrap transactions as they were found, in index order.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Sponge hash over the concatenated essence of `transactions`.
    pub fn essence_hash(transactions: &[Transaction]) -> Result<String> {
        let mut curl = Curl::new();
        for transaction in transactions {
            curl.absorb(&transaction.essence_trits()?);
        }
        Ok(trits_to_trytes(&curl.squeeze_hash())?)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The recorded bundle hash (empty string for an empty bundle).
    pub fn hash(&self) -> &str {
        self.transactions
            .first()
            .map(|t| t.bundle.as_str())
            .unwrap_or_default()
    }

    /// The entry with `currentIndex == 0`.
    pub fn tail(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// Serialize every entry, head first and tail last.
    ///
    /// This is the order the node's attach step chains them in: each entry's
    /// trunk ends up referencing the entry with the next higher index.
    pub fn to_trytes(&self) -> Result<Vec<String>> {
        self.transactions
            .iter()
            .rev()
            .map(|t| t.to_trytes().map_err(Error::from))
            .collect()
    }

    /// Replace one entry's signature fragment. Identity fields are untouched.
    pub(crate) fn set_signature_fragment(&mut self, index: usize, fragment: String) {
        if let Some(entry) = self.transactions.get_mut(index) {
            entry.signature_message_fragment = fragment;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT_ADDRESS: &str =
        "JEUFD9BHVP9SV9JHZURXTZF9YXFOPABAHVRXTTYRMP9KZIABVMPFFDIJPYFWKYNMQBYITQZCMTYNHAZX9";

    fn three_entry_builder() -> BundleBuilder {
        let mut builder = BundleBuilder::new();
        builder
            .add_entry(1, &"B".repeat(81), 10, "TESTTAG", 1_700_000_000)
            .unwrap()
            .add_entry(2, INPUT_ADDRESS, -10, "TESTTAG", 1_700_000_000)
            .unwrap();
        builder
    }

    #[test]
    fn known_bundle_hash_and_obsolete_tag() {
        let bundle = three_entry_builder().finalize(&[]).unwrap();
        assert_eq!(
            bundle.hash(),
            "NKBFSZDQOBI9DYYHTEJ9JNGSPHBXPUSKTGQFQGFCFIIQEJZFXXYGGFMK9UEZOINOGDLJCBALHRGT9WNJR"
        );
        // Eleven bumps of the first obsolete tag; the tag itself is untouched.
        let head = &bundle.transactions()[0];
        assert_eq!(head.obsolete_tag, pad_trytes("DESTTAG", 27));
        assert_eq!(head.tag, pad_trytes("TESTTAG", 27));
        assert_eq!(bundle.transactions()[1].obsolete_tag, pad_trytes("TESTTAG", 27));
    }

    #[test]
    fn finalized_hash_has_no_thirteen() {
        let bundle = three_entry_builder().finalize(&[]).unwrap();
        assert!(!normalize_hash(bundle.hash()).unwrap().contains(&13));
        assert_eq!(Bundle::essence_hash(bundle.transactions()).unwrap(), bundle.hash());
    }

    #[test]
    fn indices_values_and_defaults() {
        let bundle = three_entry_builder().finalize(&[]).unwrap();
        let txs = bundle.transactions();
        assert_eq!(txs.len(), 3);
        assert_eq!(txs.iter().map(|t| t.value).collect::<Vec<_>>(), vec![10, -10, 0]);
        for (i, tx) in txs.iter().enumerate() {
            assert_eq!(tx.current_index, i);
            assert_eq!(tx.last_index, 2);
            assert_eq!(tx.bundle, bundle.hash());
            assert_eq!(tx.signature_message_fragment, "9".repeat(2187));
            assert_eq!(tx.trunk_transaction, "9".repeat(81));
            assert_eq!(tx.nonce, "9".repeat(27));
            assert_eq!(tx.attachment_timestamp, 0);
        }
        assert_eq!(txs[1].address, txs[2].address);
    }

    #[test]
    fn fragments_fill_in_order() {
        let fragments = vec!["HELLO".to_string(), "WORLD".to_string()];
        let bundle = three_entry_builder().finalize(&fragments).unwrap();
        assert!(bundle.transactions()[0].signature_message_fragment.starts_with("HELLO9"));
        assert!(bundle.transactions()[1].signature_message_fragment.starts_with("WORLD9"));
        assert_eq!(bundle.transactions()[2].signature_message_fragment, "9".repeat(2187));
    }

    #[test]
    fn checksum_is_stripped() {
        let with_checksum = format!("{INPUT_ADDRESS}EKEKGOXYH");
        let mut builder = BundleBuilder::new();
        builder.add_entry(1, &with_checksum, 0, "", 0).unwrap();
        let bundle = builder.finalize(&[]).unwrap();
        assert_eq!(bundle.transactions()[0].address, INPUT_ADDRESS);
    }

    #[test]
    fn bad_entries_rejected() {
        let mut builder = BundleBuilder::new();
        assert!(matches!(
            builder.add_entry(1, &"B".repeat(81), 0, &"T".repeat(28), 0),
            Err(Error::InvalidTransferSpec(_))
        ));
        assert!(matches!(
            builder.add_entry(1, "NOTANADDRESS", 0, "", 0),
            Err(Error::InvalidFormat(TernaryError::InvalidLength { .. }))
        ));
        assert!(matches!(
            builder.add_entry(0, &"B".repeat(81), 0, "", 0),
            Err(Error::InvalidTransferSpec(_))
        ));
        assert!(builder.is_empty());
        assert!(matches!(builder.finalize(&[]), Err(Error::InvalidTransferSpec(_))));
    }

    #[test]
    fn oversized_fragment_rejected() {
        let result = three_entry_builder().finalize(&["A".repeat(2188)]);
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn message_splitting() {
        assert_eq!(split_message(""), vec!["9".repeat(2187)]);
        assert_eq!(split_message(&"A".repeat(2187)).len(), 1);

        let parts = split_message(&"A".repeat(2188));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1], pad_trytes("A", 2187));
    }

    #[test]
    fn trytes_are_head_first() {
        let bundle = three_entry_builder().finalize(&[]).unwrap();
        let trytes = bundle.to_trytes().unwrap();
        assert_eq!(trytes.len(), 3);
        let head = Transaction::from_trytes(&trytes[0]).unwrap();
        let tail = Transaction::from_trytes(&trytes[2]).unwrap();
        assert_eq!(head.current_index, 2);
        assert!(tail.is_tail());
    }
}
