//! Bundle verification: structural checks and signature validation.
//!
//! Every bundle fetched from a node passes through [`validate_bundle`] before
//! anyone treats it as a transfer. The checks run in a fixed order from
//! cheapest to most expensive, so a bundle with a bad sum never costs a
//! single signature hash.

use tracing::warn;

use super::builder::Bundle;
use crate::crypto::validate_signatures;
use crate::error::{Error, Result};

/// Validates a bundle assembled from the ledger.
///
/// The checks, in order:
///
/// 0. **Non-empty**: an empty bundle is [`Error::IncompleteBundle`].
/// 1. **Sum**: all values add up to exactly zero.
/// 2. **Order**: entry `i` has `currentIndex == i`.
/// 3. **Hash**: the recomputed essence hash equals the first entry's bundle
///    hash.
/// 4. **Complete**: the last entry has `currentIndex == lastIndex`.
/// 5. **Signatures**: every negative-value entry, together with the
///    zero-value entries for the same address that immediately follow it,
///    carries a signature that verifies against that address.
///
/// # Errors
///
/// The first failing check, as the matching [`Error`] variant. Malformed
/// fields surface as [`Error::InvalidFormat`].
pub fn validate_bundle(bundle: &Bundle) -> Result<()> {
    let transactions = bundle.transactions();
    let Some(last) = transactions.last() else {
        return Err(Error::IncompleteBundle);
    };

    // 1. Sum. i128 so a hostile bundle cannot overflow the accumulator.
    let sum: i128 = transactions.iter().map(|t| t.value as i128).sum();
    if sum != 0 {
        warn!(bundle = bundle.hash(), sum = %sum, "bundle rejected: non-zero sum");
        return Err(Error::InvalidBundleSum);
    }

    // 2. Positions.
    if let Some((position, tx)) = transactions
        .iter()
        .enumerate()
        .find(|(position, tx)| tx.current_index != *position)
    {
        return Err(Error::InvalidBundleOrder {
            position,
            current_index: tx.current_index,
        });
    }

    // 3. Essence hash.
    let computed = Bundle::essence_hash(transactions)?;
    if computed != bundle.hash() {
        warn!(bundle = bundle.hash(), %computed, "bundle rejected: hash mismatch");
        return Err(Error::InvalidBundleHash {
            expected: bundle.hash().to_string(),
            computed,
        });
    }

    // 4. Head present.
    if last.current_index != last.last_index {
        return Err(Error::IncompleteBundle);
    }

    // 5. Signatures.
    let mut index = 0;
    while index < transactions.len() {
        let spend = &transactions[index];
        index += 1;
        if spend.value >= 0 {
            continue;
        }

        let mut fragments = vec![spend.signature_message_fragment.clone()];
        while let Some(next) = transactions.get(index) {
            if next.address != spend.address || next.value != 0 {
                break;
            }
            fragments.push(next.signature_message_fragment.clone());
            index += 1;
        }

        if !validate_signatures(&spend.address, &fragments, bundle.hash())? {
            warn!(bundle = bundle.hash(), address = %spend.address, "bundle rejected: bad signature");
            return Err(Error::InvalidSignature {
                address: spend.address.clone(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
