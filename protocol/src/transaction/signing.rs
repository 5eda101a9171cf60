//! Bundle signing with one-time ternary keys.
//!
//! Signing is a separate step from building: a [`Bundle`] is finalized
//! first, which fixes its hash, and only then can inputs sign that hash.
//! [`sign_bundle`] consumes the finalized bundle and returns a new one in
//! which the only changed fields are the signature fragments of spending
//! entries and their continuations.
//!
//! A spending entry (negative value) is followed by `security - 1` zero-value
//! entries with the same address. Fragment `j` of the signature goes into
//! entry `i + j` and signs normalized third `j % 3` of the bundle hash.

use tracing::debug;

use super::builder::Bundle;
use super::types::Input;
use crate::config::KEY_FRAGMENT_LENGTH;
use crate::crypto::{
    derive_key, normalize_hash, normalized_fragment, remove_checksum, seed_trits,
    signature_fragment,
};
use crate::error::{Error, Result};
use crate::ternary::trits_to_trytes;

/// Sign every spending entry of `bundle` with keys derived from `seed`.
///
/// Each negative-value entry is matched to the input with the same address;
/// that input's `key_index` and `security` re-derive the key.
///
/// # Errors
///
/// - [`Error::InvalidTransferSpec`] when a spending entry has no matching
///   input, or when its continuation entries are missing or malformed.
/// - [`Error::InvalidFormat`] for a malformed seed.
///
/// # Example
///
/// ```rust,no_run
/// use trinary_protocol::crypto::{generate_address, SecurityLevel};
/// use trinary_protocol::transaction::{sign_bundle, BundleBuilder, Input};
///
/// let seed = "A".repeat(81);
/// let input = generate_address(&seed, 0, SecurityLevel::Low).unwrap();
///
/// let mut builder = BundleBuilder::new();
/// builder.add_entry(1, &"B".repeat(81), 5, "", 0).unwrap();
/// builder.add_entry(1, &input, -5, "", 0).unwrap();
/// let bundle = builder.finalize(&[]).unwrap();
///
/// let inputs = [Input::new(input, 5, 0, SecurityLevel::Low)];
/// let signed = sign_bundle(bundle, &seed, &inputs).unwrap();
/// assert_ne!(signed.transactions()[1].signature_message_fragment, "9".repeat(2187));
/// ```
pub fn sign_bundle(mut bundle: Bundle, seed: &str, inputs: &[Input]) -> Result<Bundle> {
    let seed = seed_trits(seed)?;
    let normalized = normalize_hash(bundle.hash())?;

    let spends: Vec<(usize, String)> = bundle
        .transactions()
        .iter()
        .enumerate()
        .filter(|(_, tx)| tx.value < 0)
        .map(|(i, tx)| (i, tx.address.clone()))
        .collect();

    for (index, address) in spends {
        let input = find_input(inputs, &address)?.ok_or_else(|| {
            Error::InvalidTransferSpec(format!("no input supplied for spending address {address}"))
        })?;
        let fragments = input.security.fragments();

        let continuation_ok = (1..fragments).all(|offset| {
            bundle
                .transactions()
                .get(index + offset)
                .is_some_and(|tx| tx.address == address && tx.value == 0)
        });
        if !continuation_ok {
            return Err(Error::InvalidTransferSpec(format!(
                "input {address} needs {fragments} consecutive entries"
            )));
        }

        let key = derive_key(&seed, input.key_index, input.security);
        for (offset, key_fragment) in key.chunks_exact(KEY_FRAGMENT_LENGTH).enumerate() {
            let signature =
                signature_fragment(normalized_fragment(&normalized, offset), key_fragment);
            bundle.set_signature_fragment(index + offset, trits_to_trytes(&signature)?);
        }
        debug!(entry = index, key_index = input.key_index, fragments, "signed input");
    }

    Ok(bundle)
}

fn find_input<'a>(inputs: &'a [Input], address: &str) -> Result<Option<&'a Input>> {
    for input in inputs {
        if remove_checksum(&input.address)? == address {
            return Ok(Some(input));
        }
    }
    Ok(None)
}
