//! Shape checks for tryte strings.
//!
//! Cheap, allocation-free predicates used to fail fast before any hashing or
//! node traffic happens.

use super::converter::tryte_value;
use super::TernaryError;
use crate::config::{ADDRESS_CHECKSUM_TRYTES, HASH_TRYTES};

/// Returns `true` if every character is a tryte and, when `length` is given,
/// the string has exactly that many characters.
pub fn is_trytes(value: &str, length: Option<usize>) -> bool {
    if let Some(expected) = length {
        if value.len() != expected {
            return false;
        }
    }
    value.chars().all(|c| tryte_value(c).is_some())
}

/// An 81-tryte hash (transaction hash, bundle hash, bare address).
pub fn is_hash(value: &str) -> bool {
    is_trytes(value, Some(HASH_TRYTES))
}

/// An address, with or without its 9-tryte checksum.
pub fn is_address(value: &str) -> bool {
    is_hash(value) || is_trytes(value, Some(HASH_TRYTES + ADDRESS_CHECKSUM_TRYTES))
}

/// Like [`is_trytes`], but reports what is wrong.
pub fn validate_trytes(
    what: &'static str,
    value: &str,
    length: Option<usize>,
) -> Result<(), TernaryError> {
    if let Some((position, character)) = value
        .chars()
        .enumerate()
        .find(|(_, c)| tryte_value(*c).is_none())
    {
        return Err(TernaryError::InvalidTryte { character, position });
    }
    if let Some(expected) = length {
        if value.len() != expected {
            return Err(TernaryError::InvalidLength {
                what,
                expected: expected.to_string(),
                actual: value.len(),
            });
        }
    }
    Ok(())
}
