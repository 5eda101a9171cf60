//! Conversions between trytes, trits, and signed integers.
//!
//! Trits are little-endian balanced ternary: the first trit of a group is the
//! least significant. A tryte is three trits, so its value lies in
//! `[-13, 13]`. The alphabet maps `9` to 0, `A..M` to 1..13, and `N..Z` to
//! -13..-1.

use super::TernaryError;

/// A single balanced-ternary digit. Always one of `-1`, `0`, `1`.
pub type Trit = i8;

/// The 27 tryte symbols, indexed by unsigned value (`9` = 0, `Z` = 26 ≡ -1).
pub const TRYTE_ALPHABET: &str = "9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of trits in one tryte.
pub const TRITS_PER_TRYTE: usize = 3;

const ALPHABET_BYTES: &[u8; 27] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Returns the signed value (`-13..=13`) of a tryte character, or `None` if
/// it is not in the alphabet.
pub fn tryte_value(c: char) -> Option<i8> {
    let index = match c {
        '9' => 0,
        'A'..='Z' => c as u8 - b'A' + 1,
        _ => return None,
    };
    Some(if index > 13 {
        index as i8 - 27
    } else {
        index as i8
    })
}

/// Returns the tryte character for a signed value in `-13..=13`.
pub(crate) fn tryte_char(value: i8) -> char {
    let index = if value < 0 { value + 27 } else { value };
    ALPHABET_BYTES[index as usize] as char
}

/// Convert a tryte string to trits (three per tryte).
///
/// # Errors
///
/// [`TernaryError::InvalidTryte`] on the first character outside the alphabet.
///
/// # Example
///
/// ```
/// use trinary_protocol::ternary::trytes_to_trits;
///
/// assert_eq!(trytes_to_trits("A9Z").unwrap(), vec![1, 0, 0, 0, 0, 0, -1, 0, 0]);
/// ```
pub fn trytes_to_trits(trytes: &str) -> Result<Vec<Trit>, TernaryError> {
    let mut trits = Vec::with_capacity(trytes.len() * TRITS_PER_TRYTE);
    for (position, character) in trytes.chars().enumerate() {
        let value =
            tryte_value(character).ok_or(TernaryError::InvalidTryte { character, position })?;
        trits.extend_from_slice(&small_value_trits(value));
    }
    Ok(trits)
}

/// Convert trits back to a tryte string.
///
/// # Errors
///
/// - [`TernaryError::InvalidLength`] if the trit count is not a multiple of 3.
/// - [`TernaryError::InvalidTrit`] if any trit is outside `{-1, 0, 1}`.
pub fn trits_to_trytes(trits: &[Trit]) -> Result<String, TernaryError> {
    if trits.len() % TRITS_PER_TRYTE != 0 {
        return Err(TernaryError::InvalidLength {
            what: "trits",
            expected: "a multiple of 3".to_string(),
            actual: trits.len(),
        });
    }
    if let Some(position) = trits.iter().position(|t| !(-1..=1).contains(t)) {
        return Err(TernaryError::InvalidTrit {
            value: trits[position],
            position,
        });
    }

    Ok(trits
        .chunks(TRITS_PER_TRYTE)
        .map(|t| tryte_char(t[0] + t[1] * 3 + t[2] * 9))
        .collect())
}

/// Encode a signed integer as the shortest little-endian balanced-ternary
/// trit sequence. Zero encodes as an empty vector.
pub fn int_to_trits(value: i64) -> Vec<Trit> {
    let mut trits = Vec::new();
    // i128 so that i64::MIN has an absolute value.
    let mut remaining = (value as i128).abs();

    while remaining > 0 {
        let mut remainder = (remaining % 3) as Trit;
        remaining /= 3;
        if remainder > 1 {
            remainder = -1;
            remaining += 1;
        }
        trits.push(remainder);
    }

    if value < 0 {
        for trit in trits.iter_mut() {
            *trit = -*trit;
        }
    }
    trits
}

/// Encode a signed integer into exactly `width` trits, zero-padded.
///
/// # Errors
///
/// [`TernaryError::Overflow`] if the value needs more than `width` trits.
pub fn int_to_trits_padded(value: i64, width: usize) -> Result<Vec<Trit>, TernaryError> {
    let mut trits = int_to_trits(value);
    if trits.len() > width {
        return Err(TernaryError::Overflow(format!(
            "{value} does not fit in {width} trits"
        )));
    }
    trits.resize(width, 0);
    Ok(trits)
}

/// Decode little-endian balanced trits into an `i64`.
///
/// # Errors
///
/// [`TernaryError::Overflow`] if the encoded value is outside the `i64` range.
pub fn trits_to_int(trits: &[Trit]) -> Result<i64, TernaryError> {
    let overflow = || TernaryError::Overflow(format!("{} trits exceed i64", trits.len()));

    let mut value: i128 = 0;
    for &trit in trits.iter().rev() {
        value = value
            .checked_mul(3)
            .and_then(|v| v.checked_add(trit as i128))
            .ok_or_else(overflow)?;
    }
    i64::try_from(value).map_err(|_| overflow())
}

/// Add one to a balanced-ternary number in place.
///
/// A carry out of the most significant trit is dropped, so the all-ones
/// value wraps to all minus-ones. Used for seed index offsetting and for
/// bumping a bundle's obsolete tag.
pub fn increment_trits(trits: &mut [Trit]) {
    for trit in trits.iter_mut() {
        *trit += 1;
        if *trit > 1 {
            *trit = -1;
        } else {
            return;
        }
    }
}

fn small_value_trits(value: i8) -> [Trit; 3] {
    let mut out = [0; 3];
    let mut remaining = value.abs();
    for trit in out.iter_mut() {
        let mut remainder = remaining % 3;
        remaining /= 3;
        if remainder > 1 {
            remainder = -1;
            remaining += 1;
        }
        *trit = if value < 0 { -remainder } else { remainder };
    }
    out
}
