//! Bytes and text as trytes.
//!
//! Each byte becomes two trytes: `ALPHABET[b % 27]` followed by
//! `ALPHABET[b / 27]`. Since `255 = 12 + 9 * 27`, every byte fits and the
//! second tryte never goes past `I`. This is how human-readable messages end
//! up in signature-message fragments.

use super::converter::TRYTE_ALPHABET;
use super::TernaryError;

/// Encode raw bytes as trytes (two per byte).
pub fn bytes_to_trytes(bytes: &[u8]) -> String {
    let alphabet = TRYTE_ALPHABET.as_bytes();
    let mut trytes = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        trytes.push(alphabet[(byte % 27) as usize] as char);
        trytes.push(alphabet[(byte / 27) as usize] as char);
    }
    trytes
}

/// Decode trytes produced by [`bytes_to_trytes`].
///
/// # Errors
///
/// - [`TernaryError::InvalidLength`] for an odd number of trytes.
/// - [`TernaryError::InvalidTryte`] for characters outside the alphabet, or
///   for a pair that encodes a value above 255.
pub fn trytes_to_bytes(trytes: &str) -> Result<Vec<u8>, TernaryError> {
    let chars: Vec<char> = trytes.chars().collect();
    if chars.len() % 2 != 0 {
        return Err(TernaryError::InvalidLength {
            what: "byte-encoded trytes",
            expected: "an even number".to_string(),
            actual: chars.len(),
        });
    }

    let mut bytes = Vec::with_capacity(chars.len() / 2);
    for (pair_index, pair) in chars.chunks(2).enumerate() {
        let position = pair_index * 2;
        let low = alphabet_index(pair[0], position)?;
        let high = alphabet_index(pair[1], position + 1)?;
        let value = low + high * 27;
        let byte = u8::try_from(value).map_err(|_| TernaryError::InvalidTryte {
            character: pair[1],
            position: position + 1,
        })?;
        bytes.push(byte);
    }
    Ok(bytes)
}

/// Encode a UTF-8 string as trytes.
///
/// ```
/// use trinary_protocol::ternary::str_to_trytes;
///
/// assert_eq!(str_to_trytes("Z"), "IC");
/// ```
pub fn str_to_trytes(text: &str) -> String {
    bytes_to_trytes(text.as_bytes())
}

/// Decode trytes back into a UTF-8 string.
///
/// Trailing `9` padding (as found in signature-message fragments) should be
/// stripped by the caller first; a lone trailing `9` would otherwise make the
/// length odd.
pub fn trytes_to_string(trytes: &str) -> Result<String, TernaryError> {
    let bytes = trytes_to_bytes(trytes)?;
    String::from_utf8(bytes).map_err(|e| TernaryError::InvalidLength {
        what: "UTF-8 text",
        expected: "valid UTF-8".to_string(),
        actual: e.utf8_error().valid_up_to(),
    })
}

fn alphabet_index(character: char, position: usize) -> Result<u32, TernaryError> {
    TRYTE_ALPHABET
        .find(character)
        .map(|i| i as u32)
        .ok_or(TernaryError::InvalidTryte { character, position })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_encodings() {
        // 'Z' = 90 = 9 + 3 * 27
        assert_eq!(str_to_trytes("Z"), "IC");
        // ' ' = 32 = 5 + 1 * 27
        assert_eq!(str_to_trytes(" "), "EA");
        assert_eq!(bytes_to_trytes(&[0]), "99");
        assert_eq!(bytes_to_trytes(&[255]), "LI");
    }

    #[test]
    fn every_byte_round_trips() {
        let all: Vec<u8> = (0..=255).collect();
        let trytes = bytes_to_trytes(&all);
        assert_eq!(trytes.len(), 512);
        assert_eq!(trytes_to_bytes(&trytes).unwrap(), all);
    }

    #[test]
    fn text_round_trip() {
        let message = "Hello, ternary world! ∴";
        let trytes = str_to_trytes(message);
        assert_eq!(trytes_to_string(&trytes).unwrap(), message);
    }

    #[test]
    fn odd_length_rejected() {
        assert!(matches!(
            trytes_to_bytes("ABC"),
            Err(TernaryError::InvalidLength { .. })
        ));
    }

    #[test]
    fn pair_above_byte_range_rejected() {
        // 'Z' (26) + 'Z' (26) * 27 = 728 > 255
        assert!(matches!(
            trytes_to_bytes("ZZ"),
            Err(TernaryError::InvalidTryte { position: 1, .. })
        ));
    }

    #[test]
    fn non_alphabet_rejected() {
        assert!(trytes_to_bytes("a9").is_err());
    }
}
