//! Address checksums.
//!
//! A checksum is the last 9 trytes of the Curl hash of the 81-tryte address.
//! It exists to catch typos before funds go somewhere nobody owns; it carries
//! no cryptographic weight.

use super::curl;
use crate::config::{ADDRESS_CHECKSUM_TRYTES, HASH_TRYTES};
use crate::ternary::{trits_to_trytes, trytes_to_trits, validate_trytes, TernaryError};

/// Append the 9-tryte checksum to an 81-tryte address.
pub fn add_checksum(address: &str) -> Result<String, TernaryError> {
    validate_trytes("address", address, Some(HASH_TRYTES))?;
    let mut out = String::with_capacity(HASH_TRYTES + ADDRESS_CHECKSUM_TRYTES);
    out.push_str(address);
    out.push_str(&checksum(address)?);
    Ok(out)
}

/// Strip the checksum from a 90-tryte address. An 81-tryte address is
/// returned unchanged.
pub fn remove_checksum(address: &str) -> Result<String, TernaryError> {
    validate_trytes("address", address, None)?;
    match address.len() {
        HASH_TRYTES => Ok(address.to_string()),
        n if n == HASH_TRYTES + ADDRESS_CHECKSUM_TRYTES => Ok(address[..HASH_TRYTES].to_string()),
        actual => Err(TernaryError::InvalidLength {
            what: "address",
            expected: "81 or 90".to_string(),
            actual,
        }),
    }
}

/// Does this 90-tryte address carry the right checksum?
pub fn is_valid_checksum(address: &str) -> Result<bool, TernaryError> {
    validate_trytes("address", address, Some(HASH_TRYTES + ADDRESS_CHECKSUM_TRYTES))?;
    let (bare, given) = address.split_at(HASH_TRYTES);
    Ok(checksum(bare)? == given)
}

fn checksum(address: &str) -> Result<String, TernaryError> {
    let hash = trits_to_trytes(&curl::hash(&trytes_to_trits(address)?))?;
    Ok(hash[HASH_TRYTES - ADDRESS_CHECKSUM_TRYTES..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str =
        "JEUFD9BHVP9SV9JHZURXTZF9YXFOPABAHVRXTTYRMP9KZIABVMPFFDIJPYFWKYNMQBYITQZCMTYNHAZX9";

    #[test]
    fn known_checksums() {
        assert_eq!(&add_checksum(ADDRESS).unwrap()[81..], "EKEKGOXYH");
        let other = "VQFY9PZUCBVPEAAMQPQLEODRYSTNTIMHFQMUOLCGCZW9CJDKJUHKQTBGSHNULTMAMKUV9FNXVQSRHNXEG";
        assert_eq!(&add_checksum(other).unwrap()[81..], "YIARBRG9K");
    }

    #[test]
    fn add_then_validate_then_remove() {
        let full = add_checksum(ADDRESS).unwrap();
        assert!(is_valid_checksum(&full).unwrap());
        assert_eq!(remove_checksum(&full).unwrap(), ADDRESS);
        assert_eq!(remove_checksum(ADDRESS).unwrap(), ADDRESS);
    }

    #[test]
    fn typo_is_caught() {
        let mut full = add_checksum(ADDRESS).unwrap();
        full.replace_range(0..1, "K");
        assert!(!is_valid_checksum(&full).unwrap());
    }

    #[test]
    fn wrong_lengths() {
        assert!(add_checksum(&ADDRESS[..80]).is_err());
        assert!(remove_checksum(&"A".repeat(85)).is_err());
        assert!(is_valid_checksum(ADDRESS).is_err());
    }
}
