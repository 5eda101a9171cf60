//! # One-Time Signatures
//!
//! A Winternitz-style hash-chain signature over ternary. The idea fits in a
//! paragraph: a private key chunk hashed 26 times is public; to sign a tryte
//! value `n` in `[-13, 13]` you reveal the chunk hashed `13 - n` times; the
//! verifier hashes it the remaining `13 + n` times and must land on the public
//! value. Twenty-seven chunks sign twenty-seven trytes, one key fragment per
//! third of the (normalized) bundle hash.
//!
//! ## Layout
//!
//! ```text
//! key       = security × fragment
//! fragment  = 27 chunks × 243 trits  (= 2187 trytes, one signature field)
//! digest    = hash(chunk₀ʰ²⁶ ‖ … ‖ chunk₂₆ʰ²⁶)        per fragment
//! address   = hash(digest₀ ‖ … ‖ digestₛ₋₁)
//! ```
//!
//! ## One time means one time
//!
//! Every signature reveals intermediate chain values. Sign two different
//! hashes with the same key and an attacker can forge anything "between"
//! them. Nothing in this module can stop you from doing that; the client layer
//! refuses to spend from an address that has already been spent from, and you
//! should never bypass it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::checksum::remove_checksum;
use super::curl::{self, Curl};
use crate::config::{
    CHUNKS_PER_FRAGMENT, DIGEST_HASH_ROUNDS, HASH_LENGTH, HASH_TRYTES, KEY_FRAGMENT_LENGTH,
    MAX_TRYTE_VALUE, SEED_TRYTES,
};
use crate::ternary::converter::tryte_value;
use crate::ternary::{
    increment_trits, trits_to_trytes, trytes_to_trits, validate_trytes, TernaryError, Trit,
};

/// Number of normalized trytes covered by one signature fragment.
pub const NORMALIZED_FRAGMENT_LENGTH: usize = CHUNKS_PER_FRAGMENT;

// ---------------------------------------------------------------------------
// Security Level
// ---------------------------------------------------------------------------

/// How many key fragments protect one address.
///
/// Each level adds one 2187-tryte fragment to every signature, so level 2
/// inputs occupy two transactions in a bundle. Level 2 is the default and
/// what wallets use in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SecurityLevel {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
}

/// A security level outside `1..=3`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("security level must be 1, 2 or 3, got {0}")]
pub struct InvalidSecurityLevel(pub u8);

impl SecurityLevel {
    /// Number of key fragments (and signature transactions) at this level.
    pub fn fragments(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = InvalidSecurityLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(InvalidSecurityLevel(other)),
        }
    }
}

impl From<SecurityLevel> for u8 {
    fn from(level: SecurityLevel) -> Self {
        level as u8
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

// ---------------------------------------------------------------------------
// Keys, Digests, Addresses
// ---------------------------------------------------------------------------

/// Convert a seed to trits, padding it with `9` to a multiple of 81 trytes.
///
/// # Errors
///
/// - [`TernaryError::InvalidTryte`] if the seed is not trytes.
/// - [`TernaryError::InvalidLength`] for an empty seed.
pub fn seed_trits(seed: &str) -> Result<Vec<Trit>, TernaryError> {
    validate_trytes("seed", seed, None)?;
    if seed.is_empty() {
        return Err(TernaryError::InvalidLength {
            what: "seed",
            expected: "at least 1 tryte".to_string(),
            actual: 0,
        });
    }

    let mut padded = seed.to_string();
    while padded.len() % SEED_TRYTES != 0 {
        padded.push('9');
    }
    trytes_to_trits(&padded)
}

/// Derive the private key at `index`.
///
/// The index is added to the first 243 seed trits, the result hashed into a
/// subseed, and the subseed absorbed into a fresh sponge from which
/// `security × 6561` key trits are squeezed. Pure: same inputs, same key.
pub fn derive_key(seed: &[Trit], index: usize, security: SecurityLevel) -> Vec<Trit> {
    let mut subseed = seed.to_vec();
    let offset_width = subseed.len().min(HASH_LENGTH);
    for _ in 0..index {
        increment_trits(&mut subseed[..offset_width]);
    }

    let mut curl = Curl::new();
    curl.absorb(&subseed);
    curl.squeeze(&mut subseed);
    curl.reset();
    curl.absorb(&subseed);

    let mut key = vec![0; security.fragments() * KEY_FRAGMENT_LENGTH];
    curl.squeeze(&mut key);
    key
}

/// Public digests of a private key, one 243-trit digest per fragment.
pub fn digests(key: &[Trit]) -> Vec<Trit> {
    let fragments = key.len() / KEY_FRAGMENT_LENGTH;
    let mut out = Vec::with_capacity(fragments * HASH_LENGTH);

    for fragment in key.chunks_exact(KEY_FRAGMENT_LENGTH) {
        let mut fragment_curl = Curl::new();
        for chunk in fragment.chunks_exact(HASH_LENGTH) {
            fragment_curl.absorb(&hash_chain(chunk, DIGEST_HASH_ROUNDS));
        }
        out.extend_from_slice(&fragment_curl.squeeze_hash());
    }
    out
}

/// Address trits from concatenated fragment digests.
pub fn address_from_digests(digests: &[Trit]) -> [Trit; HASH_LENGTH] {
    curl::hash(digests)
}

/// Derive the 81-tryte address for `(seed, index, security)`.
///
/// This is the full key → digests → address pipeline, roughly 1400 sponge
/// invocations per security level. Not something to call in a tight loop.
///
/// # Example
///
/// ```
/// use trinary_protocol::crypto::{generate_address, SecurityLevel};
///
/// let seed = "A".repeat(81);
/// let address = generate_address(&seed, 0, SecurityLevel::Low).unwrap();
/// assert_eq!(address.len(), 81);
/// ```
pub fn generate_address(
    seed: &str,
    index: usize,
    security: SecurityLevel,
) -> Result<String, TernaryError> {
    let key = derive_key(&seed_trits(seed)?, index, security);
    trits_to_trytes(&address_from_digests(&digests(&key)))
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize an 81-tryte hash for signing.
///
/// Each tryte becomes its value in `[-13, 13]`; then each 27-value third is
/// nudged until it sums to zero (decrementing the first value above -13 while
/// the sum is positive, incrementing the first value below 13 while it is
/// negative). A zero-sum third means revealing a lower chain value for one
/// tryte forces a higher one elsewhere, which is what blocks forgery.
///
/// # Errors
///
/// [`TernaryError`] if the hash is not 81 trytes.
pub fn normalize_hash(hash: &str) -> Result<[i8; HASH_TRYTES], TernaryError> {
    validate_trytes("bundle hash", hash, Some(HASH_TRYTES))?;

    let mut normalized = [0i8; HASH_TRYTES];
    for (slot, character) in normalized.iter_mut().zip(hash.chars()) {
        // Validated above.
        *slot = tryte_value(character).unwrap_or(0);
    }

    for third in normalized.chunks_mut(NORMALIZED_FRAGMENT_LENGTH) {
        let mut sum: i32 = third.iter().map(|v| *v as i32).sum();
        while sum > 0 {
            if let Some(value) = third.iter_mut().find(|v| **v > -MAX_TRYTE_VALUE) {
                *value -= 1;
            }
            sum -= 1;
        }
        while sum < 0 {
            if let Some(value) = third.iter_mut().find(|v| **v < MAX_TRYTE_VALUE) {
                *value += 1;
            }
            sum += 1;
        }
    }
    Ok(normalized)
}

/// The normalized third of `normalized` that signature fragment `index` signs.
pub fn normalized_fragment(normalized: &[i8; HASH_TRYTES], index: usize) -> &[i8] {
    let third = index % 3;
    &normalized[third * NORMALIZED_FRAGMENT_LENGTH..(third + 1) * NORMALIZED_FRAGMENT_LENGTH]
}

// ---------------------------------------------------------------------------
// Signing and Verification
// ---------------------------------------------------------------------------

/// Sign one normalized third with one key fragment.
///
/// Chunk `i` of the key fragment is hashed `13 - nᵢ` times.
pub fn signature_fragment(normalized_fragment: &[i8], key_fragment: &[Trit]) -> Vec<Trit> {
    let mut signature = Vec::with_capacity(KEY_FRAGMENT_LENGTH);
    for (chunk, &value) in key_fragment
        .chunks_exact(HASH_LENGTH)
        .zip(normalized_fragment.iter())
    {
        let times = (MAX_TRYTE_VALUE - value) as usize;
        signature.extend_from_slice(&hash_chain(chunk, times));
    }
    signature
}

/// Recover the digest a signature fragment commits to.
///
/// Chunk `i` is hashed `13 + nᵢ` times, completing the 26-step chain, and the
/// 27 results are hashed together. For a genuine signature this equals the
/// corresponding entry of [`digests`].
pub fn digest(normalized_fragment: &[i8], signature_fragment: &[Trit]) -> [Trit; HASH_LENGTH] {
    let mut curl = Curl::new();
    for (chunk, &value) in signature_fragment
        .chunks_exact(HASH_LENGTH)
        .zip(normalized_fragment.iter())
    {
        let times = (MAX_TRYTE_VALUE + value) as usize;
        curl.absorb(&hash_chain(chunk, times));
    }
    curl.squeeze_hash()
}

/// Sign an 81-tryte hash with the key at `(seed, index, security)`.
///
/// Returns one 2187-tryte fragment per security level.
pub fn sign(
    seed: &str,
    index: usize,
    security: SecurityLevel,
    hash: &str,
) -> Result<Vec<String>, TernaryError> {
    let normalized = normalize_hash(hash)?;
    let key = derive_key(&seed_trits(seed)?, index, security);

    key.chunks_exact(KEY_FRAGMENT_LENGTH)
        .enumerate()
        .map(|(i, key_fragment)| {
            trits_to_trytes(&signature_fragment(
                normalized_fragment(&normalized, i),
                key_fragment,
            ))
        })
        .collect()
}

/// Verify signature fragments against an address.
///
/// Fragment `i` is checked against normalized third `i % 3`. The address may
/// carry a checksum; only its first 81 trytes are compared.
///
/// # Errors
///
/// [`TernaryError`] if the address, hash, or any fragment is malformed. A
/// well-formed but wrong signature is `Ok(false)`.
pub fn validate_signatures(
    expected_address: &str,
    signature_fragments: &[String],
    bundle_hash: &str,
) -> Result<bool, TernaryError> {
    let expected = remove_checksum(expected_address)?;
    let normalized = normalize_hash(bundle_hash)?;

    let mut fragment_digests = Vec::with_capacity(signature_fragments.len() * HASH_LENGTH);
    for (i, fragment) in signature_fragments.iter().enumerate() {
        let trits = trytes_to_trits(fragment)?;
        if trits.len() != KEY_FRAGMENT_LENGTH {
            return Err(TernaryError::InvalidLength {
                what: "signature fragment",
                expected: (KEY_FRAGMENT_LENGTH / 3).to_string(),
                actual: fragment.len(),
            });
        }
        fragment_digests.extend_from_slice(&digest(normalized_fragment(&normalized, i), &trits));
    }

    let address = trits_to_trytes(&address_from_digests(&fragment_digests))?;
    Ok(address == expected)
}

/// Hash a 243-trit chunk `times` times in a row.
fn hash_chain(chunk: &[Trit], times: usize) -> [Trit; HASH_LENGTH] {
    let mut buffer = [0; HASH_LENGTH];
    buffer.copy_from_slice(chunk);
    let mut curl = Curl::new();
    for _ in 0..times {
        curl.reset();
        curl.absorb(&buffer);
        curl.squeeze(&mut buffer);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLDEN_SEED: &str =
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    const HASH: &str =
        "NKBFSZDQOBI9DYYHTEJ9JNGSPHBXPUSKTGQFQGFCFIIQEJZFXXYGGFMK9UEZOINOGDLJCBALHRGT9WNJR";

    #[test]
    fn golden_address_security_two() {
        assert_eq!(
            generate_address(GOLDEN_SEED, 0, SecurityLevel::Medium).unwrap(),
            "JEUFD9BHVP9SV9JHZURXTZF9YXFOPABAHVRXTTYRMP9KZIABVMPFFDIJPYFWKYNMQBYITQZCMTYNHAZX9"
        );
    }

    #[test]
    fn golden_addresses_security_one() {
        assert_eq!(
            generate_address(GOLDEN_SEED, 0, SecurityLevel::Low).unwrap(),
            "VQFY9PZUCBVPEAAMQPQLEODRYSTNTIMHFQMUOLCGCZW9CJDKJUHKQTBGSHNULTMAMKUV9FNXVQSRHNXEG"
        );
        assert_eq!(
            generate_address(GOLDEN_SEED, 1, SecurityLevel::Low).unwrap(),
            "GUHMCQXLCNJVH9CASPECPERIYCUKLVRNJ9BR9TDGBJUUJSDFVQZWBPTNCTHJEXBNBFNCSWTCH9JIKIRRB"
        );
    }

    #[test]
    fn key_derivation_is_deterministic() {
        let seed = seed_trits(GOLDEN_SEED).unwrap();
        let a = derive_key(&seed, 3, SecurityLevel::Medium);
        let b = derive_key(&seed, 3, SecurityLevel::Medium);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2 * KEY_FRAGMENT_LENGTH);
        assert_ne!(a, derive_key(&seed, 4, SecurityLevel::Medium));
    }

    #[test]
    fn higher_security_extends_the_same_key() {
        // The key stream is squeezed from one sponge, so level 1 is a prefix
        // of level 2.
        let seed = seed_trits(GOLDEN_SEED).unwrap();
        let low = derive_key(&seed, 0, SecurityLevel::Low);
        let medium = derive_key(&seed, 0, SecurityLevel::Medium);
        assert_eq!(&medium[..KEY_FRAGMENT_LENGTH], &low[..]);
    }

    #[test]
    fn short_seed_is_padded() {
        let short = seed_trits("ABC").unwrap();
        let padded = seed_trits(&format!("ABC{}", "9".repeat(78))).unwrap();
        assert_eq!(short, padded);
        assert_eq!(short.len(), HASH_LENGTH);
    }

    #[test]
    fn bad_seeds_rejected() {
        assert!(matches!(seed_trits(""), Err(TernaryError::InvalidLength { .. })));
        assert!(matches!(seed_trits("abc"), Err(TernaryError::InvalidTryte { .. })));
    }

    #[test]
    fn normalized_thirds_sum_to_zero() {
        let normalized = normalize_hash(HASH).unwrap();
        for third in normalized.chunks(NORMALIZED_FRAGMENT_LENGTH) {
            assert_eq!(third.iter().map(|v| *v as i32).sum::<i32>(), 0);
            assert!(third.iter().all(|v| (-13..=13).contains(v)));
        }
        assert_eq!(&normalized[..5], &[-13, 10, 2, 6, -8]);
    }

    #[test]
    fn normalize_pushes_large_sums_down() {
        // 27 'M's sum to 351: thirteen values drop all the way to -13 and
        // the fourteenth absorbs the last 13.
        let hash = "M".repeat(81);
        let normalized = normalize_hash(&hash).unwrap();
        let mut expected = [MAX_TRYTE_VALUE; NORMALIZED_FRAGMENT_LENGTH];
        expected[..13].fill(-MAX_TRYTE_VALUE);
        expected[13] = 0;
        for third in normalized.chunks(NORMALIZED_FRAGMENT_LENGTH) {
            assert_eq!(third, &expected[..]);
        }
    }

    #[test]
    fn normalize_rejects_wrong_length() {
        assert!(normalize_hash("ABC").is_err());
    }

    #[test]
    fn sign_then_verify_security_one() {
        let address = generate_address(GOLDEN_SEED, 1, SecurityLevel::Low).unwrap();
        let signature = sign(GOLDEN_SEED, 1, SecurityLevel::Low, HASH).unwrap();
        assert_eq!(signature.len(), 1);
        assert_eq!(signature[0].len(), 2187);
        assert!(validate_signatures(&address, &signature, HASH).unwrap());
    }

    #[test]
    fn sign_then_verify_security_two_with_checksum() {
        let address = generate_address(GOLDEN_SEED, 0, SecurityLevel::Medium).unwrap();
        let with_checksum = crate::crypto::add_checksum(&address).unwrap();
        let signature = sign(GOLDEN_SEED, 0, SecurityLevel::Medium, HASH).unwrap();
        assert_eq!(signature.len(), 2);
        assert!(validate_signatures(&with_checksum, &signature, HASH).unwrap());
    }

    #[test]
    fn signature_for_other_hash_fails() {
        let address = generate_address(GOLDEN_SEED, 0, SecurityLevel::Low).unwrap();
        let signature = sign(GOLDEN_SEED, 0, SecurityLevel::Low, HASH).unwrap();
        // Swapping the second and third trytes keeps the sum but moves
        // where normalization lands.
        let other = format!("{}{}{}{}", &HASH[..1], &HASH[2..3], &HASH[1..2], &HASH[3..]);
        assert_ne!(normalize_hash(&other).unwrap(), normalize_hash(HASH).unwrap());
        assert!(!validate_signatures(&address, &signature, &other).unwrap());
    }

    #[test]
    fn flipped_trit_breaks_signature() {
        let address = generate_address(GOLDEN_SEED, 0, SecurityLevel::Low).unwrap();
        let signature = sign(GOLDEN_SEED, 0, SecurityLevel::Low, HASH).unwrap();

        for position in [0usize, 500, KEY_FRAGMENT_LENGTH - 1] {
            let mut trits = trytes_to_trits(&signature[0]).unwrap();
            trits[position] = if trits[position] == 1 { -1 } else { trits[position] + 1 };
            let tampered = vec![trits_to_trytes(&trits).unwrap()];
            assert!(
                !validate_signatures(&address, &tampered, HASH).unwrap(),
                "flip at {position} still verified"
            );
        }
    }

    #[test]
    fn digest_of_signature_matches_public_digest() {
        let seed = seed_trits(GOLDEN_SEED).unwrap();
        let key = derive_key(&seed, 2, SecurityLevel::Low);
        let public = digests(&key);

        let normalized = normalize_hash(HASH).unwrap();
        let fragment = normalized_fragment(&normalized, 0);
        let signature = signature_fragment(fragment, &key);
        assert_eq!(&digest(fragment, &signature)[..], &public[..]);
    }

    #[test]
    fn truncated_fragment_is_a_format_error() {
        let address = generate_address(GOLDEN_SEED, 0, SecurityLevel::Low).unwrap();
        let result = validate_signatures(&address, &["ABC".to_string()], HASH);
        assert!(matches!(result, Err(TernaryError::InvalidLength { .. })));
    }

    #[test]
    fn security_level_conversions() {
        assert_eq!(SecurityLevel::try_from(2).unwrap(), SecurityLevel::Medium);
        assert_eq!(SecurityLevel::try_from(0), Err(InvalidSecurityLevel(0)));
        assert_eq!(u8::from(SecurityLevel::High), 3);
        assert_eq!(SecurityLevel::default().fragments(), 2);
        assert_eq!(SecurityLevel::Low.to_string(), "1");
    }
}
