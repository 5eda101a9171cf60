//! Random seed generation.

use rand::rngs::OsRng;
use rand::Rng;

use crate::config::SEED_TRYTES;
use crate::ternary::TRYTE_ALPHABET;

/// Generate an 81-tryte seed from the operating system's CSPRNG.
///
/// The seed is the only secret a wallet has. Every key, address and signature
/// derives from it, so it should never be logged.
pub fn generate_seed() -> String {
    let alphabet = TRYTE_ALPHABET.as_bytes();
    (0..SEED_TRYTES)
        .map(|_| alphabet[OsRng.gen_range(0..alphabet.len())] as char)
        .collect()
}
