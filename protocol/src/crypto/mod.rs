//! # Ternary Cryptography
//!
//! Everything security-related in the client flows through here: the Curl
//! sponge, key derivation from a seed, address generation, and the one-time
//! hash-chain signatures that authorize spending.
//!
//! There is exactly one primitive underneath all of it. Curl hashes bundles,
//! derives keys, builds addresses, produces checksums and walks signature
//! chains. If Curl is wrong, everything is wrong, which is why its tests pin
//! known output vectors rather than just checking round trips.
//!
//! ## Layout
//!
//! ```text
//! curl.rs     — the sponge (absorb / squeeze / transform)
//! signing.rs  — seed → key → digests → address; sign and verify
//! checksum.rs — 9-tryte address checksums
//! seed.rs     — random seed generation
//! ```
//!
//! ## A note on key reuse
//!
//! These are one-time signatures. Signing twice from the same address leaks
//! enough of the key to forge a third signature. The primitives here don't
//! track what has been signed; the client layer does.

pub mod checksum;
pub mod curl;
pub mod seed;
pub mod signing;

pub use checksum::{add_checksum, is_valid_checksum, remove_checksum};
pub use curl::{hash, Curl};
pub use seed::generate_seed;
pub use signing::{
    address_from_digests, derive_key, digest, digests, generate_address, normalize_hash,
    normalized_fragment, seed_trits, sign, signature_fragment, validate_signatures,
    InvalidSecurityLevel, SecurityLevel,
};
