//! # Bundles and Transactions
//!
//! Construction, signing, serialization, and validation of transaction
//! bundles. A bundle is the atomic unit of value transfer on the ledger: an
//! ordered group of [`Transaction`] entries whose values sum to zero and
//! whose essence hashes to a single bundle hash that every input signs.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — Transfer / Input: what the user asks for
//! codec.rs        — Transaction: the 2673-tryte wire record
//! builder.rs      — BundleBuilder → Bundle, essence hash, message splitting
//! signing.rs      — sign_bundle: fill signature fragments for inputs
//! verification.rs — validate_bundle: sum, order, hash, completeness, signatures
//! ```
//!
//! ## Bundle Lifecycle
//!
//! 1. **Build**: add output, input, and remainder entries to a
//!    [`BundleBuilder`].
//! 2. **Finalize**: [`BundleBuilder::finalize`] fixes indices and computes
//!    the bundle hash. The result is an immutable [`Bundle`].
//! 3. **Sign**: [`sign_bundle`] fills the signature fragments of spending
//!    entries. Nothing else changes.
//! 4. **Attach**: [`Bundle::to_trytes`] yields head-first trytes for the
//!    node's attach step.
//! 5. **Validate**: anything read back from a node goes through
//!    [`validate_bundle`].

pub mod builder;
pub mod codec;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{split_message, Bundle, BundleBuilder};
pub use codec::{hash_trytes, Transaction};
pub use signing::sign_bundle;
pub use types::{Input, Inputs, Transfer};
pub use verification::validate_bundle;
