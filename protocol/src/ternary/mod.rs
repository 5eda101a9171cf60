//! # Ternary Codec
//!
//! Everything on the ledger is balanced ternary. Hashes, addresses, values,
//! signatures: all of it is trits (`-1`, `0`, `1`) grouped into trytes of
//! three, displayed with the 27-symbol alphabet `9ABCDEFGHIJKLMNOPQRSTUVWXYZ`.
//!
//! This module is the only place where characters become trits and trits
//! become integers. Every other module works on `&[Trit]` or on tryte
//! strings that have already passed through here.
//!
//! ## Layout
//!
//! ```text
//! converter.rs  — trytes <-> trits, integers <-> trits, balanced increment
//! ascii.rs      — bytes / UTF-8 strings <-> trytes (two trytes per byte)
//! validators.rs — shape checks for tryte strings, hashes, and addresses
//! ```

pub mod ascii;
pub mod converter;
pub mod validators;

use thiserror::Error;

pub use ascii::{bytes_to_trytes, str_to_trytes, trytes_to_bytes, trytes_to_string};
pub use converter::{
    increment_trits, int_to_trits, int_to_trits_padded, trits_to_int, trits_to_trytes,
    trytes_to_trits, Trit, TRYTE_ALPHABET,
};
pub use validators::{is_address, is_hash, is_trytes, validate_trytes};

/// Errors raised at the codec boundary.
///
/// These all mean the same thing to a caller ("this is not well-formed
/// ternary data") but carry enough detail to find the offending position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TernaryError {
    /// A character outside the tryte alphabet.
    #[error("invalid tryte {character:?} at position {position}")]
    InvalidTryte { character: char, position: usize },

    /// A trit value outside `{-1, 0, 1}`.
    #[error("invalid trit {value} at position {position}")]
    InvalidTrit { value: i8, position: usize },

    /// Input of the wrong size for the structure being decoded.
    #[error("invalid length for {what}: expected {expected}, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: String,
        actual: usize,
    },

    /// An integer that does not fit the requested trit width, or trits that
    /// do not fit an `i64`.
    #[error("integer overflow: {0}")]
    Overflow(String),
}
