//! # Curl Sponge
//!
//! The ledger's one and only hash primitive. A 729-trit state, split
//! logically into three 243-trit thirds, stirred by a fixed substitution
//! transform. Input is absorbed 243 trits at a time into the first third;
//! output is squeezed 243 trits at a time from the same place.
//!
//! ## The transform
//!
//! Each round copies the state, then rewrites every position from a pair of
//! trits in the copy: the trit at a moving cursor `p` and the trit at
//! `p' = p + 364` (or `p - 365` once past the midpoint). The pair indexes a
//! nine-entry truth table. Because 364 and 729 are coprime the cursor visits
//! every position exactly once per round and lands back on zero.
//!
//! ## Ownership
//!
//! A [`Curl`] is a plain value. There is no global instance and no implicit
//! reset: a session starts with a fresh (or explicitly [`reset`](Curl::reset))
//! state, absorbs, squeezes, and that's it. Need hashing on two threads?
//! Make two `Curl`s.

use crate::config::{HASH_LENGTH, NUMBER_OF_ROUNDS, STATE_LENGTH};
use crate::ternary::Trit;

/// Substitution table indexed by `a + 3b + 4` for `a, b` in `{-1, 0, 1}`.
const TRUTH_TABLE: [Trit; 9] = [1, 0, -1, 1, -1, 0, -1, 1, 0];

/// A ternary sponge with a caller-chosen number of rounds.
#[derive(Clone)]
pub struct Curl {
    state: [Trit; STATE_LENGTH],
    rounds: usize,
}

impl Curl {
    /// A zeroed sponge with the default 81 rounds.
    pub fn new() -> Self {
        Self::with_rounds(NUMBER_OF_ROUNDS)
    }

    /// A zeroed sponge with a custom round count (e.g. 27).
    pub fn with_rounds(rounds: usize) -> Self {
        Self {
            state: [0; STATE_LENGTH],
            rounds,
        }
    }

    /// Number of rounds this sponge applies per transform.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Zero the whole state. Required before reusing a sponge for an
    /// unrelated hash.
    pub fn reset(&mut self) {
        self.state = [0; STATE_LENGTH];
    }

    /// Absorb trits, one 243-trit block at a time.
    ///
    /// A short final block overwrites only the head of the rate; the rest of
    /// the state is left as the previous transform produced it. Empty input
    /// still triggers one transform.
    pub fn absorb(&mut self, trits: &[Trit]) {
        let mut chunks = trits.chunks(HASH_LENGTH);
        loop {
            match chunks.next() {
                Some(chunk) => {
                    self.state[..chunk.len()].copy_from_slice(chunk);
                    self.transform();
                }
                None => {
                    if trits.is_empty() {
                        self.transform();
                    }
                    return;
                }
            }
        }
    }

    /// Fill `out` with squeezed trits, 243 at a time, transforming after each
    /// block.
    pub fn squeeze(&mut self, out: &mut [Trit]) {
        if out.is_empty() {
            self.transform();
            return;
        }
        for chunk in out.chunks_mut(HASH_LENGTH) {
            chunk.copy_from_slice(&self.state[..chunk.len()]);
            self.transform();
        }
    }

    /// Squeeze exactly one hash width.
    pub fn squeeze_hash(&mut self) -> [Trit; HASH_LENGTH] {
        let mut out = [0; HASH_LENGTH];
        self.squeeze(&mut out);
        out
    }

    /// Read-only view of the state, mostly for tests and debugging.
    pub fn state(&self) -> &[Trit] {
        &self.state
    }

    fn transform(&mut self) {
        let mut scratch = [0 as Trit; STATE_LENGTH];
        for _ in 0..self.rounds {
            scratch.copy_from_slice(&self.state);
            let mut index = 0usize;
            for slot in self.state.iter_mut() {
                let previous = index;
                index = if index < 365 { index + 364 } else { index - 365 };
                let lookup = scratch[previous] + scratch[index] * 3 + 4;
                *slot = TRUTH_TABLE[lookup as usize];
            }
        }
    }
}

impl Default for Curl {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Curl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The state may hold key material mid-derivation.
        write!(f, "Curl(rounds={})", self.rounds)
    }
}

/// One-shot hash with a fresh 81-round sponge.
pub fn hash(trits: &[Trit]) -> [Trit; HASH_LENGTH] {
    let mut curl = Curl::new();
    curl.absorb(trits);
    curl.squeeze_hash()
}
