// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # TRINARY Protocol — Core Library
//!
//! Client-side engine for a ternary ledger. Everything here works on
//! balanced ternary: trits in `{-1, 0, 1}`, grouped three to a tryte and
//! written with the alphabet `9ABCDEFGHIJKLMNOPQRSTUVWXYZ`.
//!
//! The library turns a secret seed into addresses, turns transfer requests
//! into signed bundles, and turns trytes fetched from a node back into
//! bundles it can prove are well-formed and properly signed. It does not run
//! a node, does not do proof-of-work, and never sends the seed anywhere.
//!
//! ## Architecture
//!
//! The modules mirror the data flow, bottom to top:
//!
//! - **ternary** — Trytes, trits, integers, bytes. The only codec.
//! - **crypto** — The Curl sponge, key derivation, addresses, one-time
//!   signatures, checksums.
//! - **transaction** — The 2673-tryte record, bundle building, essence
//!   hashing, signing, validation.
//! - **network** — The `NodeApi` trait the client talks through, plus an
//!   in-memory node.
//! - **client** — Whole operations: addresses, inputs, transfers, bundle
//!   retrieval, history.
//! - **config** — Every protocol constant and the per-operation options.
//! - **error** — The crate-wide error type.
//!
//! ## Ground Rules
//!
//! 1. One hash primitive. Curl hashes bundles, keys, addresses, and
//!    transactions alike.
//! 2. Sponge state is owned by the caller. No global instance, no implicit
//!    reset.
//! 3. A one-time key signs once. The client refuses to spend from an address
//!    the node shows as already spent from.
//! 4. If it touches value, it has tests. Plural.

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod network;
pub mod ternary;
pub mod transaction;

pub use client::Client;
pub use error::{Error, Result};
