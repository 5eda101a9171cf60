//! # Network Module
//!
//! The client's view of a ledger node. The protocol crate stays
//! transport-agnostic: it defines the [`NodeApi`] trait the client composes
//! over, plus an in-memory implementation for tests and offline use.
//!
//! ## Architecture
//!
//! ```text
//! node.rs   — NodeApi trait, query/tip types, NodeError
//! memory.rs — MemoryNode: NodeApi over parking_lot-guarded maps
//! ```
//!
//! ## Design Decisions
//!
//! - `NodeApi` is `#[async_trait]` and `Send + Sync` so a client can be
//!   shared across tasks and driven from any runtime.
//! - Node errors are surfaced to callers unchanged. There is no retry layer
//!   here; a flaky transport belongs in the adapter, not in the client.
//! - The memory node uses `parking_lot::RwLock` because reads (trytes,
//!   searches, balances) vastly outnumber writes (submits).

pub mod memory;
pub mod node;

pub use memory::MemoryNode;
pub use node::{FindTransactionsQuery, NodeApi, NodeError, Tips};
