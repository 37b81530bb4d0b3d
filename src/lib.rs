//! FinGen core engine
//!
//! The state and rewards engine behind a gamified personal-finance app:
//! - Centralizes every domain mutation in one explicitly constructed store
//! - Derives balances, reward level, and trust score on read
//! - Emits notification and celebration events after each state commit
//! - Persists a full snapshot to a single storage slot, fire-and-forget
//! - Ships the rule-based advice engines (budget wizard, SIP sizing,
//!   coach replies, spending insights) as pure functions
//!
//! The user directory (auth) and the legacy per-user ledger are separate
//! persistence boundaries with no cross-consistency guarantee.

pub mod advisor;
pub mod auth;
pub mod classifier;
pub mod error;
pub mod ledger;
pub mod models;
pub mod persist;
pub mod store;

pub use error::{EngineError, Result};

// Re-export common types
pub use models::*;
pub use persist::{JsonFileStore, MemoryStore, Snapshot, SnapshotStore};
pub use store::{AppState, Celebration, CelebrationSink};
