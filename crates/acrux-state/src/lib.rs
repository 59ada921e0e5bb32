//! acrux-state
//!
//! Persistence for the node: a namespaced key-value abstraction (`KvStore`),
//! parameter subspaces on top of it, and the sled-backed `StateDb` that also
//! implements the ledger collaborators the mint module credits into.

pub mod db;
pub mod ledger;
pub mod store;

pub use db::{BlockWrites, StateDb};
pub use ledger::{AccountRegistry, MemLedger, RewardPool};
pub use store::{KvStore, MemStore, Overlay, Subspace, TreeStore};
