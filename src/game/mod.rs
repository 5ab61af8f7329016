//! Game domain: accounts, characters, the item catalog, and the
//! transactional per-character economy.
//!
//! The economy is the part with real invariants: money is never created or
//! lost outside buy/sell/grant, a physical unit is accounted exactly once
//! across inventory and equipment, and every multi-entity mutation commits
//! as one atomic unit or not at all.

pub mod accounts;
pub mod economy;
pub mod errors;
pub mod store;
pub mod types;

pub use errors::GameError;
pub use store::{GameStore, GameStoreBuilder};
pub use types::*;
