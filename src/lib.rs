//! # Armory - Game Account & Character Economy Backend
//!
//! Armory is a small game backend: user accounts with password login,
//! per-user characters, a catalog of purchasable items, and a transactional
//! economy that moves value between a character's currency balance, its
//! inventory, and its equipped items.
//!
//! ## Features
//!
//! - **Accounts**: Argon2id password hashing, bearer-session login with
//!   expiry, one-owner-per-character enforcement.
//! - **Characters**: creation with fixed starting stats, owner-only
//!   deletion with cascading cleanup of inventory and equipment rows.
//! - **Item Catalog**: read-only pricing/stat input for the economy,
//!   populated over HTTP or bulk-seeded from JSON files.
//! - **Transactional Economy**: buy, sell, equip, unequip, and currency
//!   grants each commit as one atomic unit; money is never duplicated or
//!   lost, and every physical item unit is accounted exactly once across
//!   inventory and equipment.
//! - **HTTP API**: axum-based JSON surface with typed error mapping.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use armory::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     armory::server::run(config).await
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - Domain core: records, sled persistence, accounts, and the
//!   economy transaction coordinator
//! - [`server`] - HTTP routing, session extraction, and handlers
//! - [`config`] - Configuration management and validation
//! - [`validation`] - Input validation for identifiers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Layer    │ ← routing, sessions, request shapes
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Game Domain    │ ← accounts, catalog, economy transactions
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Sled Storage   │ ← tree-per-entity persistence
//! └─────────────────┘
//! ```
//!
//! Concurrent operations on the same character serialize through sled's
//! transaction conflict detection; operations on different characters never
//! contend.

pub mod config;
pub mod game;
pub mod server;
pub mod validation;
